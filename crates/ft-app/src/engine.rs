//! Engine facade
//!
//! Assembles use cases from the dependency bundle and owns the root
//! cancellation scope. Workflow instances created here carry child
//! scopes, so one `shutdown` releases everything the engine ever
//! spawned.

use std::time::Duration;

use ft_core::PartnerKind;

use crate::cancel::CancelScope;
use crate::deps::AppDeps;
use crate::usecases::location::LocationProvider;
use crate::usecases::nearby::FindNearbyPartners;
use crate::usecases::onboarding::OnboardingPipeline;
use crate::usecases::visit::VisitSessionManager;

pub struct Engine {
    deps: AppDeps,
    root_scope: CancelScope,
    geocode_deadline: Option<Duration>,
}

impl Engine {
    pub fn new(deps: AppDeps) -> Self {
        Self {
            deps,
            root_scope: CancelScope::new(),
            geocode_deadline: None,
        }
    }

    /// Override the reverse-geocoding deadline (configuration hook;
    /// the provider's default applies otherwise).
    pub fn with_geocode_deadline(mut self, deadline: Duration) -> Self {
        self.geocode_deadline = Some(deadline);
        self
    }

    pub fn location(&self) -> LocationProvider {
        let provider = LocationProvider::from_ports(
            self.deps.position_sensor.clone(),
            self.deps.geocoder.clone(),
        );
        match self.geocode_deadline {
            Some(deadline) => provider.with_geocode_deadline(deadline),
            None => provider,
        }
    }

    pub fn nearby(&self) -> FindNearbyPartners {
        FindNearbyPartners::from_ports(self.deps.track_api.clone())
    }

    /// Visit manager bound to the canonical storage keys of `kind`.
    pub fn visits(&self, kind: PartnerKind) -> VisitSessionManager {
        VisitSessionManager::new(
            kind,
            self.deps.kv_store.clone(),
            self.deps.track_api.clone(),
            self.deps.clock.clone(),
        )
    }

    /// Fresh onboarding pipeline for one registration form. The
    /// pipeline's scope is a child of the engine scope; drop the form,
    /// call [`OnboardingPipeline::teardown`], and its in-flight calls
    /// die quietly.
    pub fn onboarding(&self, kind: PartnerKind) -> OnboardingPipeline {
        OnboardingPipeline::new(kind, self.deps.partner_api.clone(), self.root_scope.child())
    }

    pub fn cancel_scope(&self) -> &CancelScope {
        &self.root_scope
    }

    /// Tear down every workflow spawned from this engine.
    pub fn shutdown(&self) {
        self.root_scope.cancel();
    }
}
