//! Partner onboarding pipeline use case.
//!
//! Create -> OTP dispatch -> verification, one pipeline instance per
//! registration form. Creation and the first OTP dispatch are a single
//! logical step for the operator even though they are two network
//! calls, and an OTP failure never rolls creation back: the partner
//! exists, the verification prompt opens, and the operator resends from
//! there.
//!
//! Two guarantees the screens rely on:
//! - single-flight: at most one submission (or OTP dispatch) is in
//!   flight per pipeline instance, enforced before the first await and
//!   released on every exit path;
//! - silent teardown: cancelling the pipeline's scope resolves in-flight
//!   calls to a cancelled outcome that is never surfaced.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use ft_core::api::ApiError;
use ft_core::onboarding::{OnboardingError, OnboardingPhase, OnboardingRecord};
use ft_core::partner::{PartnerDraft, PartnerId, PartnerKind, Phone};
use ft_core::ports::PartnerApiPort;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cancel::CancelScope;

pub struct OnboardingPipeline {
    /// Correlation id for log lines; one per form instance.
    id: Uuid,
    kind: PartnerKind,
    partner_api: Arc<dyn PartnerApiPort>,
    scope: CancelScope,
    state: Mutex<OnboardingRecord>,
    in_flight: AtomicBool,
}

/// Outcome of [`OnboardingPipeline::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Submitted(Submission),
    /// Another submission is already in flight; this one was ignored.
    AlreadyInFlight,
    /// The pipeline tore down mid-call. Show nothing.
    Cancelled,
}

/// A successful submission: the partner exists server-side. Whether the
/// first OTP dispatch made it out is reported separately because its
/// failure does not undo creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub partner_id: PartnerId,
    pub otp_dispatched: bool,
    /// Set when the automatic first dispatch failed; the verification
    /// prompt still opens and the operator can resend.
    pub otp_error: Option<ApiError>,
}

/// Outcome of a manual OTP dispatch ([`OnboardingPipeline::send_otp`]).
#[derive(Debug, Clone, PartialEq)]
pub enum OtpOutcome {
    Dispatched,
    AlreadyInFlight,
    Cancelled,
}

/// What verification settles on.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedPartner {
    pub partner_id: PartnerId,
    pub phone: Option<Phone>,
}

impl OnboardingPipeline {
    pub fn new(kind: PartnerKind, partner_api: Arc<dyn PartnerApiPort>, scope: CancelScope) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            partner_api,
            scope,
            state: Mutex::new(OnboardingRecord::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Submit the registration form: create the partner, then dispatch
    /// the first OTP automatically.
    ///
    /// A second call while one is in flight returns
    /// [`SubmitOutcome::AlreadyInFlight`] without touching the network;
    /// the guard is taken before the first await, so even two calls in
    /// the same poll cycle cannot both pass.
    pub async fn submit(&self, draft: PartnerDraft) -> Result<SubmitOutcome, OnboardingError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!(pipeline = %self.id, "submit ignored: another submission in flight");
            return Ok(SubmitOutcome::AlreadyInFlight);
        };

        {
            let mut record = self.state.lock().expect("onboarding state poisoned");
            let Some(next) = record.phase.on_create_started() else {
                return Err(OnboardingError::InvalidPhase {
                    phase: record.phase,
                });
            };
            record.phase = next;
        }

        info!(pipeline = %self.id, kind = %self.kind, "creating partner");
        let created = match self.scope.run(self.partner_api.create(self.kind, &draft)).await {
            Ok(created) => created,
            Err(err) => {
                self.settle(|phase| phase.on_create_failed());
                if err.is_cancelled() {
                    debug!(pipeline = %self.id, "creation cancelled by teardown");
                    return Ok(SubmitOutcome::Cancelled);
                }
                warn!(pipeline = %self.id, error = %err, "partner creation failed");
                return Err(OnboardingError::Api(err));
            }
        };

        {
            let mut record = self.state.lock().expect("onboarding state poisoned");
            if let Some(next) = record.phase.on_created() {
                record.phase = next;
            }
            record.partner_id = Some(created.id.clone());
            record.phone = Some(created.phone.clone());
        }
        info!(pipeline = %self.id, partner = %created.id, "partner created");

        // Creation and the first dispatch are one step for the operator.
        match self.dispatch_otp(&created.id, &draft.phone).await {
            Ok(()) => Ok(SubmitOutcome::Submitted(Submission {
                partner_id: created.id,
                otp_dispatched: true,
                otp_error: None,
            })),
            Err(err) if err.is_cancelled() => Ok(SubmitOutcome::Cancelled),
            Err(err) => {
                // The partner exists; verification opens regardless.
                warn!(pipeline = %self.id, error = %err, "first OTP dispatch failed");
                Ok(SubmitOutcome::Submitted(Submission {
                    partner_id: created.id,
                    otp_dispatched: false,
                    otp_error: Some(err),
                }))
            }
        }
    }

    /// Manual OTP dispatch from the verification prompt, also used for
    /// resends. A phone corrected on the prompt is patched server-side
    /// before the dispatch.
    pub async fn send_otp(&self, phone: Phone) -> Result<OtpOutcome, OnboardingError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!(pipeline = %self.id, "otp dispatch ignored: another call in flight");
            return Ok(OtpOutcome::AlreadyInFlight);
        };

        let partner_id = {
            let record = self.state.lock().expect("onboarding state poisoned");
            if !record.phase.can_request_otp() {
                return Err(OnboardingError::InvalidPhase {
                    phase: record.phase,
                });
            }
            record.partner_id.clone().ok_or(OnboardingError::NotCreated)?
        };

        match self.dispatch_otp(&partner_id, &phone).await {
            Ok(()) => Ok(OtpOutcome::Dispatched),
            Err(err) if err.is_cancelled() => Ok(OtpOutcome::Cancelled),
            Err(err) => Err(OnboardingError::Api(err)),
        }
    }

    /// The operator verified the OTP in the external prompt. Marks the
    /// record verified; the caller invalidates any cached partner lists.
    pub fn complete_verification(&self) -> Result<VerifiedPartner, OnboardingError> {
        let mut record = self.state.lock().expect("onboarding state poisoned");
        let Some(next) = record.phase.on_verified() else {
            return Err(OnboardingError::InvalidPhase {
                phase: record.phase,
            });
        };
        let partner_id = record.partner_id.clone().ok_or(OnboardingError::NotCreated)?;
        record.phase = next;
        record.verified = true;
        info!(pipeline = %self.id, partner = %partner_id, "partner verified");
        Ok(VerifiedPartner {
            partner_id,
            phone: record.phone.clone(),
        })
    }

    /// Snapshot of the record, for screens.
    pub fn record(&self) -> OnboardingRecord {
        self.state.lock().expect("onboarding state poisoned").clone()
    }

    pub fn phase(&self) -> OnboardingPhase {
        self.state.lock().expect("onboarding state poisoned").phase
    }

    /// The form is going away: release every call still in flight. The
    /// calls resolve to cancelled outcomes, which are silent.
    pub fn teardown(&self) {
        debug!(pipeline = %self.id, "pipeline teardown");
        self.scope.cancel();
    }

    /// Patch-if-changed, then dispatch. Settles the phase into
    /// `AwaitingVerification` whether or not the dispatch made it out,
    /// because the verification prompt opens either way.
    async fn dispatch_otp(&self, partner_id: &PartnerId, phone: &Phone) -> Result<(), ApiError> {
        let known_phone = {
            let mut record = self.state.lock().expect("onboarding state poisoned");
            if let Some(next) = record.phase.on_otp_requested() {
                record.phase = next;
            }
            record.phone.clone()
        };

        let result = self.run_dispatch(partner_id, phone, known_phone.as_ref()).await;

        {
            let mut record = self.state.lock().expect("onboarding state poisoned");
            if let Some(next) = record.phase.on_otp_settled() {
                record.phase = next;
            }
            if result.is_ok() {
                record.otp_dispatched = true;
                record.phone = Some(phone.clone());
            }
        }
        result
    }

    async fn run_dispatch(
        &self,
        partner_id: &PartnerId,
        phone: &Phone,
        known_phone: Option<&Phone>,
    ) -> Result<(), ApiError> {
        if known_phone != Some(phone) {
            info!(pipeline = %self.id, partner = %partner_id, "phone changed; patching before OTP dispatch");
            self.scope
                .run(self.partner_api.update_phone(self.kind, partner_id, phone))
                .await?;
        }
        info!(pipeline = %self.id, partner = %partner_id, "requesting OTP dispatch");
        self.scope
            .run(self.partner_api.send_otp(self.kind, partner_id))
            .await
    }

    /// Restore the phase after a failed or cancelled create.
    fn settle(&self, transition: impl Fn(OnboardingPhase) -> Option<OnboardingPhase>) {
        let mut record = self.state.lock().expect("onboarding state poisoned");
        if let Some(next) = transition(record.phase) {
            record.phase = next;
        }
    }
}

/// RAII single-flight guard: acquired before the first await of a
/// submission, released on drop so every exit path (success, error,
/// cancellation, panic) clears it.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::SeqCst) {
            None
        } else {
            Some(Self { flag })
        }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
