//! # ft-app
//!
//! Application layer for FieldTrack: the workflows the field app is
//! made of, expressed as use cases over the ports in `ft-core`.
//!
//! Nothing in this crate talks to the network or the file system
//! directly; every effect goes through a port so the workflows stay
//! testable with in-memory fakes.

pub mod cancel;
pub mod deps;
pub mod engine;
pub mod usecases;

pub use cancel::CancelScope;
pub use deps::AppDeps;
pub use engine::Engine;
pub use usecases::location::LocationProvider;
pub use usecases::nearby::{FindNearbyPartners, NearbyPartners};
pub use usecases::onboarding::{
    OnboardingPipeline, OtpOutcome, Submission, SubmitOutcome, VerifiedPartner,
};
pub use usecases::visit::VisitSessionManager;
