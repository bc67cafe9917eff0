//! # ft-core
//!
//! Core domain models and business logic for FieldTrack.
//!
//! This crate contains pure business logic without any infrastructure dependencies.

// Public module exports
pub mod api;
pub mod auth;
pub mod geo;
pub mod onboarding;
pub mod partner;
pub mod ports;
pub mod visit;

// Re-export commonly used types at the crate root
pub use api::ApiError;
pub use auth::{AuthToken, SessionEvent, SessionEventReceiver, SessionEventSender};
pub use geo::{AcquisitionMode, GeoFix, LocationError, PermissionStatus, WirePoint};
pub use onboarding::{OnboardingError, OnboardingPhase, OnboardingRecord};
pub use partner::{CreatedPartner, PartnerDraft, PartnerId, PartnerKind, PartnerSummary, Phone};
pub use visit::{OpenVisit, Remark, VisitError, VisitId, VisitKeys, VisitLogEntry, VisitPhase};
