//! FieldTrack Engine
//!
//! Headless core of a field-sales application: location acquisition,
//! partner proximity lookups, visit sessions and OTP-gated partner
//! onboarding. The embedding shell supplies a position sensor and a
//! sign-in flow; [`bootstrap`] wires everything else together from
//! configuration.

pub mod bootstrap;
pub mod config;

pub use bootstrap::{bootstrap, EngineContext};
pub use config::EngineConfig;

pub use ft_app::{Engine, NearbyPartners, OtpOutcome, SubmitOutcome};
pub use ft_core::{
    AcquisitionMode, ApiError, AuthToken, GeoFix, PartnerDraft, PartnerKind, Phone, SessionEvent,
};
