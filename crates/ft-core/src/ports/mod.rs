//! Port interfaces for the application layer
//!
//! Ports define the contract between the application logic (use cases)
//! and infrastructure implementations. This follows Hexagonal Architecture
//! principles, allowing the core business logic to remain independent of
//! external dependencies.
//!
//! Two implementation directions exist here: storage, clock and the HTTP
//! clients are implemented by `ft-infra`, while the position sensor is
//! implemented by whichever shell embeds the engine (the engine itself
//! has no GPS).

pub mod clock;
pub mod geocode;
pub mod kv_store;
pub mod partner_api;
pub mod position;
pub mod token_store;
pub mod track_api;

pub use clock::ClockPort;
pub use geocode::ReverseGeocodePort;
pub use kv_store::KeyValueStorePort;
pub use partner_api::PartnerApiPort;
pub use position::{PositionSensorPort, RawPosition};
pub use token_store::TokenStorePort;
pub use track_api::{StartVisitRequest, TrackApiPort};
