//! # ft-infra
//!
//! Infrastructure adapters for FieldTrack: file-backed storage, the
//! authenticated HTTP gateway and the REST clients built on it, and the
//! reverse geocoder. Everything here implements a port from `ft-core`;
//! nothing here contains workflow logic.

pub mod clock;
pub mod geocode;
pub mod http;
pub mod kv;
pub mod token;

pub use clock::SystemClock;
pub use geocode::HttpReverseGeocoder;
pub use http::gateway::{HttpGateway, RequestOptions};
pub use http::partner_api::HttpPartnerApi;
pub use http::retry::RetryPolicy;
pub use http::timeouts::ApiTimeouts;
pub use http::track_api::HttpTrackApi;
pub use kv::FileKeyValueStore;
pub use token::KvTokenStore;
