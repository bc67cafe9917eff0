//! HTTP infrastructure
//!
//! One gateway owns the reqwest client, credential injection and error
//! classification; the REST clients (`track_api`, `partner_api`) are
//! thin path-and-payload layers on top of it.

pub mod gateway;
pub mod partner_api;
pub mod retry;
pub mod timeouts;
pub mod track_api;

pub use gateway::{HttpGateway, RequestOptions};
pub use partner_api::HttpPartnerApi;
pub use retry::RetryPolicy;
pub use timeouts::ApiTimeouts;
pub use track_api::HttpTrackApi;
