//! # Application Dependencies
//!
//! This module defines the dependency grouping for Engine construction.
//!
//! **Note**: This is NOT a Builder pattern.
//! - No build steps
//! - No default values
//! - No hidden logic
//! - Just parameter grouping
//!
//! The field list is the complete dependency manifest of the engine;
//! anything a workflow needs arrives through here.

use std::sync::Arc;

use ft_core::ports::*;

/// Application dependency grouping (non-Builder, just parameter grouping)
///
/// All dependencies are required - no defaults, no optional fields.
pub struct AppDeps {
    // Storage dependencies
    pub kv_store: Arc<dyn KeyValueStorePort>,
    pub token_store: Arc<dyn TokenStorePort>,

    // Platform dependencies
    pub position_sensor: Arc<dyn PositionSensorPort>,
    pub clock: Arc<dyn ClockPort>,

    // Backend dependencies
    pub geocoder: Arc<dyn ReverseGeocodePort>,
    pub track_api: Arc<dyn TrackApiPort>,
    pub partner_api: Arc<dyn PartnerApiPort>,
}
