//! Reverse geocoding port

use anyhow::Result;
use async_trait::async_trait;

/// Best-effort reverse geocoding.
///
/// Failures here are expected and must never invalidate a fix; the
/// caller degrades to an address-less fix and moves on.
#[async_trait]
pub trait ReverseGeocodePort: Send + Sync {
    /// Human-readable label for the coordinates, when the service knows
    /// one.
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Option<String>>;
}
