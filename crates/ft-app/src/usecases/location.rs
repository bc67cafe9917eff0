//! Location acquisition use case.
//!
//! Permission negotiation, one GPS reading, then best-effort reverse
//! geocoding folded into a single structured result. Geocoding runs
//! under its own deadline and can only ever degrade the fix to an
//! address-less one, never fail it.

use std::sync::Arc;
use std::time::Duration;

use ft_core::geo::{AcquisitionMode, GeoFix, LocationError, PermissionStatus};
use ft_core::ports::{PositionSensorPort, RawPosition, ReverseGeocodePort};
use tracing::{debug, error, warn};

/// Default ceiling on the reverse-geocoding round trip. The fix itself
/// is already in hand by then; waiting longer buys nothing.
pub const GEOCODE_DEADLINE: Duration = Duration::from_secs(5);

pub struct LocationProvider {
    sensor: Arc<dyn PositionSensorPort>,
    geocoder: Arc<dyn ReverseGeocodePort>,
    geocode_deadline: Duration,
}

impl LocationProvider {
    pub fn new(sensor: Arc<dyn PositionSensorPort>, geocoder: Arc<dyn ReverseGeocodePort>) -> Self {
        Self {
            sensor,
            geocoder,
            geocode_deadline: GEOCODE_DEADLINE,
        }
    }

    /// Create a new LocationProvider from cloned Arc<dyn Port> references.
    pub fn from_ports(
        sensor: Arc<dyn PositionSensorPort>,
        geocoder: Arc<dyn ReverseGeocodePort>,
    ) -> Self {
        Self::new(sensor, geocoder)
    }

    pub fn with_geocode_deadline(mut self, deadline: Duration) -> Self {
        self.geocode_deadline = deadline;
        self
    }

    /// Acquire one annotated fix.
    ///
    /// Fails only on permission refusal or sensor failure. The mode
    /// decides how a permanent refusal is classified for the caller:
    /// under [`AcquisitionMode::Strict`] it is fatal
    /// ([`LocationError::is_fatal`]) and the shell is expected to
    /// terminate; the engine itself never exits the process.
    pub async fn acquire(&self, mode: AcquisitionMode) -> Result<GeoFix, LocationError> {
        if let Err(err) = self.ensure_permission().await {
            if err.is_fatal(mode) {
                error!(error = %err, "location permission permanently refused during strict acquisition");
            } else {
                warn!(error = %err, "location acquisition refused");
            }
            return Err(err);
        }

        let position = self.sensor.read_position().await?;
        let address = self.reverse_geocode(position).await;
        debug!(
            lat = position.latitude,
            lon = position.longitude,
            has_address = address.is_some(),
            "acquired location fix"
        );
        Ok(GeoFix::with_address(
            position.latitude,
            position.longitude,
            address,
        ))
    }

    /// Current permission, prompting once when it is not yet granted.
    async fn ensure_permission(&self) -> Result<(), LocationError> {
        let mut status = self.sensor.permission_status().await;
        if !status.is_granted() {
            status = self.sensor.request_permission().await;
        }
        match status {
            PermissionStatus::Granted => Ok(()),
            PermissionStatus::Denied => Err(LocationError::PermissionDenied { permanently: false }),
            PermissionStatus::DeniedForever => {
                Err(LocationError::PermissionDenied { permanently: true })
            }
        }
    }

    /// Reverse geocode under the deadline. Every failure path lands on
    /// `None`; the fix ships without an address.
    async fn reverse_geocode(&self, position: RawPosition) -> Option<String> {
        let lookup = self
            .geocoder
            .reverse(position.latitude, position.longitude);
        match tokio::time::timeout(self.geocode_deadline, lookup).await {
            Ok(Ok(address)) => address,
            Ok(Err(err)) => {
                warn!(error = %err, "reverse geocoding failed; fix ships without address");
                None
            }
            Err(_) => {
                warn!(
                    deadline = ?self.geocode_deadline,
                    "reverse geocoding timed out; fix ships without address"
                );
                None
            }
        }
    }
}
