//! Location fix domain model.
//!
//! A fix is a single point-in-time GPS reading plus an optional
//! reverse-geocoded address. Fixes are acquired fresh per operation and
//! never persisted; there is no continuous tracking anywhere in the
//! engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Backends expect coordinates rounded to six decimal places (roughly
/// 11cm of precision). Rounding happens exactly once, at the wire
/// boundary.
const WIRE_PRECISION: f64 = 1_000_000.0;

/// Rounds a coordinate to the precision transmitted on the wire.
pub fn round_coordinate(value: f64) -> f64 {
    (value * WIRE_PRECISION).round() / WIRE_PRECISION
}

/// A point-in-time GPS reading, optionally annotated with an address.
///
/// The address is best-effort decoration: a fix without one is still a
/// complete, usable fix.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
}

impl GeoFix {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            address: None,
        }
    }

    pub fn with_address(latitude: f64, longitude: f64, address: Option<String>) -> Self {
        Self {
            latitude,
            longitude,
            address,
        }
    }

    /// The rounded projection of this fix as sent to the backend.
    pub fn wire_point(&self) -> WirePoint {
        WirePoint::new(self.latitude, self.longitude)
    }
}

/// Coordinate pair rounded to six decimals, the only form that ever
/// leaves the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WirePoint {
    pub lat: f64,
    pub lon: f64,
}

impl WirePoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat: round_coordinate(lat),
            lon: round_coordinate(lon),
        }
    }
}

/// Foreground location permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    /// Denied for now; the platform may prompt again.
    Denied,
    /// Denied with "don't ask again" or blocked by device policy. Only
    /// the user can undo this from system settings.
    DeniedForever,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

/// How an acquisition treats permission refusal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcquisitionMode {
    /// Refusal is a recoverable error; the caller degrades gracefully.
    #[default]
    Lenient,
    /// Cold-start gate: a permanent refusal is fatal to the application.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied {
        /// Whether the refusal can only be undone from system settings.
        permanently: bool,
    },
    /// The sensor itself failed (no signal, service disabled, platform
    /// error).
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

impl LocationError {
    /// Whether this failure must abort the application under the given
    /// acquisition mode. Only a permanent permission refusal during a
    /// strict acquisition qualifies.
    pub fn is_fatal(&self, mode: AcquisitionMode) -> bool {
        matches!(
            (mode, self),
            (
                AcquisitionMode::Strict,
                LocationError::PermissionDenied { permanently: true }
            )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_coordinate_to_six_decimals() {
        assert_eq!(round_coordinate(26.912_433_59), 26.912_434);
        assert_eq!(round_coordinate(75.787_274_49), 75.787_274);
    }

    #[test]
    fn test_round_coordinate_negative_values() {
        assert_eq!(round_coordinate(-33.868_819_99), -33.868_820);
        assert_eq!(round_coordinate(-0.000_000_4), 0.0);
    }

    #[test]
    fn test_round_coordinate_is_idempotent() {
        let rounded = round_coordinate(12.345_678_901);
        assert_eq!(round_coordinate(rounded), rounded);
    }

    #[test]
    fn test_wire_point_rounds_both_axes() {
        let point = WirePoint::new(26.912_433_59, 75.787_274_49);
        assert_eq!(point.lat, 26.912_434);
        assert_eq!(point.lon, 75.787_274);
    }

    #[test]
    fn test_fix_wire_point_keeps_full_precision_locally() {
        let fix = GeoFix::new(26.912_433_59, 75.787_274_49);
        let point = fix.wire_point();
        assert_eq!(fix.latitude, 26.912_433_59);
        assert_eq!(point.lat, 26.912_434);
    }

    #[test]
    fn test_permanent_refusal_is_fatal_only_in_strict_mode() {
        let permanent = LocationError::PermissionDenied { permanently: true };
        assert!(permanent.is_fatal(AcquisitionMode::Strict));
        assert!(!permanent.is_fatal(AcquisitionMode::Lenient));
    }

    #[test]
    fn test_recoverable_errors_are_never_fatal() {
        let denied = LocationError::PermissionDenied { permanently: false };
        let unavailable = LocationError::Unavailable("gps off".to_string());
        assert!(!denied.is_fatal(AcquisitionMode::Strict));
        assert!(!unavailable.is_fatal(AcquisitionMode::Strict));
    }

    #[test]
    fn test_wire_point_serializes_rounded_values() {
        let point = WirePoint::new(11.000_000_49, -7.5);
        let json = serde_json::to_value(point).unwrap();
        assert_eq!(json["lat"], 11.0);
        assert_eq!(json["lon"], -7.5);
    }
}
