//! Position sensor port - abstracts the platform positioning service
//!
//! Implemented by the embedding shell, not by `ft-infra`: GPS hardware
//! and the permission dialogs around it only exist on the device.

use async_trait::async_trait;

use crate::geo::{LocationError, PermissionStatus};

/// One raw reading from the positioning service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPosition {
    pub latitude: f64,
    pub longitude: f64,
}

/// Platform positioning service: permission negotiation plus single
/// point-in-time readings at balanced accuracy.
///
/// The engine never subscribes to position streams; every operation
/// that needs coordinates asks for exactly one reading.
#[async_trait]
pub trait PositionSensorPort: Send + Sync {
    /// Current foreground permission without prompting.
    async fn permission_status(&self) -> PermissionStatus;

    /// Prompt the user and return the resulting status. On platforms
    /// where the dialog cannot be shown again this returns the current
    /// status unchanged.
    async fn request_permission(&self) -> PermissionStatus;

    /// One GPS reading. Sensor failures (no signal, service disabled)
    /// map to [`LocationError::Unavailable`].
    async fn read_position(&self) -> Result<RawPosition, LocationError>;
}
