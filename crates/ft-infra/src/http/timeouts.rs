//! Per-endpoint timeout policy.

use std::time::Duration;

use ft_core::PartnerKind;

/// Deadlines applied per request class. `None` means no client-side
/// deadline at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiTimeouts {
    /// Proximity queries back a screen the operator is staring at;
    /// kept short so failure shows fast.
    pub nearby: Duration,
    /// Everything else: visit lifecycle, phone patches, OTP dispatch.
    pub standard: Duration,
    pub create_farmer: Option<Duration>,
    /// The legacy dealer form shipped without a deadline on create and
    /// operators rely on slow rural links completing eventually.
    /// Preserved until the backend contract says otherwise.
    pub create_dealer: Option<Duration>,
}

impl Default for ApiTimeouts {
    fn default() -> Self {
        Self {
            nearby: Duration::from_secs(3),
            standard: Duration::from_secs(10),
            create_farmer: Some(Duration::from_secs(10)),
            create_dealer: None,
        }
    }
}

impl ApiTimeouts {
    pub fn create_timeout(&self, kind: PartnerKind) -> Option<Duration> {
        match kind {
            PartnerKind::Farmer => self.create_farmer,
            PartnerKind::Dealer => self.create_dealer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dealer_create_has_no_deadline_by_default() {
        let timeouts = ApiTimeouts::default();
        assert_eq!(
            timeouts.create_timeout(PartnerKind::Farmer),
            Some(Duration::from_secs(10))
        );
        assert_eq!(timeouts.create_timeout(PartnerKind::Dealer), None);
    }
}
