//! Proximity query use case.
//!
//! One fix in, a list of partners out. Empty lists are successful
//! outcomes and must stay distinguishable from failures; the kind
//! decides whether an empty result deserves an alert.

use std::sync::Arc;

use ft_core::api::ApiError;
use ft_core::geo::GeoFix;
use ft_core::partner::{PartnerKind, PartnerSummary};
use ft_core::ports::TrackApiPort;
use tracing::{debug, info};

pub struct FindNearbyPartners {
    track_api: Arc<dyn TrackApiPort>,
}

/// Successful proximity query outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyPartners {
    pub kind: PartnerKind,
    pub partners: Vec<PartnerSummary>,
}

impl NearbyPartners {
    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }

    /// Alert copy for an empty result: dealer searches tell the
    /// operator out loud, farmer searches let the empty list speak for
    /// itself.
    pub fn empty_notice(&self) -> Option<&'static str> {
        if self.partners.is_empty() {
            self.kind.empty_nearby_notice()
        } else {
            None
        }
    }
}

impl FindNearbyPartners {
    pub fn new(track_api: Arc<dyn TrackApiPort>) -> Self {
        Self { track_api }
    }

    /// Create a new FindNearbyPartners from cloned Arc<dyn Port> references.
    pub fn from_ports(track_api: Arc<dyn TrackApiPort>) -> Self {
        Self::new(track_api)
    }

    /// Partners of `kind` near `fix`. Coordinates are rounded to the
    /// wire precision before anything leaves the device.
    pub async fn find(
        &self,
        kind: PartnerKind,
        fix: &GeoFix,
    ) -> Result<NearbyPartners, ApiError> {
        let point = fix.wire_point();
        debug!(kind = %kind, lat = point.lat, lon = point.lon, "querying nearby partners");
        let partners = self.track_api.nearby(kind, point).await?;
        info!(kind = %kind, count = partners.len(), "nearby query returned");
        Ok(NearbyPartners { kind, partners })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ft_core::geo::WirePoint;
    use ft_core::partner::PartnerId;
    use ft_core::ports::StartVisitRequest;
    use ft_core::visit::{Remark, VisitId, VisitLogEntry};
    use std::sync::Mutex;

    struct MockTrackApi {
        result: Mutex<Option<Result<Vec<PartnerSummary>, ApiError>>>,
        seen_point: Mutex<Option<WirePoint>>,
    }

    impl MockTrackApi {
        fn returning(result: Result<Vec<PartnerSummary>, ApiError>) -> Self {
            Self {
                result: Mutex::new(Some(result)),
                seen_point: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl TrackApiPort for MockTrackApi {
        async fn nearby(
            &self,
            _kind: PartnerKind,
            point: WirePoint,
        ) -> Result<Vec<PartnerSummary>, ApiError> {
            *self.seen_point.lock().unwrap() = Some(point);
            self.result.lock().unwrap().take().unwrap()
        }

        async fn start_visit(&self, _request: &StartVisitRequest) -> Result<VisitId, ApiError> {
            unimplemented!("not used by these tests")
        }

        async fn end_visit(&self, _id: &VisitId, _remark: &Remark) -> Result<(), ApiError> {
            unimplemented!("not used by these tests")
        }

        async fn visit_history(&self, _location_id: &str) -> Result<Vec<VisitLogEntry>, ApiError> {
            unimplemented!("not used by these tests")
        }
    }

    fn summary(id: &str, name: &str) -> PartnerSummary {
        PartnerSummary {
            id: PartnerId::new(id),
            name: name.to_string(),
            phone: None,
            address: None,
            distance_km: None,
        }
    }

    #[tokio::test]
    async fn test_find_rounds_coordinates_before_transmission() {
        let api = Arc::new(MockTrackApi::returning(Ok(vec![summary("f-1", "Ravi")])));
        let usecase = FindNearbyPartners::new(api.clone());

        let fix = GeoFix::new(26.912_433_59, 75.787_274_49);
        usecase.find(PartnerKind::Farmer, &fix).await.unwrap();

        let seen = api.seen_point.lock().unwrap().unwrap();
        assert_eq!(seen.lat, 26.912_434);
        assert_eq!(seen.lon, 75.787_274);
    }

    #[tokio::test]
    async fn test_empty_dealer_result_alerts() {
        let api = Arc::new(MockTrackApi::returning(Ok(vec![])));
        let usecase = FindNearbyPartners::new(api);

        let result = usecase
            .find(PartnerKind::Dealer, &GeoFix::new(1.0, 2.0))
            .await
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(result.empty_notice(), Some("Dealer not found"));
    }

    #[tokio::test]
    async fn test_empty_farmer_result_stays_silent() {
        let api = Arc::new(MockTrackApi::returning(Ok(vec![])));
        let usecase = FindNearbyPartners::new(api);

        let result = usecase
            .find(PartnerKind::Farmer, &GeoFix::new(1.0, 2.0))
            .await
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(result.empty_notice(), None);
    }

    #[tokio::test]
    async fn test_non_empty_result_never_alerts() {
        let api = Arc::new(MockTrackApi::returning(Ok(vec![summary("d-3", "AgroMart")])));
        let usecase = FindNearbyPartners::new(api);

        let result = usecase
            .find(PartnerKind::Dealer, &GeoFix::new(1.0, 2.0))
            .await
            .unwrap();
        assert_eq!(result.empty_notice(), None);
    }

    #[tokio::test]
    async fn test_failure_stays_distinguishable_from_empty() {
        let api = Arc::new(MockTrackApi::returning(Err(ApiError::Timeout)));
        let usecase = FindNearbyPartners::new(api);

        let err = usecase
            .find(PartnerKind::Dealer, &GeoFix::new(1.0, 2.0))
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Timeout);
    }
}
