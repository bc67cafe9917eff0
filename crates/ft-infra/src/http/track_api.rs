//! HTTP client for the track service
//!
//! Proximity lookups and the visit lifecycle. Reads (nearby,
//! visit-history) go through the bounded retry helper; mutations
//! (start-visit, end-visit) are sent exactly once.

use std::sync::Arc;

use async_trait::async_trait;
use ft_core::geo::WirePoint;
use ft_core::partner::{PartnerKind, PartnerSummary};
use ft_core::ports::track_api::{StartVisitRequest, TrackApiPort};
use ft_core::visit::{Remark, VisitId, VisitLogEntry};
use ft_core::ApiError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::gateway::{HttpGateway, RequestOptions};
use super::retry::{retry_idempotent, RetryPolicy};
use super::timeouts::ApiTimeouts;

#[derive(Debug, Serialize)]
struct StartVisitBody<'a> {
    partner_id: &'a str,
    partner_type: &'a str,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct StartVisitResponse {
    id: String,
}

#[derive(Debug, Serialize)]
struct EndVisitBody<'a> {
    remark: &'a str,
}

#[derive(Debug, Deserialize)]
struct NearbyFarmersResponse {
    #[serde(default)]
    farmers: Vec<PartnerSummary>,
}

#[derive(Debug, Deserialize)]
struct NearbyDealersResponse {
    #[serde(default)]
    dealers: Vec<PartnerSummary>,
}

#[derive(Debug, Deserialize)]
struct VisitHistoryResponse {
    #[serde(default)]
    visit_history: Vec<VisitLogEntry>,
}

pub struct HttpTrackApi {
    gateway: Arc<HttpGateway>,
    timeouts: ApiTimeouts,
    retry: RetryPolicy,
}

impl HttpTrackApi {
    pub fn new(gateway: Arc<HttpGateway>, timeouts: ApiTimeouts) -> Self {
        Self {
            gateway,
            timeouts,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
impl TrackApiPort for HttpTrackApi {
    async fn nearby(
        &self,
        kind: PartnerKind,
        point: WirePoint,
    ) -> Result<Vec<PartnerSummary>, ApiError> {
        let options = RequestOptions::with_timeout(self.timeouts.nearby);
        let partners = match kind {
            PartnerKind::Farmer => {
                let response: NearbyFarmersResponse =
                    retry_idempotent("nearby-farmers", self.retry, || {
                        self.gateway
                            .post_json("/track/nearby-farmers/", &point, options)
                    })
                    .await?;
                response.farmers
            }
            PartnerKind::Dealer => {
                let response: NearbyDealersResponse =
                    retry_idempotent("nearby-dealers", self.retry, || {
                        self.gateway
                            .post_json("/track/nearby-dealers/", &point, options)
                    })
                    .await?;
                response.dealers
            }
        };
        debug!(kind = %kind, count = partners.len(), "nearby lookup completed");
        Ok(partners)
    }

    async fn start_visit(&self, request: &StartVisitRequest) -> Result<VisitId, ApiError> {
        let body = StartVisitBody {
            partner_id: request.partner_id.as_str(),
            partner_type: request.kind.as_str(),
            lat: request.point.lat,
            lon: request.point.lon,
        };
        let options = RequestOptions::with_timeout(self.timeouts.standard);
        let response: StartVisitResponse = self
            .gateway
            .post_json("/track/start-visit/", &body, options)
            .await?;
        Ok(VisitId::new(response.id))
    }

    async fn end_visit(&self, id: &VisitId, remark: &Remark) -> Result<(), ApiError> {
        let path = format!("/track/end-visit/{}/", id.as_str());
        let body = EndVisitBody {
            remark: remark.as_str(),
        };
        let options = RequestOptions::with_timeout(self.timeouts.standard);
        self.gateway.patch_unit(&path, &body, options).await
    }

    async fn visit_history(&self, location_id: &str) -> Result<Vec<VisitLogEntry>, ApiError> {
        let path = format!("/track/visit-history/{}/", location_id);
        let options = RequestOptions::with_timeout(self.timeouts.standard);
        let response: VisitHistoryResponse = retry_idempotent("visit-history", self.retry, || {
            self.gateway.get_json(&path, options)
        })
        .await?;
        Ok(response.visit_history)
    }
}
