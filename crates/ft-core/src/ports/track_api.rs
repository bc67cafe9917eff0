//! Track service port - proximity queries and the visit lifecycle
//!
//! Everything here goes through the authenticated HTTP gateway; errors
//! arrive pre-classified as [`ApiError`].

use async_trait::async_trait;

use crate::api::ApiError;
use crate::geo::WirePoint;
use crate::partner::{PartnerId, PartnerKind, PartnerSummary};
use crate::visit::{Remark, VisitId, VisitLogEntry};

/// Everything the backend needs to open a visit session.
#[derive(Debug, Clone, PartialEq)]
pub struct StartVisitRequest {
    pub partner_id: PartnerId,
    pub kind: PartnerKind,
    pub point: WirePoint,
}

#[async_trait]
pub trait TrackApiPort: Send + Sync {
    /// Partners of `kind` near `point`. An empty list is a successful
    /// outcome, distinct from any error.
    async fn nearby(
        &self,
        kind: PartnerKind,
        point: WirePoint,
    ) -> Result<Vec<PartnerSummary>, ApiError>;

    /// Open a visit session; returns the server-issued session id.
    async fn start_visit(&self, request: &StartVisitRequest) -> Result<VisitId, ApiError>;

    /// Close a visit session with the operator's remark.
    async fn end_visit(&self, id: &VisitId, remark: &Remark) -> Result<(), ApiError>;

    /// Server-side visit log for a location.
    async fn visit_history(&self, location_id: &str) -> Result<Vec<VisitLogEntry>, ApiError>;
}
