//! Visit session lifecycle use case.
//!
//! The stored session id is the single source of truth: phase is
//! derived from it, restarts resume from it, and it only ever changes
//! after the corresponding backend call succeeded. Mutual exclusion
//! between start and end is the screen's job (opposing buttons are
//! disabled while a call is in flight); the manager enforces the
//! ordering that survives restarts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ft_core::api::ApiError;
use ft_core::geo::GeoFix;
use ft_core::partner::{PartnerId, PartnerKind};
use ft_core::ports::{ClockPort, KeyValueStorePort, StartVisitRequest, TrackApiPort};
use ft_core::visit::{OpenVisit, Remark, VisitError, VisitId, VisitKeys, VisitLogEntry, VisitPhase};
use tracing::{info, warn};

pub struct VisitSessionManager {
    kind: PartnerKind,
    keys: VisitKeys,
    kv: Arc<dyn KeyValueStorePort>,
    track_api: Arc<dyn TrackApiPort>,
    clock: Arc<dyn ClockPort>,
}

impl VisitSessionManager {
    /// Manager bound to the canonical storage keys of `kind`.
    pub fn new(
        kind: PartnerKind,
        kv: Arc<dyn KeyValueStorePort>,
        track_api: Arc<dyn TrackApiPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            keys: VisitKeys::for_kind(kind),
            kind,
            kv,
            track_api,
            clock,
        }
    }

    /// Manager over a caller-supplied storage key instead of the
    /// canonical per-kind one.
    pub fn with_storage_key(
        kind: PartnerKind,
        base_key: &str,
        kv: Arc<dyn KeyValueStorePort>,
        track_api: Arc<dyn TrackApiPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            keys: VisitKeys::for_key(base_key),
            kind,
            kv,
            track_api,
            clock,
        }
    }

    pub fn storage_keys(&self) -> &VisitKeys {
        &self.keys
    }

    /// Idle -> Open.
    ///
    /// Refuses while a session id is already stored; the stale session
    /// must be closed first. The id and its start-timestamp companion
    /// are persisted only after the backend accepted the start, so a
    /// failed start leaves no trace and is safely retryable.
    pub async fn start(&self, partner_id: PartnerId, fix: &GeoFix) -> Result<VisitId, VisitError> {
        if let Some(stale) = self.kv.get(self.keys.id_key()).await? {
            warn!(kind = %self.kind, session = %stale, "start refused: visit already open");
            return Err(VisitError::AlreadyOpen(VisitId::new(stale)));
        }

        let request = StartVisitRequest {
            partner_id,
            kind: self.kind,
            point: fix.wire_point(),
        };
        let id = self.track_api.start_visit(&request).await?;

        self.kv.put(self.keys.id_key(), id.as_str()).await?;
        self.kv
            .put(
                self.keys.started_at_key(),
                &self.clock.now_utc().to_rfc3339(),
            )
            .await?;
        info!(kind = %self.kind, session = %id, "visit opened");
        Ok(id)
    }

    /// Open -> Idle.
    ///
    /// The remark is validated locally before any network call. On
    /// failure the stored shadow is untouched: the visit stays open and
    /// closing can be retried with the same remark.
    pub async fn end(&self, remark: &str) -> Result<(), VisitError> {
        let remark = Remark::parse(remark)?;

        let id = self
            .kv
            .get(self.keys.id_key())
            .await?
            .map(VisitId::new)
            .ok_or(VisitError::NotOpen)?;

        self.track_api.end_visit(&id, &remark).await?;

        self.kv.remove(self.keys.id_key()).await?;
        self.kv.remove(self.keys.started_at_key()).await?;
        info!(kind = %self.kind, session = %id, "visit closed");
        Ok(())
    }

    /// The persisted shadow, if any. Screens call this on entry to pick
    /// between the start and end affordances.
    pub async fn current(&self) -> Result<Option<OpenVisit>, VisitError> {
        let Some(id) = self.kv.get(self.keys.id_key()).await? else {
            return Ok(None);
        };
        let started_at = match self.kv.get(self.keys.started_at_key()).await? {
            Some(raw) => parse_started_at(&raw),
            None => None,
        };
        Ok(Some(OpenVisit {
            id: VisitId::new(id),
            started_at,
        }))
    }

    /// Phase derived from storage.
    pub async fn phase(&self) -> Result<VisitPhase, VisitError> {
        let stored = self.kv.get(self.keys.id_key()).await?;
        Ok(VisitPhase::from_stored(stored.as_deref()))
    }

    /// Server-side visit log for a location. Read-only and safe to
    /// repeat, unlike everything else on this manager.
    pub async fn history(&self, location_id: &str) -> Result<Vec<VisitLogEntry>, ApiError> {
        self.track_api.visit_history(location_id).await
    }
}

/// A malformed stored timestamp degrades to `None` rather than failing
/// the resume; the session id alone is enough to continue.
fn parse_started_at(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
