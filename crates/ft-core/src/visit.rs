//! Visit session domain model and the two-phase lifecycle.
//!
//! A visit is either `Idle` or `Open`, nothing else. The open phase is
//! shadowed in durable storage (session id plus start timestamp) so a
//! killed process resumes exactly where the operator left off.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::ApiError;

/// Suffix of the companion storage key holding the visit start time.
pub const STARTED_AT_SUFFIX: &str = "_STARTED_AT";

/// Server-issued visit session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitId(String);

impl VisitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VisitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visit lifecycle phase.
///
/// `Open` spans from start-visit success to end-visit success. The
/// phase is never stored directly; it is derived from whether a session
/// id is present in storage, so storage and phase cannot disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitPhase {
    #[default]
    Idle,
    Open,
}

impl VisitPhase {
    pub fn is_open(self) -> bool {
        matches!(self, VisitPhase::Open)
    }

    /// Idle -> Open, on start-visit success.
    pub fn on_started(self) -> Option<Self> {
        match self {
            VisitPhase::Idle => Some(VisitPhase::Open),
            VisitPhase::Open => None,
        }
    }

    /// Open -> Idle, once the stored session id is cleared after a
    /// successful end-visit.
    pub fn on_closed(self) -> Option<Self> {
        match self {
            VisitPhase::Open => Some(VisitPhase::Idle),
            VisitPhase::Idle => None,
        }
    }

    /// Phase implied by the persisted session id.
    pub fn from_stored(session_id: Option<&str>) -> Self {
        if session_id.is_some() {
            VisitPhase::Open
        } else {
            VisitPhase::Idle
        }
    }
}

/// Validated end-visit note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Remark(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RemarkError {
    #[error("remark must not be blank")]
    Blank,
    #[error("remark must be at least {min} characters, got {0}", min = Remark::MIN_CHARS)]
    TooShort(usize),
    #[error("remark must be at most {max} characters, got {0}", max = Remark::MAX_CHARS)]
    TooLong(usize),
}

impl Remark {
    pub const MIN_CHARS: usize = 5;
    pub const MAX_CHARS: usize = 500;

    /// Trims surrounding whitespace, then enforces the length band on
    /// what remains. Validation happens before any network call so a
    /// bad remark never costs a round trip.
    pub fn parse(raw: &str) -> Result<Self, RemarkError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RemarkError::Blank);
        }
        let chars = trimmed.chars().count();
        if chars < Self::MIN_CHARS {
            return Err(RemarkError::TooShort(chars));
        }
        if chars > Self::MAX_CHARS {
            return Err(RemarkError::TooLong(chars));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The pair of storage keys backing one visit flow: the session id and
/// its start-timestamp companion. They are written together on start
/// and removed together on a successful close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitKeys {
    id: String,
    started_at: String,
}

impl VisitKeys {
    /// Keys derived from a caller-supplied base key.
    pub fn for_key(base: &str) -> Self {
        Self {
            id: base.to_string(),
            started_at: format!("{base}{STARTED_AT_SUFFIX}"),
        }
    }

    /// The canonical keys for a partner kind.
    pub fn for_kind(kind: crate::partner::PartnerKind) -> Self {
        Self::for_key(kind.visit_storage_key())
    }

    pub fn id_key(&self) -> &str {
        &self.id
    }

    pub fn started_at_key(&self) -> &str {
        &self.started_at
    }
}

/// Persisted shadow of an in-progress visit, read back on screen entry.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenVisit {
    pub id: VisitId,
    /// Best-effort: `None` when the stored timestamp is missing or does
    /// not parse. The session itself is still valid.
    pub started_at: Option<DateTime<Utc>>,
}

/// One row of the server-side visit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitLogEntry {
    pub id: VisitId,
    #[serde(default)]
    pub partner_name: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Error)]
pub enum VisitError {
    /// A session id is already stored for this key. The stale session
    /// must be closed (or cleared) before a new one can start.
    #[error("a visit is already open (session {0})")]
    AlreadyOpen(VisitId),
    #[error("no open visit to close")]
    NotOpen,
    #[error(transparent)]
    InvalidRemark(#[from] RemarkError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("visit storage failed: {0}")]
    Storage(anyhow::Error),
}

impl From<anyhow::Error> for VisitError {
    fn from(err: anyhow::Error) -> Self {
        VisitError::Storage(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partner::PartnerKind;

    #[test]
    fn test_phase_transitions() {
        assert_eq!(VisitPhase::Idle.on_started(), Some(VisitPhase::Open));
        assert_eq!(VisitPhase::Open.on_started(), None);
        assert_eq!(VisitPhase::Open.on_closed(), Some(VisitPhase::Idle));
        assert_eq!(VisitPhase::Idle.on_closed(), None);
    }

    #[test]
    fn test_phase_derived_from_storage() {
        assert_eq!(VisitPhase::from_stored(Some("v-9")), VisitPhase::Open);
        assert_eq!(VisitPhase::from_stored(None), VisitPhase::Idle);
    }

    #[test]
    fn test_remark_trims_before_validating() {
        let remark = Remark::parse("  Discussed pricing  ").unwrap();
        assert_eq!(remark.as_str(), "Discussed pricing");
    }

    #[test]
    fn test_remark_rejects_blank() {
        assert_eq!(Remark::parse("   "), Err(RemarkError::Blank));
        assert_eq!(Remark::parse(""), Err(RemarkError::Blank));
    }

    #[test]
    fn test_remark_rejects_too_short() {
        // "ok" is 2 characters after trimming
        assert_eq!(Remark::parse("ok"), Err(RemarkError::TooShort(2)));
        // Whitespace does not count toward the minimum
        assert_eq!(Remark::parse("  hi  "), Err(RemarkError::TooShort(2)));
    }

    #[test]
    fn test_remark_boundary_lengths() {
        assert!(Remark::parse("12345").is_ok());
        assert!(Remark::parse(&"x".repeat(500)).is_ok());
        assert_eq!(
            Remark::parse(&"x".repeat(501)),
            Err(RemarkError::TooLong(501))
        );
    }

    #[test]
    fn test_remark_counts_characters_not_bytes() {
        // Five multibyte characters pass the minimum even though the
        // byte length is larger.
        assert!(Remark::parse("किसान").is_ok());
    }

    #[test]
    fn test_visit_keys_companion_suffix() {
        let keys = VisitKeys::for_kind(PartnerKind::Farmer);
        assert_eq!(keys.id_key(), "FARMER_VISIT");
        assert_eq!(keys.started_at_key(), "FARMER_VISIT_STARTED_AT");

        let custom = VisitKeys::for_key("SITE_A_VISIT");
        assert_eq!(custom.started_at_key(), "SITE_A_VISIT_STARTED_AT");
    }
}
