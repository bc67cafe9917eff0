//! Clock port - abstracts wall-clock time for testability

use chrono::{DateTime, Utc};

/// Wall-clock source. Use cases take time from here instead of calling
/// `Utc::now()` directly so tests can pin it.
pub trait ClockPort: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}
