//! Wall clock

use chrono::{DateTime, Utc};
use ft_core::ports::ClockPort;

/// System time. Tests substitute a fixed clock through the port.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
