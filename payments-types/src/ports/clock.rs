//! Clock port.

use chrono::{DateTime, Utc};

/// Source of the current UTC instant.
///
/// Bank time-window rules compare against this instead of reading the
/// system clock directly.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
