//! Per-crawl countdown state.

use crate::model::{Role, SessionStatus};

/// Outcome of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tick {
    /// Still counting; seconds left after this tick.
    Remaining(u64),
    /// The countdown reached zero on this tick.
    Elapsed,
    /// No countdown is running.
    Idle,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct CrawlSession {
    pub role: Role,
    pub remaining: u64,
    pub status: SessionStatus,
}

impl CrawlSession {
    /// Reset to a fresh session for `role`, in the requesting state.
    pub fn begin(&mut self, role: Role, countdown_secs: u64) {
        self.role = role;
        self.remaining = countdown_secs;
        self.status = SessionStatus::Requesting;
    }

    pub fn start_waiting(&mut self) {
        self.status = SessionStatus::Waiting;
    }

    pub fn tick(&mut self) -> Tick {
        if self.status != SessionStatus::Waiting {
            return Tick::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.status = SessionStatus::Processing;
            Tick::Elapsed
        } else {
            Tick::Remaining(self.remaining)
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.status == SessionStatus::Waiting
    }
}
