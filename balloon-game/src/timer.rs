//! Logical clock for the post-pop pause before the next balloon.

use std::time::Duration;

/// A single scheduled advance, measured against the controller's logical clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAdvance {
    remaining: Duration,
}

impl PendingAdvance {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { remaining: delay }
    }

    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }

    #[must_use]
    pub const fn is_due(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Let `elapsed` pass; returns true once the deadline has been reached.
    pub fn elapse(&mut self, elapsed: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(elapsed);
        self.is_due()
    }
}
