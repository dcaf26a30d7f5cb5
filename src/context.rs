//! Execution context
//!
//! The scheduler gives each invocation a fixed wall-clock budget. The scanner
//! only ever asks how much of it is left.

use std::time::{Duration, Instant};

/// Remaining-time view of the current invocation
pub trait ExecutionContext: Send + Sync {
    /// Milliseconds left before the invocation is cut off
    fn remaining_time_millis(&self) -> u64;
}

/// Context backed by a monotonic deadline
#[derive(Debug, Clone, Copy)]
pub struct DeadlineContext {
    deadline: Instant,
}

impl DeadlineContext {
    /// Deadline `budget` from now
    pub fn new(budget: Duration) -> Self {
        Self {
            deadline: Instant::now() + budget,
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self { deadline }
    }
}

impl ExecutionContext for DeadlineContext {
    fn remaining_time_millis(&self) -> u64 {
        let remaining = self
            .deadline
            .checked_duration_since(Instant::now())
            .unwrap_or(Duration::ZERO);
        u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX)
    }
}
