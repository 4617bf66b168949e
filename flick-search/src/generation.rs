//! Sequence numbers for searches so late answers from older searches can be dropped.
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket {
    pub generation: u64,
}

/// Hands out increasing tickets; only the newest one is current.
///
/// ```
/// use flick_search::GenerationTracker;
///
/// let tracker = GenerationTracker::new();
/// let first = tracker.begin();
/// let second = tracker.begin();
/// assert!(!tracker.is_current(&first));
/// assert!(tracker.is_current(&second));
/// ```
#[derive(Debug, Default)]
pub struct GenerationTracker {
    latest: AtomicU64,
}

impl GenerationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> SearchTicket {
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        SearchTicket { generation }
    }

    pub fn is_current(&self, ticket: &SearchTicket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.generation
    }

    /// Generation of the newest ticket, 0 before the first search.
    pub fn current(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }
}
