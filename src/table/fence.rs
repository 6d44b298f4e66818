//! Request fencing for overlapping fetches

use std::sync::atomic::{AtomicU64, Ordering};

/// Ticket handed out when a fetch is issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Monotonic ticket counter; only the newest ticket may publish its response
#[derive(Debug, Default)]
pub struct RequestFence {
    latest: AtomicU64,
}

impl RequestFence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket, superseding every earlier one
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_ticket_wins() {
        let fence = RequestFence::new();
        let first = fence.issue();
        let second = fence.issue();

        assert!(second > first);
        assert!(!fence.is_current(first));
        assert!(fence.is_current(second));
    }
}
