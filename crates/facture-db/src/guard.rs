//! # In-Flight Write Guard
//!
//! Deduplicates concurrent invoice saves. A double-clicked save button
//! fires the same draft twice; the second attempt must be dropped rather
//! than queued, or the user ends up with two invoices.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  save(draft)                                                            │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  guard.begin(draft.uuid)                                               │
//! │     │                                                                   │
//! │     ├── Some(ticket) → run the transaction; ticket drop releases       │
//! │     │                                                                   │
//! │     └── None         → identical save already in flight; skip          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ticket releases on drop, so the id is freed on success, error, and
//! panic alike.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Shared set of write ids currently in flight.
#[derive(Debug, Clone, Default)]
pub struct WriteGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl WriteGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `id` for a write. Returns `None` when the same id is already
    /// being written, in which case the caller must skip the operation.
    pub fn begin(&self, id: &str) -> Option<WriteTicket> {
        let mut set = match self.in_flight.lock() {
            Ok(set) => set,
            // A panic while holding the lock only poisons the set of ids;
            // claiming through the poisoned lock is still sound.
            Err(poisoned) => poisoned.into_inner(),
        };
        if !set.insert(id.to_string()) {
            debug!(id, "Write already in flight, skipping");
            return None;
        }
        Some(WriteTicket {
            guard: self.clone(),
            id: id.to_string(),
        })
    }

    fn release(&self, id: &str) {
        let mut set = match self.in_flight.lock() {
            Ok(set) => set,
            Err(poisoned) => poisoned.into_inner(),
        };
        set.remove(id);
    }
}

/// Releases the claimed id when dropped.
#[derive(Debug)]
pub struct WriteTicket {
    guard: WriteGuard,
    id: String,
}

impl Drop for WriteTicket {
    fn drop(&mut self) {
        self.guard.release(&self.id);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_claim_is_rejected() {
        let guard = WriteGuard::new();
        let ticket = guard.begin("inv-1");
        assert!(ticket.is_some());
        assert!(guard.begin("inv-1").is_none());

        // A different id is unaffected.
        assert!(guard.begin("inv-2").is_some());
    }

    #[test]
    fn test_drop_releases_the_id() {
        let guard = WriteGuard::new();
        {
            let _ticket = guard.begin("inv-1").unwrap();
        }
        assert!(guard.begin("inv-1").is_some());
    }

    #[test]
    fn test_shared_across_clones() {
        let guard = WriteGuard::new();
        let other = guard.clone();
        let _ticket = guard.begin("inv-1").unwrap();
        assert!(other.begin("inv-1").is_none());
    }
}
