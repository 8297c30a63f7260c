// ── Action gate ──
//
// Global single-flight guarantee for mutating operations. Every
// action-triggering call site acquires through this one gate; while it
// is held the view layer renders all affordances disabled via
// `is_busy()`. Unrelated mutations (a finalize and a disk format) still
// exclude each other: both read-modify-write shared array/disk inventory
// on the service side.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};

/// Single-permit gate over all mutating operations.
#[derive(Clone)]
pub struct ActionGate {
    permits: Arc<Semaphore>,
}

/// Held for the duration of one mutating operation. Dropping the permit
/// releases the gate, so release on every exit path -- success, failure,
/// early return, panic unwind -- is structural rather than conventional.
pub struct ActionPermit {
    _permit: OwnedSemaphorePermit,
}

impl ActionGate {
    pub fn new() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(1)),
        }
    }

    /// Acquire the gate without waiting. `None` means another mutating
    /// operation is already in flight.
    pub fn try_acquire(&self) -> Option<ActionPermit> {
        match Arc::clone(&self.permits).try_acquire_owned() {
            Ok(permit) => Some(ActionPermit { _permit: permit }),
            Err(TryAcquireError::NoPermits | TryAcquireError::Closed) => None,
        }
    }

    /// The shared busy flag consulted by every affordance consumer.
    pub fn is_busy(&self) -> bool {
        self.permits.available_permits() == 0
    }
}

impl Default for ActionGate {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_rejected_while_held() {
        let gate = ActionGate::new();
        let permit = gate.try_acquire().expect("free gate");
        assert!(gate.is_busy());
        assert!(gate.try_acquire().is_none());
        drop(permit);
    }

    #[test]
    fn drop_releases_on_every_path() {
        let gate = ActionGate::new();

        // Success path.
        {
            let _permit = gate.try_acquire().expect("free gate");
        }
        assert!(!gate.is_busy());

        // Early-return path.
        fn bail(gate: &ActionGate) -> Option<()> {
            let _permit = gate.try_acquire()?;
            None?;
            Some(())
        }
        assert!(bail(&gate).is_none());
        assert!(!gate.is_busy());
    }

    #[test]
    fn clones_share_one_permit() {
        let gate = ActionGate::new();
        let clone = gate.clone();

        let permit = gate.try_acquire().expect("free gate");
        assert!(clone.is_busy());
        assert!(clone.try_acquire().is_none());

        drop(permit);
        assert!(!clone.is_busy());
        assert!(clone.try_acquire().is_some());
    }
}
