//! Transient in-memory references used to hand fetched bytes to a save action.
//!
//! Every [`TransientResource`] is released exactly once: explicitly through
//! [`TransientResource::release`], or by `Drop` when a save action unwinds.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

/// Counts resource creations and releases so leaks are observable.
#[derive(Debug, Default)]
pub struct ResourceLedger {
    created: AtomicU64,
    released: AtomicU64,
}

impl ResourceLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of resources created so far.
    #[must_use]
    pub fn created(&self) -> u64 {
        self.created.load(Ordering::SeqCst)
    }

    /// Number of resources released so far.
    #[must_use]
    pub fn released(&self) -> u64 {
        self.released.load(Ordering::SeqCst)
    }

    /// Resources created but not yet released.
    #[must_use]
    pub fn outstanding(&self) -> u64 {
        self.created().saturating_sub(self.released())
    }
}

/// Short-lived reference to fetched bytes.
#[derive(Debug)]
pub struct TransientResource {
    id: u64,
    bytes: Vec<u8>,
    ledger: Arc<ResourceLedger>,
    released: bool,
}

impl TransientResource {
    /// Wraps `bytes` and records the creation in `ledger`.
    #[must_use]
    pub fn create(ledger: &Arc<ResourceLedger>, bytes: Vec<u8>) -> Self {
        let id = ledger.created.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(resource = id, bytes = bytes.len(), "transient resource created");
        Self {
            id,
            bytes,
            ledger: Arc::clone(ledger),
            released: false,
        }
    }

    /// Identifier unique within the owning ledger.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Borrowed view of the referenced bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Releases the resource.
    pub fn release(mut self) {
        self.mark_released();
    }

    fn mark_released(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.bytes = Vec::new();
        self.ledger.released.fetch_add(1, Ordering::SeqCst);
        debug!(resource = self.id, "transient resource released");
    }
}

impl Drop for TransientResource {
    fn drop(&mut self) {
        if !self.released {
            warn!(resource = self.id, "transient resource released on abandonment path");
            self.mark_released();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_is_counted_once() {
        let ledger = ResourceLedger::new();
        let resource = TransientResource::create(&ledger, b"a,b\n1,2\n".to_vec());
        assert_eq!(resource.bytes(), b"a,b\n1,2\n");
        assert_eq!(ledger.outstanding(), 1);

        resource.release();
        assert_eq!(ledger.created(), 1);
        assert_eq!(ledger.released(), 1);
        assert_eq!(ledger.outstanding(), 0);
    }

    #[test]
    fn test_drop_releases_abandoned_resource() {
        let ledger = ResourceLedger::new();
        {
            let _resource = TransientResource::create(&ledger, vec![1, 2, 3]);
        }
        assert_eq!(ledger.released(), 1);
    }

    #[test]
    fn test_unwinding_releases_resource() {
        let ledger = ResourceLedger::new();
        let cloned = Arc::clone(&ledger);
        let result = std::panic::catch_unwind(move || {
            let _resource = TransientResource::create(&cloned, vec![0; 16]);
            panic!("save action blew up");
        });
        assert!(result.is_err());
        assert_eq!(ledger.created(), 1);
        assert_eq!(ledger.released(), 1);
    }

    #[test]
    fn test_ids_are_sequential_per_ledger() {
        let ledger = ResourceLedger::new();
        let first = TransientResource::create(&ledger, Vec::new());
        let second = TransientResource::create(&ledger, Vec::new());
        assert_eq!(first.id(), 1);
        assert_eq!(second.id(), 2);
    }
}
