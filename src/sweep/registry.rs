use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

#[derive(Debug)]
struct ActiveSweep {
    key: String,
    cancel: watch::Sender<bool>,
}

/// Sweeps currently running, so they can be cancelled by credential or on shutdown.
#[derive(Debug, Default)]
pub(crate) struct SweepRegistry {
    next_id: AtomicU64,
    active: DashMap<u64, ActiveSweep>,
}

impl SweepRegistry {
    pub(crate) fn register(&self, key: &str) -> SweepGuard<'_> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (cancel, cancelled) = watch::channel(false);
        self.active.insert(
            id,
            ActiveSweep {
                key: key.to_owned(),
                cancel,
            },
        );
        SweepGuard {
            registry: self,
            id,
            cancelled,
        }
    }

    /// Signals every sweep running for `key`. Returns whether any was found.
    pub(crate) fn cancel(&self, key: &str) -> bool {
        let mut found = false;
        for sweep in self.active.iter().filter(|sweep| sweep.key == key) {
            sweep.cancel.send_replace(true);
            found = true;
        }
        found
    }

    pub(crate) fn cancel_all(&self) {
        for sweep in self.active.iter() {
            sweep.cancel.send_replace(true);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.active.len()
    }
}

/// Keeps a sweep registered until dropped.
#[derive(Debug)]
pub(crate) struct SweepGuard<'a> {
    registry: &'a SweepRegistry,
    id: u64,
    cancelled: watch::Receiver<bool>,
}

impl SweepGuard<'_> {
    pub(crate) fn cancellation(&self) -> watch::Receiver<bool> {
        self.cancelled.clone()
    }
}

impl Drop for SweepGuard<'_> {
    fn drop(&mut self) {
        self.registry.active.remove(&self.id);
    }
}
