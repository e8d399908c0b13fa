//! In-flight fetch registry.
//!
//! Guarded by its own lock, separate from the texture cache's. Callers get
//! displaced or drained entries back and cancel them after the lock is
//! released.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use url::Url;

/// One in-flight request.
#[derive(Debug)]
pub struct PendingFetch {
    pub index: usize,
    pub url: Url,
    /// Distinguishes this request from earlier ones for the same index.
    pub generation: u64,
    cancel: CancellationToken,
}

impl PendingFetch {
    /// Abort the request. Its task exits without reporting.
    pub fn cancel(self) {
        self.cancel.cancel();
    }
}

/// At most one [`PendingFetch`] per index.
#[derive(Debug, Default)]
pub struct FetchRegistry {
    inner: Mutex<HashMap<usize, PendingFetch>>,
    next_generation: AtomicU64,
}

impl FetchRegistry {
    /// Empty registry; generations start at 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new request for `index`. Returns its generation and the
    /// request it displaced, which the caller must cancel.
    pub fn register(
        &self,
        index: usize,
        url: Url,
        cancel: CancellationToken,
    ) -> (u64, Option<PendingFetch>) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let displaced = self.inner.lock().insert(
            index,
            PendingFetch {
                index,
                url,
                generation,
                cancel,
            },
        );
        (generation, displaced)
    }

    /// Remove the entry for a finished request, but only if it is still
    /// the current one for its index.
    pub fn complete(&self, index: usize, generation: u64) -> Option<PendingFetch> {
        let mut inner = self.inner.lock();
        match inner.get(&index) {
            Some(pending) if pending.generation == generation => {
                inner.remove(&index)
            }
            _ => None,
        }
    }

    /// Remove and return the request for `index`, if any.
    pub fn take(&self, index: usize) -> Option<PendingFetch> {
        self.inner.lock().remove(&index)
    }

    /// Remove every request.
    pub fn drain(&self) -> Vec<PendingFetch> {
        self.inner.lock().drain().map(|(_, pending)| pending).collect()
    }

    /// Number of requests in flight.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Whether `index` has a request in flight.
    pub fn contains(&self, index: usize) -> bool {
        self.inner.lock().contains_key(&index)
    }

    /// Generation of the request in flight for `index`.
    pub fn generation_of(&self, index: usize) -> Option<u64> {
        self.inner.lock().get(&index).map(|pending| pending.generation)
    }
}
