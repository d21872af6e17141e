//! FIFO queue of parked request replays.
//!
//! Enqueuing never triggers execution; only the authenticator's completion
//! path drains. A drain runs the snapshot taken at entry, so thunks enqueued
//! while a drain is in progress (e.g. a fresh 401 racing the refresh) wait
//! for the next re-authentication cycle.

use std::collections::VecDeque;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tracing::debug;

/// A zero-argument deferred replay action. Owned by the queue until
/// dequeued; runs to completion exactly once and is never re-enqueued.
pub type ReplayThunk = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Ordered buffer of [`ReplayThunk`]s awaiting re-authentication.
#[derive(Default)]
pub struct ReplayQueue {
    pending: Mutex<VecDeque<ReplayThunk>>,
}

impl ReplayQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a replay. Insertion order is replay order.
    pub fn enqueue(&self, thunk: ReplayThunk) {
        let mut pending = self.pending.lock();
        pending.push_back(thunk);
        debug!(depth = pending.len(), "parked request replay");
    }

    /// Number of parked replays.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// True when nothing is parked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Run every parked replay in FIFO order, sequentially, and return how
    /// many ran. Thunks enqueued during the drain are left for the next one.
    pub async fn drain(&self) -> usize {
        let batch: Vec<ReplayThunk> = {
            let mut pending = self.pending.lock();
            pending.drain(..).collect()
        };
        let count = batch.len();
        for thunk in batch {
            thunk().await;
        }
        if count > 0 {
            debug!(count, "replayed parked requests");
        }
        count
    }
}

impl std::fmt::Debug for ReplayQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayQueue").field("pending", &self.len()).finish()
    }
}
