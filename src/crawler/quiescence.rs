//! Crawl quiescence detection
//!
//! The crawl fans out eagerly, so the total number of nodes is unknown until
//! the leaves are reached. Completion is tracked with an exact pending
//! counter: every branch registers before it is issued and settles when its
//! node is fully resolved (or abandoned). When the counter drops to zero the
//! detector fires, exactly once.
//!
//! The detector starts with one pending token owned by the run itself, so the
//! count cannot touch zero while seeds are still being registered. `seal`
//! releases that token.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type QuiescentCallback = Box<dyn FnOnce() + Send + 'static>;

struct DetectorInner {
    pending: AtomicUsize,
    settled: AtomicUsize,
    fired: AtomicBool,
    fire_count: AtomicUsize,
    sealed: AtomicBool,
    callback: Mutex<Option<QuiescentCallback>>,
}

/// Detects when every registered crawl branch has settled
#[derive(Clone)]
pub struct QuiescenceDetector {
    inner: Arc<DetectorInner>,
}

impl QuiescenceDetector {
    /// Creates a detector holding the run's own pending token
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DetectorInner {
                pending: AtomicUsize::new(1),
                settled: AtomicUsize::new(0),
                fired: AtomicBool::new(false),
                fire_count: AtomicUsize::new(0),
                sealed: AtomicBool::new(false),
                callback: Mutex::new(None),
            }),
        }
    }

    /// Registers a branch that is about to be issued
    ///
    /// The branch counts as pending until the returned guard is dropped.
    pub fn register(&self) -> SettleGuard {
        self.inner.pending.fetch_add(1, Ordering::AcqRel);
        SettleGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Releases the run's own token once all seeds have been registered
    ///
    /// Calling this more than once has no further effect.
    pub fn seal(&self) {
        if !self.inner.sealed.swap(true, Ordering::AcqRel) {
            notify_settled(&self.inner);
        }
    }

    /// Registers a callback to run when quiescence fires
    ///
    /// If the detector has already fired the callback runs immediately.
    pub fn on_quiescent<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut slot = self
            .inner
            .callback
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if self.inner.fired.load(Ordering::Acquire) {
            drop(slot);
            callback();
        } else {
            *slot = Some(Box::new(callback));
        }
    }

    pub fn is_quiescent(&self) -> bool {
        self.inner.fired.load(Ordering::Acquire)
    }

    /// Number of branches currently pending (including the run token until sealed)
    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::Acquire)
    }

    /// Number of settle events observed so far
    pub fn settle_count(&self) -> usize {
        self.inner.settled.load(Ordering::Acquire)
    }

    /// Number of times quiescence has fired (0 or 1)
    pub fn fire_count(&self) -> usize {
        self.inner.fire_count.load(Ordering::Acquire)
    }
}

impl Default for QuiescenceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for QuiescenceDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuiescenceDetector")
            .field("pending", &self.pending())
            .field("settled", &self.settle_count())
            .field("quiescent", &self.is_quiescent())
            .finish()
    }
}

/// Marks one registered branch as pending; settles it when dropped
///
/// Dropping happens on success, on error, and when a branch task is aborted,
/// so the pending count stays exact on every path.
#[must_use = "the branch settles as soon as the guard is dropped"]
pub struct SettleGuard {
    inner: Arc<DetectorInner>,
}

impl SettleGuard {
    /// Settles the branch now
    pub fn settle(self) {
        drop(self);
    }
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        self.inner.settled.fetch_add(1, Ordering::AcqRel);
        notify_settled(&self.inner);
    }
}

fn notify_settled(inner: &DetectorInner) {
    let previous = inner.pending.fetch_sub(1, Ordering::AcqRel);
    tracing::trace!("Settle event, {} branches still pending", previous.saturating_sub(1));

    if previous == 1 {
        fire(inner);
    }
}

fn fire(inner: &DetectorInner) {
    if inner.fired.swap(true, Ordering::AcqRel) {
        return;
    }

    inner.fire_count.fetch_add(1, Ordering::AcqRel);
    tracing::info!(
        "Crawl quiescent after {} settle events",
        inner.settled.load(Ordering::Acquire)
    );

    let callback = inner
        .callback
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .take();
    if let Some(callback) = callback {
        callback();
    }
}
