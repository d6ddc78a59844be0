//! Run-wide quota counter.

use std::sync::atomic::{AtomicUsize, Ordering};

/// A counter that hands out at most `limit` permits for the lifetime of a run.
///
/// `try_acquire` is a single compare-and-swap, so two concurrent callers can
/// never both take the last slot. A permit that is dropped without being
/// committed gives its slot back.
#[derive(Debug)]
pub struct QuotaCounter {
    limit: usize,
    used: AtomicUsize,
}

impl QuotaCounter {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            used: AtomicUsize::new(0),
        }
    }

    /// Reserve one slot if any remain.
    pub fn try_acquire(&self) -> Option<QuotaPermit<'_>> {
        self.used
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                (used < self.limit).then_some(used + 1)
            })
            .ok()
            .map(|_| QuotaPermit {
                counter: self,
                committed: false,
            })
    }

    /// Slots currently reserved or committed.
    pub fn used(&self) -> usize {
        self.used.load(Ordering::SeqCst)
    }

    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.used())
    }
}

/// A reserved quota slot. Released on drop unless committed.
#[derive(Debug)]
pub struct QuotaPermit<'a> {
    counter: &'a QuotaCounter,
    committed: bool,
}

impl QuotaPermit<'_> {
    /// Keep the slot for the rest of the run.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for QuotaPermit<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.counter.used.fetch_sub(1, Ordering::SeqCst);
        }
    }
}
