//! [`BestScanArches`]: per-DP-layer state tracking the best architecture
//! seen up to each arrow, without duplicating identical prefixes.

use crate::arrow::Arrow;
use crate::scored_arch::ScoredArchProxy;

/// Stores distinct [`ScoredArchProxy`] values observed during one DP scan,
/// along with, for every arrow index scanned so far, which of those values
/// is the best architecture ending at or before it.
///
/// Most arrows share the same best-architecture as their predecessor, so
/// `bests` stores an index into `archs` rather than a copy of the `SAP`
/// itself.
#[derive(Debug)]
pub struct BestScanArches {
    archs: Vec<ScoredArchProxy>,
    bests: Vec<usize>,
}

impl BestScanArches {
    /// `capacity` is a hint (the scan's stop arrow + 1); it need not be exact.
    pub fn new(capacity: u64) -> Self {
        let mut bests = Vec::with_capacity(capacity as usize + 1);
        bests.push(0);
        BestScanArches {
            archs: vec![ScoredArchProxy::empty()],
            bests,
        }
    }

    /// The best architecture ending at or before `a`.
    ///
    /// # Panics
    /// Panics if `a.index()` is beyond what has been extended to so far.
    pub fn best_up_to_arrow(&self, a: Arrow) -> &ScoredArchProxy {
        &self.archs[self.bests[a.index() as usize]]
    }

    /// The best architecture seen so far (i.e. up to the last extended arrow).
    pub fn best_so_far(&self) -> &ScoredArchProxy {
        &self.archs[*self.bests.last().expect("bests always has at least one entry")]
    }

    /// Extends `bests` up to (and including) arrow `a`, repeating the
    /// current best-so-far for every newly-covered arrow. Returns the best
    /// score so far (after extension). A no-op if already extended past `a`.
    pub fn extend_up_to_arrow(&mut self, a: Arrow) -> f64 {
        let target_len = a.index() as usize + 1;
        if target_len > self.bests.len() {
            let last = *self.bests.last().expect("bests always has at least one entry");
            self.bests.resize(target_len, last);
        }
        self.best_so_far().score()
    }

    /// Records `sap` as the best architecture up to arrow `a`.
    ///
    /// # Panics
    /// Panics unless `a.index()` is exactly one past the last recorded
    /// arrow (the DP scan must extend monotonically, one new position at a
    /// time).
    pub fn add_best_up_to_arrow(&mut self, a: Arrow, sap: ScoredArchProxy) {
        assert_eq!(
            a.index() as usize,
            self.bests.len(),
            "add_best_up_to_arrow must be called exactly one past the last entry"
        );
        let new_idx = self.archs.len();
        self.archs.push(sap);
        self.bests.push(new_idx);
    }
}
