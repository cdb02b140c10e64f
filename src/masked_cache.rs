//! [`MaskedBestsCache`]: memoisation of best-architecture-so-far, keyed by
//! mask signature and arrow.

use rustc_hash::FxHashMap;

use crate::arrow::Arrow;
use crate::mask::MaskSignature;
use crate::scored_arch::ScoredArchProxy;

/// Maps a [`MaskSignature`] to the sorted-by-arrow list of best
/// architectures recorded for it.
#[derive(Debug, Default)]
pub struct MaskedBestsCache {
    entries: FxHashMap<MaskSignature, Vec<(Arrow, ScoredArchProxy)>>,
}

impl MaskedBestsCache {
    pub fn new() -> Self {
        MaskedBestsCache::default()
    }

    /// The best architecture stored for `signature` at the greatest arrow
    /// `<= a`, or the empty architecture if nothing is stored (yet) for
    /// this signature at or before `a`.
    pub fn get_best_for_masks_up_to_arrow(&self, signature: &MaskSignature, a: Arrow) -> ScoredArchProxy {
        match self.entries.get(signature) {
            Some(list) => {
                let idx = list.partition_point(|(arrow, _)| *arrow <= a);
                if idx == 0 {
                    ScoredArchProxy::empty()
                } else {
                    list[idx - 1].1.clone()
                }
            }
            None => ScoredArchProxy::empty(),
        }
    }

    /// Appends `(a, sap)` to `signature`'s list.
    ///
    /// # Panics
    /// Panics if `a` is strictly less than the signature's last stored
    /// arrow (arrows for a signature must be appended non-decreasing).
    pub fn store(&mut self, signature: &MaskSignature, a: Arrow, sap: ScoredArchProxy) {
        let list = self.entries.entry(signature.clone()).or_default();
        if let Some((last_arrow, _)) = list.last() {
            assert!(
                *last_arrow <= a,
                "MaskedBestsCache::store received an out-of-order arrow"
            );
        }
        list.push((a, sap));
    }
}
