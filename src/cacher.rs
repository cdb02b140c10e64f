//! [`MaskedBestsCacher`]: drives when a DP scan's best-so-far gets recorded
//! into the [`MaskedBestsCache`] for the current [`Mask`].

use crate::arrow::Arrow;
use crate::discont_index::DiscontStartIndex;
use crate::hit_list::HitList;
use crate::mask::{Mask, MaskSignature};
use crate::masked_cache::MaskedBestsCache;
use crate::scored_arch::ScoredArchProxy;

/// The arrows at which a scan under `mask` could ever be consulted again by
/// a discontiguous hit's interior gap, restricted to those at or after
/// `start_arrow`.
///
/// Only discontiguous hits whose enclosed region can admit `mask` (every
/// masking hit sits in one of its gaps, and at least one masking hit sits
/// strictly in an interior gap rather than before/after) can ever query this
/// mask's cache, so only their start arrows need entries.
pub fn precompute_cache_arrows(
    mask: &Mask,
    start_arrow: Arrow,
    discont_index: &DiscontStartIndex,
    hit_list: &HitList,
) -> Vec<Arrow> {
    if mask.is_empty() {
        return Vec::new();
    }
    let per_hit = mask.hit_segments();
    let p = per_hit
        .iter()
        .map(|segs| segs[0].stop())
        .max()
        .expect("mask is non-empty");
    let q = per_hit
        .iter()
        .map(|segs| segs[segs.len() - 1].start())
        .min()
        .expect("mask is non-empty");
    if p >= q {
        return Vec::new();
    }

    let range = discont_index.indices_in_range(p, q);
    let mut arrows: Vec<Arrow> = range
        .filter_map(|i| {
            let hit_idx = discont_index.hit_index_at(i);
            let hit = &hit_list[hit_idx];
            if mask.intersperses_every_and_any(hit.segments()) {
                Some(hit.start_arrow())
            } else {
                None
            }
        })
        .filter(|&a| a >= start_arrow)
        .collect();
    arrows.sort();
    arrows.dedup();
    arrows
}

/// Tracks which of a mask's precomputed cache-arrows have been passed during
/// a DP scan, so the scan can record its best-so-far into the shared cache
/// exactly at those positions.
pub struct MaskedBestsCacher {
    signature: MaskSignature,
    cache_arrows: Vec<Arrow>,
    cursor: usize,
}

impl MaskedBestsCacher {
    pub fn new(
        mask: &Mask,
        start_arrow: Arrow,
        discont_index: &DiscontStartIndex,
        hit_list: &HitList,
    ) -> Self {
        MaskedBestsCacher {
            signature: mask.signature().clone(),
            cache_arrows: precompute_cache_arrows(mask, start_arrow, discont_index, hit_list),
            cursor: 0,
        }
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.cursor >= self.cache_arrows.len()
    }

    /// Records `best_so_far` into `cache` for every precomputed cache-arrow
    /// not yet passed that is `<= arrow`.
    pub fn advance_to_pos_with_best_so_far(
        &mut self,
        arrow: Arrow,
        best_so_far: &ScoredArchProxy,
        cache: &mut MaskedBestsCache,
    ) {
        while self.cursor < self.cache_arrows.len() && self.cache_arrows[self.cursor] <= arrow {
            cache.store(&self.signature, self.cache_arrows[self.cursor], best_so_far.clone());
            self.cursor += 1;
        }
    }

    /// Records `best_so_far` into `cache` for every remaining precomputed
    /// cache-arrow, at the end of a scan.
    pub fn advance_to_end_with_best_so_far(
        &mut self,
        best_so_far: &ScoredArchProxy,
        cache: &mut MaskedBestsCache,
    ) {
        while self.cursor < self.cache_arrows.len() {
            cache.store(&self.signature, self.cache_arrows[self.cursor], best_so_far.clone());
            self.cursor += 1;
        }
    }
}
