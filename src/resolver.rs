//! The core DP recursion (component H): finds the maximum-scoring set of
//! non-overlapping hits for a query, plus a naive-greedy alternative.

use std::ops::Range;

use crate::arrow::Arrow;
use crate::cacher::MaskedBestsCacher;
use crate::discont_index::DiscontStartIndex;
use crate::hit::HitIndex;
use crate::hit_list::HitList;
use crate::mask::Mask;
use crate::masked_cache::MaskedBestsCache;
use crate::scan::BestScanArches;
use crate::scored_arch::{add_hit_copy, make_scored_architecture, ScoredArchProxy, ScoredArchitecture, INIT_SCORE};
use crate::segment::Seg;

/// Resolves a [`HitList`] into the best-scoring, non-overlapping set of hits
/// via the memoised DP recursion over discontiguous masks.
pub struct Resolver<'a> {
    hit_list: &'a HitList,
    discont_index: &'a DiscontStartIndex,
    cache: MaskedBestsCache,
}

impl<'a> Resolver<'a> {
    /// Resolves `hit_list` and materialises the result.
    pub fn resolve(hit_list: &HitList) -> ScoredArchitecture {
        let discont_index = DiscontStartIndex::build(hit_list);
        let mut resolver = Resolver {
            hit_list,
            discont_index: &discont_index,
            cache: MaskedBestsCache::new(),
        };
        let stop = hit_list.max_stop().map(Arrow::succ).unwrap_or(Arrow::new(0));
        let sap = resolver.best_region(&Mask::empty(), Arrow::new(0), stop, &ScoredArchProxy::empty());
        make_scored_architecture(&sap, hit_list)
    }

    /// Computes the best architecture over `[start, stop)`, given `mask`
    /// (hits already placed outside this region) and the best architecture
    /// known to end strictly before `start` (`best_before_start`).
    fn best_region(
        &mut self,
        mask: &Mask,
        start: Arrow,
        stop: Arrow,
        best_before_start: &ScoredArchProxy,
    ) -> ScoredArchProxy {
        let mut bsa = BestScanArches::new(stop.index());
        if start.index() > 0 && best_before_start.score() > INIT_SCORE {
            bsa.extend_up_to_arrow(start.pred());
            bsa.add_best_up_to_arrow(start, best_before_start.clone());
        }

        let hit_list = self.hit_list;
        let discont_index = self.discont_index;
        let mut cacher = MaskedBestsCacher::new(mask, start, discont_index, hit_list);

        let range = hit_list.indices_of_hits_that_stop_in_range(start, stop);
        let mut i = range.start;
        while i < range.end {
            let a = hit_list[i].stop_arrow();
            let mut j = i;
            while j < range.end && hit_list[j].stop_arrow() == a {
                j += 1;
            }

            cacher.advance_to_pos_with_best_so_far(a, bsa.best_so_far(), &mut self.cache);
            let prev_best = bsa.extend_up_to_arrow(a.pred());
            let best_new = self.best_using_one_of(i..j, mask, start, &bsa, prev_best);
            match best_new {
                Some(sap) if sap.score() > prev_best => bsa.add_best_up_to_arrow(a, sap),
                _ => {
                    bsa.extend_up_to_arrow(a);
                }
            }
            i = j;
        }

        cacher.advance_to_end_with_best_so_far(bsa.best_so_far(), &mut self.cache);
        bsa.best_so_far().clone()
    }

    /// Considers every hit in `group` (all sharing the same `stop_arrow`) as
    /// the rightmost hit of a candidate architecture, returning the best one
    /// that beats `score_to_beat`, or `None` if none does.
    fn best_using_one_of(
        &mut self,
        group: Range<HitIndex>,
        mask: &Mask,
        start: Arrow,
        bsa: &BestScanArches,
        score_to_beat: f64,
    ) -> Option<ScoredArchProxy> {
        let hit_list = self.hit_list;
        let mut best: Option<ScoredArchProxy> = None;
        let mut best_score = score_to_beat;

        for idx in group {
            let hit = &hit_list[idx];
            if mask.overlaps(hit) {
                continue;
            }

            let candidate = if !hit.is_discontig() {
                let base = bsa.best_up_to_arrow(hit.start_arrow());
                add_hit_copy(base.clone(), hit.score(), idx)
            } else {
                let new_mask = mask.with_hit(hit);
                let complement = if hit.start_arrow() >= start {
                    self.best_region(
                        &new_mask,
                        hit.first_seg_stop(),
                        hit.last_seg_start(),
                        bsa.best_up_to_arrow(hit.start_arrow()),
                    )
                } else {
                    let cached = self
                        .cache
                        .get_best_for_masks_up_to_arrow(new_mask.signature(), start);
                    self.best_region(&new_mask, start, hit.last_seg_start(), &cached)
                };
                add_hit_copy(complement, hit.score(), idx)
            };

            if candidate.score() > best_score {
                best_score = candidate.score();
                best = Some(candidate);
            }
        }

        best
    }
}

/// A configurable, cheaper alternative to the full DP resolver: sorts hits
/// by descending score (ties broken by the canonical hit-list order) and
/// greedily admits any that does not overlap an already-admitted hit.
pub fn naive_greedy_resolve(hit_list: &HitList) -> ScoredArchitecture {
    let mut order: Vec<HitIndex> = (0..hit_list.len()).collect();
    order.sort_by(|&a, &b| {
        hit_list[b]
            .score()
            .partial_cmp(&hit_list[a].score())
            .expect("finite scores")
            .then(a.cmp(&b))
    });

    let mut admitted: Vec<Seg> = Vec::new();
    let mut proxy = ScoredArchProxy::empty();
    for idx in order {
        let hit = &hit_list[idx];
        if hit.overlaps_any(&admitted) {
            continue;
        }
        admitted.extend_from_slice(hit.segments());
        proxy.add_hit(hit.score(), idx);
    }
    make_scored_architecture(&proxy, hit_list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit_list::RawHitRecord;
    use crate::specs::{DomainType, FilterSpec, ScoreKind, ScoreSpec, SegDuplHitPolicy, SegmentSpec};

    fn raw(label: &str, score: f64, segs: &[(u64, u64)]) -> RawHitRecord {
        RawHitRecord {
            label: label.to_string(),
            raw_score: score,
            score_kind: ScoreKind::Score,
            domain_type: DomainType::Normal,
            segments: segs.to_vec(),
            cond_evalue: None,
            indp_evalue: None,
        }
    }

    fn build_list(raws: Vec<RawHitRecord>) -> HitList {
        HitList::build(
            raws,
            &ScoreSpec::default(),
            &SegmentSpec::default(),
            &FilterSpec::default(),
            SegDuplHitPolicy::Preserve,
        )
    }

    #[test]
    fn single_hit_resolves_to_itself() {
        let list = build_list(vec![raw("only", 5.0, &[(0, 10)])]);
        let arch = Resolver::resolve(&list);
        assert_eq!(arch.score(), 5.0);
        assert_eq!(arch.hits().len(), 1);
        assert_eq!(arch.hits()[0].label, "only");
    }

    #[test]
    fn overlapping_hits_pick_the_higher_scorer() {
        let list = build_list(vec![raw("low", 1.0, &[(0, 20)]), raw("high", 9.0, &[(5, 25)])]);
        let arch = Resolver::resolve(&list);
        assert_eq!(arch.score(), 9.0);
        assert_eq!(arch.hits().len(), 1);
        assert_eq!(arch.hits()[0].label, "high");
    }

    #[test]
    fn non_overlapping_hits_are_both_kept() {
        let list = build_list(vec![raw("a", 3.0, &[(0, 10)]), raw("b", 4.0, &[(20, 30)])]);
        let arch = Resolver::resolve(&list);
        assert_eq!(arch.score(), 7.0);
        assert_eq!(arch.hits().len(), 2);
    }

    #[test]
    fn discontiguous_hit_prefers_best_combination_in_its_gap() {
        // "spanning"'s interior gap (20, 60) can be filled either by
        // "big_gap" alone or by "gap_a" + "gap_b" together; the latter
        // scores higher, so the optimal architecture combines all three.
        let list = build_list(vec![
            raw("spanning", 5.0, &[(0, 20), (60, 80)]),
            raw("big_gap", 3.0, &[(25, 55)]),
            raw("gap_a", 4.0, &[(25, 35)]),
            raw("gap_b", 5.0, &[(45, 55)]),
        ]);
        let arch = Resolver::resolve(&list);
        assert_eq!(arch.score(), 14.0);
        assert_eq!(arch.hits().len(), 3);
    }

    #[test]
    fn naive_greedy_admits_best_first_skipping_overlaps() {
        let list = build_list(vec![raw("low", 1.0, &[(0, 20)]), raw("high", 9.0, &[(5, 25)])]);
        let arch = naive_greedy_resolve(&list);
        assert_eq!(arch.score(), 9.0);
        assert_eq!(arch.hits().len(), 1);
        assert_eq!(arch.hits()[0].label, "high");
    }

    #[test]
    fn empty_hit_list_resolves_to_zero_score_empty_architecture() {
        let list = build_list(vec![]);
        let arch = Resolver::resolve(&list);
        assert_eq!(arch.score(), 0.0);
        assert!(arch.hits().is_empty());
    }
}
