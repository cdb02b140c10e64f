//! [`DiscontStartIndex`]: a start-sorted index of discontiguous hits, for
//! fast range queries by the cache-arrow precomputation (SPEC_FULL.md §4.G).

use std::ops::Range;

use crate::arrow::Arrow;
use crate::hit::HitIndex;
use crate::hit_list::HitList;

/// An immutable, start-sorted list of `(start_arrow, hit_index)` for every
/// discontiguous hit in a `HitList`. Built once per query.
#[derive(Debug)]
pub struct DiscontStartIndex {
    entries: Vec<(Arrow, HitIndex)>,
}

impl DiscontStartIndex {
    pub fn build(hit_list: &HitList) -> Self {
        let mut entries: Vec<(Arrow, HitIndex)> = hit_list
            .iter()
            .enumerate()
            .filter(|(_, h)| h.is_discontig())
            .map(|(idx, h)| (h.start_arrow(), idx))
            .collect();
        entries.sort_by_key(|&(start, _)| start);
        DiscontStartIndex { entries }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The index range `[first with start >= lo, first with start > hi)`
    /// via binary search, i.e. entries whose start arrow lies in `[lo, hi]`.
    pub fn indices_in_range(&self, lo: Arrow, hi: Arrow) -> Range<usize> {
        let start = self.entries.partition_point(|&(s, _)| s < lo);
        let end = self.entries.partition_point(|&(s, _)| s <= hi);
        start..end
    }

    pub fn hit_index_at(&self, entry_idx: usize) -> HitIndex {
        self.entries[entry_idx].1
    }

    pub fn start_at(&self, entry_idx: usize) -> Arrow {
        self.entries[entry_idx].0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit_list::RawHitRecord;
    use crate::specs::{DomainType, FilterSpec, ScoreKind, ScoreSpec, SegDuplHitPolicy, SegmentSpec};

    fn raw_discontig(label: &str, segs: &[(u64, u64)]) -> RawHitRecord {
        RawHitRecord {
            label: label.to_string(),
            raw_score: 1.0,
            score_kind: ScoreKind::Score,
            domain_type: DomainType::Normal,
            segments: segs.to_vec(),
            cond_evalue: None,
            indp_evalue: None,
        }
    }

    #[test]
    fn only_discontiguous_hits_are_indexed_and_sorted_by_start() {
        let raws = vec![
            raw_discontig("contig", &[(0, 10)]),
            raw_discontig("disc_b", &[(50, 60), (100, 110)]),
            raw_discontig("disc_a", &[(5, 15), (30, 40)]),
        ];
        let list = HitList::build(
            raws,
            &ScoreSpec::default(),
            &SegmentSpec::default(),
            &FilterSpec::default(),
            SegDuplHitPolicy::Preserve,
        );
        let index = DiscontStartIndex::build(&list);
        assert_eq!(index.len(), 2);
        assert!(index.start_at(0) <= index.start_at(1));
    }

    #[test]
    fn range_query_is_inclusive_lo_inclusive_hi() {
        let raws = vec![
            raw_discontig("a", &[(10, 20), (40, 50)]),
            raw_discontig("b", &[(20, 30), (60, 70)]),
            raw_discontig("c", &[(30, 35), (80, 90)]),
        ];
        let list = HitList::build(
            raws,
            &ScoreSpec::default(),
            &SegmentSpec::default(),
            &FilterSpec::default(),
            SegDuplHitPolicy::Preserve,
        );
        let index = DiscontStartIndex::build(&list);
        let range = index.indices_in_range(Arrow::new(10), Arrow::new(20));
        assert_eq!(range.len(), 2);
        assert_eq!(index.start_at(range.start), Arrow::new(10));
    }
}
