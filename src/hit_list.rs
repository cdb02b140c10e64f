//! [`HitList`]: the canonically-ordered, per-query container of hits, built
//! from raw records by applying the score/segment/filter specs.

use std::ops::{Index, Range};

use crate::arrow::Arrow;
use crate::hit::{Hit, HitExtras, HitIndex};
use crate::segment::Seg;
use crate::specs::{DomainType, FilterSpec, ScoreKind, ScoreSpec, SegDuplHitPolicy, SegmentSpec};

/// One incoming hit before segment filtering/trimming and score conversion
/// have been applied.
#[derive(Debug, Clone)]
pub struct RawHitRecord {
    pub label: String,
    pub raw_score: f64,
    pub score_kind: ScoreKind,
    pub domain_type: DomainType,
    pub segments: Vec<(u64, u64)>,
    pub cond_evalue: Option<f64>,
    pub indp_evalue: Option<f64>,
}

/// A per-query, canonically-sorted vector of [`Hit`]s plus the label table
/// their `label_idx`es refer into (in original insertion order, stable
/// across the later sort -- mirrors the distinction between the source's
/// `full_hits` and `the_hits`).
#[derive(Debug, Clone, Default)]
pub struct HitList {
    hits: Vec<Hit>,
    labels: Vec<String>,
}

impl HitList {
    /// Builds a `HitList` from raw records: drops segments shorter than
    /// `segment_spec.min_seg_length` (and the whole hit if none remain),
    /// trims the rest, converts scores, filters by `filter_spec`, sorts by
    /// the canonical ordering and (per `dup_policy`) prunes strictly-worse
    /// duplicates.
    pub fn build(
        raw_hits: Vec<RawHitRecord>,
        score_spec: &ScoreSpec,
        segment_spec: &SegmentSpec,
        filter_spec: &FilterSpec,
        dup_policy: SegDuplHitPolicy,
    ) -> Self {
        let mut labels = Vec::with_capacity(raw_hits.len());
        let mut hits = Vec::with_capacity(raw_hits.len());

        for raw in raw_hits {
            let kept: Vec<(u64, u64)> = raw
                .segments
                .iter()
                .copied()
                .filter(|&(start, stop)| stop - start >= segment_spec.min_seg_length)
                .collect();
            if kept.is_empty() {
                continue;
            }
            let trimmed: Vec<Seg> = kept
                .into_iter()
                .map(|(start, stop)| {
                    let (ts, te) = segment_spec.trim(start, stop);
                    Seg::new(Arrow::new(ts), Arrow::new(te))
                })
                .collect();

            let dp_score = score_spec.dp_score(
                raw.raw_score,
                raw.score_kind,
                raw.domain_type,
                raw.cond_evalue,
                raw.indp_evalue,
            );
            if !filter_spec.accepts_score(dp_score) {
                continue;
            }

            let label_idx = labels.len();
            labels.push(raw.label);
            let extras = HitExtras {
                cond_evalue: raw.cond_evalue,
                indp_evalue: raw.indp_evalue,
            };
            hits.push(Hit::new(trimmed, dp_score, label_idx, extras));
        }

        let mut list = HitList { hits, labels };
        list.sort();
        if dup_policy == SegDuplHitPolicy::Prune {
            list.remove_redundant_hits();
        }
        list
    }

    /// The canonical ordering: `(stop_arrow, start_arrow, score, n_segments,
    /// segment_ranges..., label)`, ascending.
    fn sort(&mut self) {
        let labels = self.labels.clone();
        self.hits.sort_by(|a, b| {
            a.stop_arrow()
                .cmp(&b.stop_arrow())
                .then(a.start_arrow().cmp(&b.start_arrow()))
                .then(a.score().partial_cmp(&b.score()).expect("finite scores"))
                .then(a.num_segments().cmp(&b.num_segments()))
                .then_with(|| {
                    a.segments()
                        .iter()
                        .map(|s| (s.start(), s.stop()))
                        .cmp(b.segments().iter().map(|s| (s.start(), s.stop())))
                })
                .then_with(|| labels[a.label_idx()].cmp(&labels[b.label_idx()]))
        });
    }

    /// Removes hits that are strictly dominated by another hit with
    /// identical residue ranges but a greater-or-equal score, keeping the
    /// single best (ties keep the first under the canonical order, which
    /// `sort` has already established).
    fn remove_redundant_hits(&mut self) {
        let mut keep = vec![true; self.hits.len()];
        for i in 0..self.hits.len() {
            if !keep[i] {
                continue;
            }
            for j in (i + 1)..self.hits.len() {
                if !keep[j] {
                    continue;
                }
                if self.hits[i].segments() == self.hits[j].segments() {
                    // sort() placed the lower score first on ties; since j > i
                    // and ranges match, hit i is dominated whenever its score
                    // is <= hit j's score.
                    if self.hits[i].score() <= self.hits[j].score() {
                        keep[i] = false;
                        break;
                    } else {
                        keep[j] = false;
                    }
                }
            }
        }
        let mut kept_hits = Vec::with_capacity(self.hits.len());
        for (hit, k) in self.hits.drain(..).zip(keep) {
            if k {
                kept_hits.push(hit);
            }
        }
        self.hits = kept_hits;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Hit> {
        self.hits.iter()
    }

    pub fn label_of(&self, label_idx: usize) -> &str {
        &self.labels[label_idx]
    }

    /// The greatest stop arrow across all hits, or `None` if empty.
    pub fn max_stop(&self) -> Option<Arrow> {
        self.hits.iter().map(Hit::stop_arrow).max()
    }

    /// The index range `[lo_idx, hi_idx)` of hits whose `stop_arrow` falls in
    /// `(lo, hi]`. Exploits that `hits` is sorted primarily by `stop_arrow`.
    pub fn indices_of_hits_that_stop_in_range(&self, lo: Arrow, hi: Arrow) -> Range<HitIndex> {
        let start = self.hits.partition_point(|h| h.stop_arrow() <= lo);
        let end = self.hits.partition_point(|h| h.stop_arrow() <= hi);
        start..end
    }
}

impl Index<HitIndex> for HitList {
    type Output = Hit;

    fn index(&self, index: HitIndex) -> &Hit {
        &self.hits[index]
    }
}
