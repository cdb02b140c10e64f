//! [`ScoredArchProxy`]: a compact architecture representation referring into
//! a `HitList` by index, and its materialised counterpart [`ScoredArchitecture`].

use crate::hit::HitIndex;
use crate::hit_list::HitList;

/// The score assigned to an architecture that contains no hits, and the
/// floor every real candidate score must exceed to be preferred over "no
/// result yet".
pub const INIT_SCORE: f64 = f64::NEG_INFINITY;

/// A score plus the indices (into a `HitList`) of the hits making up an
/// architecture. Cheap to copy/extend compared to materialising full `Hit`
/// values, which is why the DP recursion works with this instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredArchProxy {
    score: f64,
    hit_indices: Vec<HitIndex>,
}

impl Default for ScoredArchProxy {
    fn default() -> Self {
        ScoredArchProxy {
            score: INIT_SCORE,
            hit_indices: Vec::new(),
        }
    }
}

impl ScoredArchProxy {
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn score(&self) -> f64 {
        self.score
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hit_indices.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.hit_indices.len()
    }

    #[inline]
    pub fn hit_indices(&self) -> &[HitIndex] {
        &self.hit_indices
    }

    /// Adds `hit_index` (with its `score`) in place.
    pub fn add_hit(&mut self, score: f64, hit_index: HitIndex) {
        if self.score == INIT_SCORE {
            self.score = score;
        } else {
            self.score += score;
        }
        self.hit_indices.push(hit_index);
    }
}

/// Adds `hit_index` to a copy of `proxy`, leaving `proxy` untouched.
pub fn add_hit_copy(mut proxy: ScoredArchProxy, score: f64, hit_index: HitIndex) -> ScoredArchProxy {
    proxy.add_hit(score, hit_index);
    proxy
}

/// The materialised, user-facing result of resolving one query: a score and
/// the full owned hits (in `HitList` order) that make it up.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredArchitecture {
    score: f64,
    hits: Vec<ResolvedHit>,
}

/// A single hit as it appears in a [`ScoredArchitecture`]: its label, score
/// and segments, detached from the `HitList` it was resolved against.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedHit {
    pub label: String,
    pub score: f64,
    pub segments: Vec<(u64, u64)>,
}

impl ScoredArchitecture {
    #[inline]
    pub fn score(&self) -> f64 {
        self.score
    }

    #[inline]
    pub fn hits(&self) -> &[ResolvedHit] {
        &self.hits
    }
}

/// Materialises a [`ScoredArchProxy`] against the `HitList` (and label
/// table) it indexes into.
pub fn make_scored_architecture(proxy: &ScoredArchProxy, hit_list: &HitList) -> ScoredArchitecture {
    let mut hits: Vec<ResolvedHit> = proxy
        .hit_indices()
        .iter()
        .map(|&idx| {
            let hit = &hit_list[idx];
            ResolvedHit {
                label: hit_list.label_of(hit.label_idx()).to_string(),
                score: hit.score(),
                segments: hit
                    .segments()
                    .iter()
                    .map(|s| (s.start().index(), s.stop().index()))
                    .collect(),
            }
        })
        .collect();
    hits.sort_by(|a, b| a.segments.first().cmp(&b.segments.first()));
    let score = if proxy.is_empty() { 0.0 } else { proxy.score() };
    ScoredArchitecture { score, hits }
}
