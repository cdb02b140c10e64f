//! [`Mask`]: the set of currently-masking hits, carried through the
//! resolver's recursion, plus its [`MaskSignature`] memoisation key.

use std::ops::Deref;

use crate::hit::Hit;
use crate::segment::{right_intersperses, right_or_inside_intersperses, Seg};

/// The ordered list of segments from every hit in a [`Mask`], used as the
/// [`crate::masked_cache::MaskedBestsCache`] key. Two masks with the same
/// segments in the same order are the same key, regardless of which hits
/// they were built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MaskSignature(Vec<Seg>);

impl Deref for MaskSignature {
    type Target = [Seg];

    fn deref(&self) -> &[Seg] {
        &self.0
    }
}

/// The set of hits masking out residues for a sub-problem of the resolver's
/// recursion. Immutable; growing a mask produces a new one (`with_hit`),
/// which is cheap enough here since masks are only ever a handful of hits
/// deep in practice.
#[derive(Debug, Clone, Default)]
pub struct Mask {
    /// Each masking hit's own (already sorted, disjoint) segments, kept
    /// separately because the cache-arrow precomputation (SPEC_FULL.md
    /// §4.G) must test interspersion against each hit individually.
    per_hit: Vec<Vec<Seg>>,
    /// The flattened, arrow-sorted union of every hit's segments.
    signature: MaskSignature,
}

impl Mask {
    pub fn empty() -> Self {
        Mask::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.per_hit.is_empty()
    }

    /// Returns a new mask with `hit` added.
    pub fn with_hit(&self, hit: &Hit) -> Mask {
        let mut per_hit = self.per_hit.clone();
        per_hit.push(hit.segments().to_vec());

        let mut flat = self.signature.0.clone();
        flat.extend_from_slice(hit.segments());
        flat.sort();
        Mask {
            per_hit,
            signature: MaskSignature(flat),
        }
    }

    pub fn signature(&self) -> &MaskSignature {
        &self.signature
    }

    /// Whether `hit` overlaps any segment currently in the mask.
    pub fn overlaps(&self, hit: &Hit) -> bool {
        hit.overlaps_any(&self.signature.0)
    }

    /// Whether `inner` right-or-inside-intersperses every masking hit and
    /// strictly right-intersperses at least one -- the admission test for
    /// SPEC_FULL.md §4.G's `cache_arrows` precomputation.
    pub fn intersperses_every_and_any(&self, inner: &[Seg]) -> bool {
        self.per_hit
            .iter()
            .all(|m| right_or_inside_intersperses(inner, m))
            && self.per_hit.iter().any(|m| right_intersperses(inner, m))
    }

    /// The individual masking hits' segment lists, for the first-segment /
    /// last-segment bound computation in `precompute_cache_arrows`.
    pub fn hit_segments(&self) -> &[Vec<Seg>] {
        &self.per_hit
    }
}
