//! Arrow positions: boundaries between residues.
//!
//! An [`Arrow`] marks a point *between* two residues rather than a residue
//! itself, so half-open segments built from arrows never need a special
//! case for touching-but-not-overlapping intervals.

use std::fmt;

/// A position between residues. `Arrow(i)` sits between residue `i-1` and
/// residue `i` (residues are conceptually 0-indexed internally).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Arrow(u64);

impl Arrow {
    /// The arrow at the very start of the sequence.
    pub const START: Arrow = Arrow(0);

    #[inline]
    pub fn new(index: u64) -> Self {
        Arrow(index)
    }

    #[inline]
    pub fn index(self) -> u64 {
        self.0
    }

    /// The arrow immediately before residue `n` (0-indexed): equivalent to `n`.
    #[inline]
    pub fn before_res(n: u64) -> Self {
        Arrow(n)
    }

    /// The arrow immediately after residue `n` (0-indexed): equivalent to `n + 1`.
    #[inline]
    pub fn after_res(n: u64) -> Self {
        Arrow(n + 1)
    }

    /// The arrow one step earlier.
    ///
    /// # Panics
    /// Panics if called on [`Arrow::START`]; callers must only subtract where
    /// a preceding arrow is known to exist.
    #[inline]
    pub fn pred(self) -> Self {
        Arrow(self.0.checked_sub(1).expect("Arrow::pred underflow"))
    }

    #[inline]
    pub fn succ(self) -> Self {
        Arrow(self.0 + 1)
    }

    #[inline]
    pub fn checked_pred(self) -> Option<Self> {
        self.0.checked_sub(1).map(Arrow)
    }
}

impl fmt::Display for Arrow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Converts a 1-based inclusive residue index into the arrow immediately
/// before it, per the raw-format convention in the external interfaces.
#[inline]
pub fn arrow_before_res_1based(res_1based: u64) -> Arrow {
    Arrow::before_res(res_1based - 1)
}

/// Converts a 1-based inclusive residue index into the arrow immediately
/// after it.
#[inline]
pub fn arrow_after_res_1based(res_1based: u64) -> Arrow {
    Arrow::after_res(res_1based - 1)
}
