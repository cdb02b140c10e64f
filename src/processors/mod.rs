//! Output renderers: each resolved query's [`ScoredArchitecture`] is fanned
//! out to every configured processor.

pub mod html;
pub mod json;
pub mod text;

use crate::error::ResolveError;
use crate::scored_arch::ScoredArchitecture;

/// A renderer that consumes one query's resolved architecture at a time.
/// Implementations own their destination (a file, stdout, an in-memory
/// buffer) and flush incrementally; there is no persisted state beyond a
/// single process's lifetime.
pub trait HitsProcessor: Send {
    fn process_query(&mut self, query_id: &str, architecture: &ScoredArchitecture) -> Result<(), ResolveError>;

    /// Called once after the last query has been processed, so buffered
    /// writers can flush and renderers that wrap their output (HTML) can
    /// close it out.
    fn finish(&mut self) -> Result<(), ResolveError> {
        Ok(())
    }

    /// Whether this processor needs strictly-dominated duplicate hits (same
    /// residue ranges, lower score) kept in the `HitList` rather than pruned.
    /// None of the built-in renderers do; a future diagnostic processor that
    /// reports near-miss alternatives would override this.
    fn wants_preserve_duplicates(&self) -> bool {
        false
    }
}
