// Clippy allows for the whole crate
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]

//! hitres: a dynamic-programming hit-resolution engine.
//!
//! Given a set of scored, possibly-overlapping, possibly-discontiguous hits
//! against a query sequence, picks the maximum-scoring subset of pairwise
//! non-overlapping hits. Built for HMM-search-style hit lists (HMMER
//! `domtblout`/plain output) as well as a simple raw tabular format.
//!
//! # Example
//!
//! ```rust,no_run
//! use hitres::hit_list::{HitList, RawHitRecord};
//! use hitres::resolver::Resolver;
//! use hitres::specs::{DomainType, FilterSpec, ScoreKind, ScoreSpec, SegDuplHitPolicy, SegmentSpec};
//!
//! let raws = vec![RawHitRecord {
//!     label: "domain_a".to_string(),
//!     raw_score: 12.5,
//!     score_kind: ScoreKind::Score,
//!     domain_type: DomainType::Normal,
//!     segments: vec![(0, 50)],
//!     cond_evalue: None,
//!     indp_evalue: None,
//! }];
//! let list = HitList::build(
//!     raws,
//!     &ScoreSpec::default(),
//!     &SegmentSpec::default(),
//!     &FilterSpec::default(),
//!     SegDuplHitPolicy::Prune,
//! );
//! let architecture = Resolver::resolve(&list);
//! assert_eq!(architecture.hits().len(), 1);
//! ```

pub mod arrow;
pub mod cacher;
pub mod discont_index;
pub mod error;
pub mod hit;
pub mod hit_list;
pub mod manager;
pub mod mask;
pub mod masked_cache;
pub mod parsers;
pub mod processors;
pub mod resolver;
pub mod scan;
pub mod scored_arch;
pub mod segment;
pub mod specs;

pub use error::{ConfigError, ParseError, ResolveError, ResolverError, Result};
pub use hit_list::HitList;
pub use manager::Manager;
pub use resolver::{naive_greedy_resolve, Resolver};
pub use scored_arch::ScoredArchitecture;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{ResolveError, Result};
    pub use crate::hit_list::{HitList, RawHitRecord};
    pub use crate::manager::Manager;
    pub use crate::processors::html::HtmlProcessor;
    pub use crate::processors::json::JsonProcessor;
    pub use crate::processors::text::TextProcessor;
    pub use crate::processors::HitsProcessor;
    pub use crate::resolver::{naive_greedy_resolve, Resolver};
    pub use crate::scored_arch::ScoredArchitecture;
    pub use crate::specs::{
        DomainType, FilterSpec, InputFormat, OutputFormat, ScoreKind, ScoreSpec, SegDuplHitPolicy, SegmentSpec,
    };
}
