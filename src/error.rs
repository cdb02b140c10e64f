//! Error types composed across parsing, configuration and resolution.

use std::io;
use thiserror::Error;

/// Errors raised while parsing an input stream into raw hit records.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed line {line}: {message}")]
    MalformedLine { line: usize, message: String },

    #[error("unexpected end of input while parsing a {0} record")]
    UnexpectedEof(&'static str),
}

/// Errors raised while validating a resolver configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{option}: {message}")]
    InvalidOption { option: &'static str, message: String },

    #[error("stdin and an input file were both given; pick exactly one source")]
    AmbiguousInputSource,

    #[error("no input source given (expected stdin or a file path)")]
    NoInputSource,
}

/// Internal invariant violations inside the resolver. These are always
/// logic errors in this crate, never a consequence of bad input, so callers
/// should treat them as fatal rather than attempt recovery.
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("mask signature store received an out-of-order arrow for the same signature")]
    OutOfOrderCacheWrite,

    #[error("query {0:?} was finalised twice")]
    DuplicateFinalise(String),
}

/// The top-level error type for the hit-resolution pipeline.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resolver(#[from] ResolverError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serialising output: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
