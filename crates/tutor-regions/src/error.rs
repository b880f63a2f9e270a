//! Region configuration errors.
//!
//! These describe content-authoring mistakes, never learner mistakes.

use thiserror::Error;

/// The marker layout of a content asset cannot produce a region set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionConfigError {
    /// The preview region does not contain the snippet region.
    #[error(
        "preview region {preview_start}..{preview_end} does not contain snippet region {snippet_start}..{snippet_end}"
    )]
    NotContained {
        preview_start: usize,
        preview_end: usize,
        snippet_start: usize,
        snippet_end: usize,
    },

    /// Markers overlap or appear out of order.
    #[error("{region} markers are out of order: {start} > {end}")]
    Misordered {
        region: &'static str,
        start: usize,
        end: usize,
    },

    /// A closing marker is missing and the document has no root-closing token to fall back on.
    #[error("no closing marker for the {region} region and no root closing token {token:?}")]
    MissingRootClose { region: &'static str, token: String },
}

/// Result type alias for region operations.
pub type Result<T> = std::result::Result<T, RegionConfigError>;
