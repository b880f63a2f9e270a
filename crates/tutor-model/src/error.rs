//! Error types for tutorial definition loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or checking a tutorial definition.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The definition file could not be read.
    #[error("failed to read tutorial definition: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The definition is not valid JSON or does not match the expected shape.
    #[error("invalid tutorial definition: {0}")]
    Json(#[from] serde_json::Error),

    /// The definition has no steps.
    #[error("tutorial definition has no steps")]
    NoSteps,

    /// A step has no content asset.
    #[error("step {step} has no content file")]
    MissingContent { step: usize },

    /// A rule has an empty predicate.
    #[error("step {step}, rule {rule} has an empty predicate")]
    EmptyPredicate { step: usize, rule: usize },
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
