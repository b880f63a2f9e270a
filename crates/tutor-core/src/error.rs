//! Error types for step loading and collaborators.

use std::time::Duration;

use thiserror::Error;
use tutor_regions::RegionConfigError;
use tutor_xml::RenderFailure;

/// An asset could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("asset not found: {path}")]
    NotFound { path: String },

    #[error("failed to read asset: {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("fetching {path} timed out after {timeout:?}")]
    TimedOut { path: String, timeout: Duration },
}

/// The render engine rejected a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error(transparent)]
    Outline(#[from] RenderFailure),

    #[error("render engine rejected the document: {0}")]
    Rejected(String),
}

/// A step could not be loaded. The controller stays in `Loading`.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("step {step}: {source}")]
    Fetch {
        step: usize,
        #[source]
        source: FetchError,
    },

    /// Authoring error in the step's content asset.
    #[error("step {step} has an invalid marker layout: {source}")]
    Region {
        step: usize,
        #[source]
        source: RegionConfigError,
    },

    #[error("step {index} does not exist")]
    NoSuchStep { index: usize },

    /// The tutorial already finished; no step can be loaded again.
    #[error("tutorial is already finished")]
    Finished,
}

/// Result type alias for controller operations.
pub type Result<T> = std::result::Result<T, StepError>;
