//! Filesystem asset fetcher.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::trace;

use crate::collaborators::ContentFetcher;
use crate::error::FetchError;

/// Reads asset references relative to a base directory.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    base: PathBuf,
}

impl FsFetcher {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        self.base.join(path)
    }
}

impl ContentFetcher for FsFetcher {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let full = self.resolve(path);
        trace!(path = %full.display(), "fetching asset");
        match tokio::fs::read_to_string(&full).await {
            Ok(text) => Ok(text),
            Err(error) if error.kind() == ErrorKind::NotFound => Err(FetchError::NotFound {
                path: path.to_string(),
            }),
            Err(source) => Err(FetchError::Io {
                path: path.to_string(),
                source,
            }),
        }
    }
}

/// Fetch `path`, failing with [`FetchError::TimedOut`] when `timeout` elapses first.
pub async fn fetch_with_timeout<F: ContentFetcher>(
    fetcher: &F,
    path: &str,
    timeout: Option<Duration>,
) -> Result<String, FetchError> {
    match timeout {
        Some(timeout) => tokio::time::timeout(timeout, fetcher.fetch(path))
            .await
            .map_err(|_| FetchError::TimedOut {
                path: path.to_string(),
                timeout,
            })?,
        None => fetcher.fetch(path).await,
    }
}
