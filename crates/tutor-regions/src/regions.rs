//! Region computation.

use tracing::debug;
use tutor_model::{MarkerTokens, TutorOptions};

use crate::boundary::{MarkerBoundary, locate_pair};
use crate::error::{RegionConfigError, Result};

/// Five contiguous slices of a document, split around the marker tokens.
///
/// Concatenating the five regions yields the document with the marker tokens
/// removed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegionSet {
    /// Text before the preview opening marker.
    pub prefix: String,
    /// Text between the preview opening marker and the snippet opening marker.
    pub gap_before: String,
    /// The original snippet content.
    pub core: String,
    /// Text between the snippet closing marker and the preview closing marker.
    pub gap_after: String,
    /// Text after the preview closing marker.
    pub suffix: String,
}

/// Cut `document` into a [`RegionSet`].
///
/// Fails when the preview boundary does not contain the snippet boundary,
/// when markers are out of order, or when a closing offset could not be
/// resolved.
pub fn compute_regions(
    document: &str,
    snippet: &MarkerBoundary,
    preview: &MarkerBoundary,
) -> Result<RegionSet> {
    for (region, boundary) in [("snippet", snippet), ("preview", preview)] {
        if !boundary.is_resolved() {
            return Err(RegionConfigError::MissingRootClose {
                region,
                token: String::new(),
            });
        }
    }

    if preview.open_start > snippet.open_start || preview.close_end < snippet.close_end {
        return Err(RegionConfigError::NotContained {
            preview_start: preview.open_start,
            preview_end: preview.close_end,
            snippet_start: snippet.open_start,
            snippet_end: snippet.close_end,
        });
    }

    let prefix = slice(document, "prefix", 0, preview.open_start)?;
    let gap_before = slice(document, "preview", preview.open_end, snippet.open_start)?;
    let core = slice(document, "snippet", snippet.open_end, snippet.close_start)?;
    let gap_after = slice(document, "preview", snippet.close_end, preview.close_start)?;
    let suffix = slice(document, "suffix", preview.close_end, document.len())?;

    Ok(RegionSet {
        prefix: prefix.to_string(),
        gap_before: gap_before.to_string(),
        core: core.to_string(),
        gap_after: gap_after.to_string(),
        suffix: suffix.to_string(),
    })
}

fn slice<'a>(document: &'a str, region: &'static str, start: usize, end: usize) -> Result<&'a str> {
    if start > end {
        return Err(RegionConfigError::Misordered { region, start, end });
    }
    document
        .get(start..end)
        .ok_or(RegionConfigError::Misordered { region, start, end })
}

/// Locate both marker pairs with the configured tokens and compute the regions.
pub fn extract_regions(document: &str, options: &TutorOptions) -> Result<RegionSet> {
    let root_close = options.root_close_token.as_str();
    let snippet = locate_pair(document, &options.markers.snippet, root_close);
    let preview = locate_pair(document, &options.markers.preview, root_close);
    debug!(?snippet, ?preview, "located markers");
    compute_regions(document, &snippet, &preview).map_err(|error| match error {
        RegionConfigError::MissingRootClose { region, .. } => RegionConfigError::MissingRootClose {
            region,
            token: root_close.to_string(),
        },
        other => other,
    })
}

/// Remove every marker token from `document`.
pub fn strip_markers(document: &str, markers: &MarkerTokens) -> String {
    markers
        .all()
        .into_iter()
        .filter(|token| !token.is_empty())
        .fold(document.to_string(), |text, token| text.replace(token, ""))
}

impl RegionSet {
    /// Reassemble the document (without markers) around a replacement core.
    pub fn with_core(&self, core: &str) -> String {
        let mut text = String::with_capacity(
            self.prefix.len()
                + self.gap_before.len()
                + core.len()
                + self.gap_after.len()
                + self.suffix.len(),
        );
        text.push_str(&self.prefix);
        text.push_str(&self.gap_before);
        text.push_str(core);
        text.push_str(&self.gap_after);
        text.push_str(&self.suffix);
        text
    }
}
