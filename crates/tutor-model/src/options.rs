//! Runtime options for a tutorial session.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Literal tokens delimiting one region of a content asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerPair {
    pub open: String,
    pub close: String,
}

impl MarkerPair {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }
}

/// Marker tokens for the editable snippet and the surrounding preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerTokens {
    pub snippet: MarkerPair,
    pub preview: MarkerPair,
}

impl Default for MarkerTokens {
    fn default() -> Self {
        Self {
            snippet: MarkerPair::new("<?snippet-start?>", "<?snippet-end?>"),
            preview: MarkerPair::new("<?preview-start?>", "<?preview-end?>"),
        }
    }
}

impl MarkerTokens {
    /// All four tokens, in document order.
    pub fn all(&self) -> [&str; 4] {
        [
            &self.preview.open,
            &self.snippet.open,
            &self.snippet.close,
            &self.preview.close,
        ]
    }
}

/// Fixed learner-facing messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub malformed: String,
    pub render_failed: String,
    pub finished: String,
    pub finish_entry: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            malformed: "Your code is not well-formed.".to_string(),
            render_failed: "Cannot render this input.".to_string(),
            finished: "Finished successfully!".to_string(),
            finish_entry: "Finish".to_string(),
        }
    }
}

/// Options controlling region extraction, fetching and rule evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorOptions {
    pub markers: MarkerTokens,

    /// Closing token of the root element; closes a region whose end marker is absent.
    pub root_close_token: String,

    /// Editor height used when a step gives no line hint.
    pub default_editor_lines: u16,

    /// Upper bound for a single asset fetch. Unbounded when absent.
    pub fetch_timeout_ms: Option<u64>,

    /// Prefix to namespace URI map available to rule predicates.
    pub namespaces: BTreeMap<String, String>,

    pub messages: Messages,
}

/// Extra editor height on top of the line count, leaving room for a partial line.
pub const EDITOR_HEIGHT_PADDING: f32 = 0.7;

pub const MEI_NAMESPACE: &str = "http://www.music-encoding.org/ns/mei";
pub const TEI_NAMESPACE: &str = "http://www.tei-c.org/ns/1.0";

impl Default for TutorOptions {
    fn default() -> Self {
        let mut namespaces = BTreeMap::new();
        namespaces.insert("mei".to_string(), MEI_NAMESPACE.to_string());
        namespaces.insert("tei".to_string(), TEI_NAMESPACE.to_string());
        Self {
            markers: MarkerTokens::default(),
            root_close_token: "</mei>".to_string(),
            default_editor_lines: 5,
            fetch_timeout_ms: None,
            namespaces,
            messages: Messages::default(),
        }
    }
}

impl TutorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_root_close_token(mut self, token: impl Into<String>) -> Self {
        self.root_close_token = token.into();
        self
    }

    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    #[must_use]
    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.insert(prefix.into(), uri.into());
        self
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    /// Editor line count for a step hint.
    pub fn editor_lines(&self, hint: Option<u16>) -> u16 {
        hint.unwrap_or(self.default_editor_lines)
    }

    /// Editor height for a step hint, in line units.
    pub fn editor_height(&self, hint: Option<u16>) -> f32 {
        f32::from(self.editor_lines(hint)) + EDITOR_HEIGHT_PADDING
    }
}
