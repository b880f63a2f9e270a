use tracing::warn;

use crate::collaborators::RenderEngine;

/// Result of one render attempt. Failures are recovered into a fixed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered(String),
    RenderFailed,
}

impl RenderOutcome {
    pub fn attempt(engine: &dyn RenderEngine, text: &str) -> Self {
        match engine.render(text) {
            Ok(markup) => Self::Rendered(markup),
            Err(error) => {
                warn!(%error, "render failed");
                Self::RenderFailed
            }
        }
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered(_))
    }
}
