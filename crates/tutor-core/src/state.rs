use tutor_regions::{RegionSet, SnippetParts};

use crate::collaborators::ListenerHandle;

/// Where the controller is in a step's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    /// Not started.
    Idle,
    /// Fetching assets. A failed load leaves the controller here.
    Loading,
    /// A change listener is registered.
    Armed,
    Evaluating,
    Advancing,
    /// Terminal; no listener is ever registered again.
    Finished,
}

/// Per-step state, replaced wholesale on every step load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    pub step_index: usize,
    pub regions: RegionSet,
    pub parts: SnippetParts,
    pub listener: Option<ListenerHandle>,
}

impl RunState {
    pub fn new(step_index: usize, regions: RegionSet, parts: SnippetParts) -> Self {
        Self {
            step_index,
            regions,
            parts,
            listener: None,
        }
    }

    pub fn listener_armed(&self) -> bool {
        self.listener.is_some()
    }
}
