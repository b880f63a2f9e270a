//! Step controller for snippet tutorials.
//!
//! [`StepController`] loads each step's assets through a [`ContentFetcher`],
//! cuts the content into regions, prefills the editor and registers a single
//! change listener. Every reported edit rebuilds the preview and validation
//! texts, runs the step's rules and then warns, renders, re-arms or advances.
//!
//! The editor, renderer, parser, rule evaluator, fetcher and view surfaces
//! are injected through [`Collaborators`].

mod collaborators;
mod controller;
mod error;
mod fetch;
mod render;
mod state;

pub use collaborators::{
    Collaborators, ContentFetcher, EditorAdapter, HintSurface, ListenerHandle, PreviewSurface,
    RenderEngine, RenderSurface, StepMarker, StepView, TutorView,
};
pub use controller::{PassOutcome, StepController};
pub use error::{FetchError, RenderError, Result, StepError};
pub use fetch::{FsFetcher, fetch_with_timeout};
pub use render::RenderOutcome;
pub use state::{RunState, StepPhase};
