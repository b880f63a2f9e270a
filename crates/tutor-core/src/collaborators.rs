//! Capabilities injected into the [`StepController`](crate::StepController).

use std::future::Future;

use tutor_model::TutorOptions;
use tutor_validate::{DocumentParser, RuleEvaluator};
use tutor_xml::{OutlineRenderer, XPathEvaluator, XmlParser};

use crate::error::{FetchError, RenderError};

/// Retrieves asset text by reference. The only suspending collaborator.
pub trait ContentFetcher {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String, FetchError>>;
}

/// Identifies one registered change listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

impl ListenerHandle {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// The learner's text editor.
///
/// Change notifications are delivered by the host calling
/// [`StepController::handle_edit`](crate::StepController::handle_edit) with the
/// handle returned from [`on_change`](Self::on_change). `set_value` from the
/// controller must not notify listeners.
pub trait EditorAdapter {
    fn set_value(&mut self, text: &str);
    fn value(&self) -> String;
    fn on_change(&mut self) -> ListenerHandle;
    fn off_change(&mut self, handle: ListenerHandle);
    /// Height in line units, padding included.
    fn resize(&mut self, height: f32);
}

/// Turns a validation document into display markup.
pub trait RenderEngine {
    fn render(&self, text: &str) -> Result<String, RenderError>;
}

impl RenderEngine for OutlineRenderer {
    fn render(&self, text: &str) -> Result<String, RenderError> {
        Ok(OutlineRenderer::render(self, text)?)
    }
}

pub trait PreviewSurface {
    fn set_preview_text(&mut self, text: &str);
    fn set_preview_rows(&mut self, rows: u16);
}

pub trait HintSurface {
    fn show_hint(&mut self, text: &str);
    fn clear_hints(&mut self);
}

pub trait RenderSurface {
    fn set_markup(&mut self, markup: &str);
    fn clear_markup(&mut self);
}

/// Entry of the step list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMarker {
    Step(usize),
    Outro,
}

/// Step list, step label and instruction text.
pub trait StepView {
    /// Called once with every step label followed by the finish entry.
    fn show_steps(&mut self, labels: &[String]);
    fn activate_step(&mut self, marker: StepMarker);
    fn set_label(&mut self, label: &str);
    fn show_instruction(&mut self, text: &str);
}

/// Every surface the controller writes to.
pub trait TutorView: PreviewSurface + HintSurface + RenderSurface + StepView {}

impl<T: PreviewSurface + HintSurface + RenderSurface + StepView> TutorView for T {}

/// Everything a [`StepController`](crate::StepController) is built from.
pub struct Collaborators<F> {
    pub editor: Box<dyn EditorAdapter>,
    pub renderer: Box<dyn RenderEngine>,
    pub parser: Box<dyn DocumentParser>,
    pub evaluator: Box<dyn RuleEvaluator>,
    pub fetcher: F,
    pub view: Box<dyn TutorView>,
}

impl<F: ContentFetcher> Collaborators<F> {
    /// XML parser, XPath evaluator over the configured namespaces and the
    /// outline renderer.
    pub fn with_defaults(
        options: &TutorOptions,
        fetcher: F,
        editor: Box<dyn EditorAdapter>,
        view: Box<dyn TutorView>,
    ) -> Self {
        Self {
            editor,
            renderer: Box::new(OutlineRenderer),
            parser: Box::new(XmlParser),
            evaluator: Box::new(XPathEvaluator::with_namespaces(options.namespaces.clone())),
            fetcher,
            view,
        }
    }
}
