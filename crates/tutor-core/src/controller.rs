//! The per-step load, arm, evaluate and advance state machine.

use tracing::{debug, info, trace, warn};
use tutor_model::{Rule, TutorOptions, TutorialDefinition};
use tutor_regions::{SnippetParts, extract_regions};
use tutor_validate::{ValidationEngine, Verdict, VerdictStatus};

use crate::collaborators::{
    Collaborators, ContentFetcher, EditorAdapter, ListenerHandle, RenderEngine, StepMarker,
    TutorView,
};
use crate::error::{FetchError, Result, StepError};
use crate::fetch::fetch_with_timeout;
use crate::render::RenderOutcome;
use crate::state::{RunState, StepPhase};

/// What one edit event led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// The handle is not the armed listener, or no step is armed.
    Ignored,
    /// The candidate did not parse; the listener stays registered.
    Malformed,
    /// A rule failed; a fresh listener was registered.
    Invalid(Verdict),
    /// Every rule passed and the given step was loaded.
    Advanced { step: usize },
    /// Every rule of the last step passed.
    Finished,
}

/// Drives a tutorial one step at a time.
///
/// At most one change listener is registered at any time. It is detached
/// before any render or advance decision and re-registered only after the
/// render attempt of an `Invalid` pass.
pub struct StepController<F> {
    definition: TutorialDefinition,
    options: TutorOptions,
    editor: Box<dyn EditorAdapter>,
    renderer: Box<dyn RenderEngine>,
    engine: ValidationEngine,
    fetcher: F,
    view: Box<dyn TutorView>,
    phase: StepPhase,
    current_step: Option<usize>,
    run: Option<RunState>,
}

impl<F: ContentFetcher> StepController<F> {
    pub fn new(
        definition: TutorialDefinition,
        options: TutorOptions,
        collaborators: Collaborators<F>,
    ) -> Self {
        let Collaborators {
            editor,
            renderer,
            parser,
            evaluator,
            fetcher,
            view,
        } = collaborators;
        Self {
            definition,
            options,
            editor,
            renderer,
            engine: ValidationEngine::from_boxed(parser, evaluator),
            fetcher,
            view,
            phase: StepPhase::Idle,
            current_step: None,
            run: None,
        }
    }

    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == StepPhase::Finished
    }

    /// Step being loaded or worked on.
    pub fn current_step(&self) -> Option<usize> {
        self.current_step
    }

    pub fn run_state(&self) -> Option<&RunState> {
        self.run.as_ref()
    }

    pub fn active_listener(&self) -> Option<ListenerHandle> {
        self.run.as_ref().and_then(|run| run.listener)
    }

    pub fn definition(&self) -> &TutorialDefinition {
        &self.definition
    }

    pub fn options(&self) -> &TutorOptions {
        &self.options
    }

    /// List the steps and load the first one.
    pub async fn start(&mut self) -> Result<()> {
        if self.is_finished() {
            return Err(StepError::Finished);
        }
        let mut entries = self.definition.labels();
        entries.push(self.options.messages.finish_entry.clone());
        self.view.show_steps(&entries);
        self.load_step(0).await
    }

    /// Fetch a step's assets, cut its regions, prefill the editor and arm it.
    ///
    /// On error the controller stays in [`StepPhase::Loading`] with no
    /// listener registered. A finished tutorial rejects every load.
    pub async fn load_step(&mut self, index: usize) -> Result<()> {
        if self.is_finished() {
            return Err(StepError::Finished);
        }
        let step = self
            .definition
            .step(index)
            .cloned()
            .ok_or(StepError::NoSuchStep { index })?;

        self.detach();
        self.run = None;
        self.current_step = Some(index);
        self.phase = StepPhase::Loading;

        let label = step.display_label(index);
        info!(step = index, %label, "loading step");
        self.view.set_label(&label);
        self.view.activate_step(StepMarker::Step(index));

        let (content, prefill, description) = tokio::join!(
            self.fetch(&step.content_ref),
            self.fetch_optional(step.prefill_ref.as_deref()),
            self.fetch_optional(step.description_ref.as_deref()),
        );

        match description {
            Ok(Some(text)) => self.view.show_instruction(&text),
            Ok(None) => {}
            Err(error) => warn!(step = index, %error, "description could not be fetched"),
        }

        let content = content.map_err(|source| fetch_failed(index, source))?;
        let prefill = prefill
            .map_err(|source| fetch_failed(index, source))?
            .unwrap_or_default();

        let regions = extract_regions(&content, &self.options)
            .map_err(|source| StepError::Region { step: index, source })?;
        let parts = SnippetParts::from_regions(&regions);

        self.view.set_preview_text(&parts.initial_preview(&prefill));
        self.editor.set_value(&prefill);
        self.editor
            .resize(self.options.editor_height(step.editor_line_hint));
        self.view
            .set_preview_rows(self.options.editor_lines(step.editor_line_hint));

        self.run = Some(RunState::new(index, regions, parts));
        self.arm();
        debug!(step = index, "step armed");
        Ok(())
    }

    /// Run one evaluation pass for a change reported on `handle`.
    pub async fn handle_edit(&mut self, handle: ListenerHandle) -> Result<PassOutcome> {
        let Some(run) = self.run.as_ref() else {
            return Ok(PassOutcome::Ignored);
        };
        if self.phase != StepPhase::Armed || run.listener != Some(handle) {
            debug!(handle = handle.id(), "ignoring change on a detached listener");
            return Ok(PassOutcome::Ignored);
        }

        self.phase = StepPhase::Evaluating;
        let step_index = run.step_index;
        let edit = self.editor.value();
        trace!(step = step_index, edit = %edit, "evaluating edit");
        let preview = run.parts.preview.assemble(&edit);
        let candidate = run.parts.validation.assemble(&edit);

        self.view.clear_hints();
        self.view.clear_markup();
        self.view.set_preview_text(&preview);

        let rules: &[Rule] = self
            .definition
            .step(step_index)
            .map(|step| step.rules.as_slice())
            .unwrap_or_default();
        let verdict = self.engine.validate(&candidate, rules);
        debug!(step = step_index, status = ?verdict.status, "edit evaluated");

        match verdict.status {
            VerdictStatus::Malformed => {
                self.view.show_hint(&self.options.messages.malformed);
                self.view.clear_markup();
                self.phase = StepPhase::Armed;
                Ok(PassOutcome::Malformed)
            }
            VerdictStatus::Invalid => {
                self.detach();
                if let Some(hint) = &verdict.hint {
                    self.view.show_hint(hint);
                }
                if verdict.should_render() {
                    self.render(&candidate);
                }
                self.arm();
                Ok(PassOutcome::Invalid(verdict))
            }
            VerdictStatus::Valid => {
                self.detach();
                self.render(&candidate);
                self.phase = StepPhase::Advancing;
                self.advance(step_index).await
            }
        }
    }

    async fn advance(&mut self, from: usize) -> Result<PassOutcome> {
        let next = from + 1;
        if next < self.definition.len() {
            info!(from, to = next, "step completed");
            self.load_step(next).await?;
            Ok(PassOutcome::Advanced { step: next })
        } else {
            self.finish();
            Ok(PassOutcome::Finished)
        }
    }

    fn finish(&mut self) {
        self.run = None;
        self.phase = StepPhase::Finished;
        self.view.activate_step(StepMarker::Outro);
        self.view.set_label(&self.options.messages.finished);
        self.view.show_instruction(&self.definition.outro);
        info!("tutorial finished");
    }

    fn render(&mut self, candidate: &str) -> RenderOutcome {
        let outcome = RenderOutcome::attempt(self.renderer.as_ref(), candidate);
        match &outcome {
            RenderOutcome::Rendered(markup) => self.view.set_markup(markup),
            RenderOutcome::RenderFailed => self.view.set_markup(&self.options.messages.render_failed),
        }
        outcome
    }

    fn arm(&mut self) {
        if let Some(run) = self.run.as_mut() {
            if let Some(stale) = run.listener.take() {
                self.editor.off_change(stale);
            }
            run.listener = Some(self.editor.on_change());
            self.phase = StepPhase::Armed;
        }
    }

    fn detach(&mut self) {
        if let Some(run) = self.run.as_mut()
            && let Some(handle) = run.listener.take()
        {
            self.editor.off_change(handle);
        }
    }

    async fn fetch(&self, path: &str) -> std::result::Result<String, FetchError> {
        fetch_with_timeout(&self.fetcher, path, self.options.fetch_timeout()).await
    }

    async fn fetch_optional(
        &self,
        path: Option<&str>,
    ) -> std::result::Result<Option<String>, FetchError> {
        match path {
            Some(path) => self.fetch(path).await.map(Some),
            None => Ok(None),
        }
    }
}

fn fetch_failed(step: usize, source: FetchError) -> StepError {
    warn!(step, error = %source, "step assets could not be fetched");
    StepError::Fetch { step, source }
}

impl<F> std::fmt::Debug for StepController<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepController")
            .field("phase", &self.phase)
            .field("current_step", &self.current_step)
            .field("run", &self.run)
            .finish_non_exhaustive()
    }
}
