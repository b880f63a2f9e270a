//! Step lifecycle with recording collaborators.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use tutor_core::{
    Collaborators, ContentFetcher, EditorAdapter, FetchError, HintSurface, ListenerHandle,
    PassOutcome, PreviewSurface, RenderEngine, RenderError, RenderSurface, StepController,
    StepError, StepMarker, StepPhase, StepView,
};
use tutor_model::{Rule, Step, TutorOptions, TutorialDefinition};
use tutor_validate::VerdictStatus;

const STEP_ONE: &str = "<mei xmlns=\"http://www.music-encoding.org/ns/mei\">\n<?preview-start?>\n  <layer>\n<?snippet-start?>\n    <note pname=\"c\"/>\n<?snippet-end?>\n  </layer>\n<?preview-end?>\n</mei>";
const STEP_TWO: &str = "<mei xmlns=\"http://www.music-encoding.org/ns/mei\"><layer><?snippet-start?><?snippet-end?></layer></mei>";

#[derive(Default)]
struct EditorState {
    value: String,
    listeners: Vec<ListenerHandle>,
    next_id: u64,
    registrations: usize,
    heights: Vec<f32>,
}

#[derive(Clone, Default)]
struct MockEditor(Rc<RefCell<EditorState>>);

impl MockEditor {
    fn listeners(&self) -> Vec<ListenerHandle> {
        self.0.borrow().listeners.clone()
    }

    fn registrations(&self) -> usize {
        self.0.borrow().registrations
    }
}

impl EditorAdapter for MockEditor {
    fn set_value(&mut self, text: &str) {
        self.0.borrow_mut().value = text.to_string();
    }

    fn value(&self) -> String {
        self.0.borrow().value.clone()
    }

    fn on_change(&mut self) -> ListenerHandle {
        let mut state = self.0.borrow_mut();
        state.next_id += 1;
        state.registrations += 1;
        let handle = ListenerHandle::new(state.next_id);
        state.listeners.push(handle);
        handle
    }

    fn off_change(&mut self, handle: ListenerHandle) {
        self.0.borrow_mut().listeners.retain(|active| *active != handle);
    }

    fn resize(&mut self, height: f32) {
        self.0.borrow_mut().heights.push(height);
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ViewEvent {
    Steps(Vec<String>),
    Activate(StepMarker),
    Label(String),
    Instruction(String),
    Preview(String),
    Rows(u16),
    Hint(String),
    ClearHints,
    Markup(String),
    ClearMarkup,
}

#[derive(Clone, Default)]
struct MockView(Rc<RefCell<Vec<ViewEvent>>>);

impl MockView {
    fn events(&self) -> Vec<ViewEvent> {
        self.0.borrow().clone()
    }

    fn take(&self) -> Vec<ViewEvent> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    fn push(&self, event: ViewEvent) {
        self.0.borrow_mut().push(event);
    }
}

impl PreviewSurface for MockView {
    fn set_preview_text(&mut self, text: &str) {
        self.push(ViewEvent::Preview(text.to_string()));
    }

    fn set_preview_rows(&mut self, rows: u16) {
        self.push(ViewEvent::Rows(rows));
    }
}

impl HintSurface for MockView {
    fn show_hint(&mut self, text: &str) {
        self.push(ViewEvent::Hint(text.to_string()));
    }

    fn clear_hints(&mut self) {
        self.push(ViewEvent::ClearHints);
    }
}

impl RenderSurface for MockView {
    fn set_markup(&mut self, markup: &str) {
        self.push(ViewEvent::Markup(markup.to_string()));
    }

    fn clear_markup(&mut self) {
        self.push(ViewEvent::ClearMarkup);
    }
}

impl StepView for MockView {
    fn show_steps(&mut self, labels: &[String]) {
        self.push(ViewEvent::Steps(labels.to_vec()));
    }

    fn activate_step(&mut self, marker: StepMarker) {
        self.push(ViewEvent::Activate(marker));
    }

    fn set_label(&mut self, label: &str) {
        self.push(ViewEvent::Label(label.to_string()));
    }

    fn show_instruction(&mut self, text: &str) {
        self.push(ViewEvent::Instruction(text.to_string()));
    }
}

#[derive(Clone, Default)]
struct RecordingRenderer {
    inputs: Rc<RefCell<Vec<String>>>,
    fail: bool,
}

impl RenderEngine for RecordingRenderer {
    fn render(&self, text: &str) -> Result<String, RenderError> {
        self.inputs.borrow_mut().push(text.to_string());
        if self.fail {
            Err(RenderError::Rejected("unsupported".to_string()))
        } else {
            Ok(format!("<svg data-bytes=\"{}\"/>", text.len()))
        }
    }
}

struct MemoryFetcher(HashMap<String, String>);

impl MemoryFetcher {
    fn new(files: &[(&str, &str)]) -> Self {
        Self(
            files
                .iter()
                .map(|(path, text)| (path.to_string(), text.to_string()))
                .collect(),
        )
    }
}

impl ContentFetcher for MemoryFetcher {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        self.0.get(path).cloned().ok_or_else(|| FetchError::NotFound {
            path: path.to_string(),
        })
    }
}

struct StalledFetcher;

impl ContentFetcher for StalledFetcher {
    async fn fetch(&self, _: &str) -> Result<String, FetchError> {
        std::future::pending().await
    }
}

struct Harness<F> {
    controller: StepController<F>,
    editor: MockEditor,
    view: MockView,
    renderer: RecordingRenderer,
}

impl<F: ContentFetcher> Harness<F> {
    fn build(definition: TutorialDefinition, options: TutorOptions, fetcher: F, fail_render: bool) -> Self {
        let editor = MockEditor::default();
        let view = MockView::default();
        let renderer = RecordingRenderer {
            fail: fail_render,
            ..RecordingRenderer::default()
        };
        let mut collaborators = Collaborators::with_defaults(
            &options,
            fetcher,
            Box::new(editor.clone()),
            Box::new(view.clone()),
        );
        collaborators.renderer = Box::new(renderer.clone());
        Self {
            controller: StepController::new(definition, options, collaborators),
            editor,
            view,
            renderer,
        }
    }

    fn armed_handle(&self) -> ListenerHandle {
        let listeners = self.editor.listeners();
        assert_eq!(listeners.len(), 1, "exactly one listener is registered");
        listeners[0]
    }

    async fn type_text(&mut self, text: &str) -> PassOutcome {
        self.editor.0.borrow_mut().value = text.to_string();
        let handle = self.armed_handle();
        self.controller.handle_edit(handle).await.unwrap()
    }

    fn rendered(&self) -> Vec<String> {
        self.renderer.inputs.borrow().clone()
    }
}

fn tutorial() -> TutorialDefinition {
    TutorialDefinition::new(
        vec![
            Step::new("step1.xml")
                .with_label("Notes")
                .with_description("step1.html")
                .with_rule(Rule::new("count(//mei:note) >= 1").with_hint("Add a note."))
                .with_rule(
                    Rule::new("//mei:note[@pname = 'c']")
                        .with_hint("Use a C.")
                        .with_render_anyway(false),
                ),
            Step::new("step2.xml")
                .with_prefill("step2.prefill")
                .with_editor_lines(8)
                .with_rule(Rule::new("count(//mei:note) = 2").with_hint("Add a second note.")),
        ],
        "All done",
    )
}

fn assets() -> MemoryFetcher {
    MemoryFetcher::new(&[
        ("step1.xml", STEP_ONE),
        ("step1.html", "Write a note"),
        ("step2.xml", STEP_TWO),
        ("step2.prefill", "<note pname=\"c\"/>"),
    ])
}

async fn started() -> Harness<MemoryFetcher> {
    let mut harness = Harness::build(tutorial(), TutorOptions::default(), assets(), false);
    harness.controller.start().await.unwrap();
    harness.view.take();
    harness
}

#[tokio::test]
async fn start_lists_steps_and_arms_the_first_step() {
    let mut harness = Harness::build(tutorial(), TutorOptions::default(), assets(), false);
    harness.controller.start().await.unwrap();

    assert_eq!(harness.controller.phase(), StepPhase::Armed);
    assert_eq!(harness.controller.current_step(), Some(0));
    assert_eq!(harness.editor.registrations(), 1);
    assert_eq!(harness.controller.active_listener(), Some(harness.armed_handle()));
    assert_eq!(harness.editor.value(), "");

    let heights = harness.editor.0.borrow().heights.clone();
    assert_eq!(heights.len(), 1);
    assert!((heights[0] - 5.7).abs() < 1e-4);

    let events = harness.view.events();
    assert_eq!(
        events[0],
        ViewEvent::Steps(vec![
            "Notes".to_string(),
            "Step 2".to_string(),
            "Finish".to_string()
        ])
    );
    assert!(events.contains(&ViewEvent::Label("Notes".to_string())));
    assert!(events.contains(&ViewEvent::Activate(StepMarker::Step(0))));
    assert!(events.contains(&ViewEvent::Instruction("Write a note".to_string())));
    assert!(events.contains(&ViewEvent::Preview("<layer>\n\n</layer>".to_string())));
    assert!(events.contains(&ViewEvent::Rows(5)));
}

#[tokio::test]
async fn malformed_edit_keeps_the_listener() {
    let mut harness = started().await;
    let before = harness.armed_handle();

    let outcome = harness.type_text("<note pname=\"c\">").await;

    assert_eq!(outcome, PassOutcome::Malformed);
    assert_eq!(harness.armed_handle(), before);
    assert_eq!(harness.editor.registrations(), 1);
    assert_eq!(harness.controller.phase(), StepPhase::Armed);
    assert!(harness.rendered().is_empty());
    assert_eq!(
        harness.view.events(),
        vec![
            ViewEvent::ClearHints,
            ViewEvent::ClearMarkup,
            ViewEvent::Preview("<layer>\n<note pname=\"c\">\n</layer>".to_string()),
            ViewEvent::Hint("Your code is not well-formed.".to_string()),
            ViewEvent::ClearMarkup,
        ]
    );
}

#[tokio::test]
async fn invalid_edit_rearms_exactly_one_listener() {
    let mut harness = started().await;
    let before = harness.armed_handle();

    let outcome = harness.type_text("<note pname=\"d\"/>").await;

    let PassOutcome::Invalid(verdict) = outcome else {
        panic!("expected an invalid verdict, got {outcome:?}");
    };
    assert_eq!(verdict.status, VerdictStatus::Invalid);
    assert_eq!(verdict.hint.as_deref(), Some("Use a C."));
    assert!(!verdict.render_anyway);

    let after = harness.armed_handle();
    assert_ne!(after, before);
    assert_eq!(harness.editor.registrations(), 2);
    assert_eq!(harness.controller.phase(), StepPhase::Armed);
    assert!(harness.rendered().is_empty());
    assert!(harness.view.events().contains(&ViewEvent::Hint("Use a C.".to_string())));

    let stale = harness.controller.handle_edit(before).await.unwrap();
    assert_eq!(stale, PassOutcome::Ignored);
    assert_eq!(harness.editor.registrations(), 2);
}

#[tokio::test]
async fn failing_rule_with_render_anyway_still_renders() {
    let mut harness = started().await;

    let outcome = harness.type_text("").await;

    assert!(matches!(outcome, PassOutcome::Invalid(ref verdict) if verdict.hint.as_deref() == Some("Add a note.")));
    let rendered = harness.rendered();
    assert_eq!(rendered.len(), 1);
    assert_eq!(
        rendered[0],
        "<mei xmlns=\"http://www.music-encoding.org/ns/mei\">\n\n  <layer>\n\n  </layer>\n\n</mei>"
    );
    let events = harness.view.events();
    let hint = events
        .iter()
        .position(|event| *event == ViewEvent::Hint("Add a note.".to_string()))
        .unwrap();
    let markup = events
        .iter()
        .position(|event| matches!(event, ViewEvent::Markup(_)))
        .unwrap();
    assert!(hint < markup);
}

#[tokio::test]
async fn render_failure_shows_the_fixed_message() {
    let mut harness = Harness::build(tutorial(), TutorOptions::default(), assets(), true);
    harness.controller.start().await.unwrap();

    harness.type_text("").await;

    assert!(
        harness
            .view
            .events()
            .contains(&ViewEvent::Markup("Cannot render this input.".to_string()))
    );
    assert_eq!(harness.editor.listeners().len(), 1);
}

#[tokio::test]
async fn valid_edits_advance_and_finish() {
    let mut harness = started().await;

    let outcome = harness.type_text("<note pname=\"c\"/>").await;

    assert_eq!(outcome, PassOutcome::Advanced { step: 1 });
    assert_eq!(harness.rendered().len(), 1);
    assert_eq!(harness.controller.current_step(), Some(1));
    assert_eq!(harness.controller.phase(), StepPhase::Armed);
    assert_eq!(harness.editor.value(), "<note pname=\"c\"/>");
    assert_eq!(harness.editor.listeners().len(), 1);
    let heights = harness.editor.0.borrow().heights.clone();
    assert!((heights[1] - 8.7).abs() < 1e-4);
    let events = harness.view.take();
    assert!(events.contains(&ViewEvent::Label("Step 2".to_string())));
    assert!(events.contains(&ViewEvent::Activate(StepMarker::Step(1))));
    assert!(events.contains(&ViewEvent::Rows(8)));

    let last_handle = harness.armed_handle();
    let outcome = harness
        .type_text("<note pname=\"c\"/><note pname=\"e\"/>")
        .await;

    assert_eq!(outcome, PassOutcome::Finished);
    assert!(harness.controller.is_finished());
    assert!(harness.editor.listeners().is_empty());
    assert_eq!(harness.controller.active_listener(), None);
    let events = harness.view.events();
    assert_eq!(
        events[events.len() - 3..],
        [
            ViewEvent::Activate(StepMarker::Outro),
            ViewEvent::Label("Finished successfully!".to_string()),
            ViewEvent::Instruction("All done".to_string()),
        ]
    );

    let after_finish = harness.controller.handle_edit(last_handle).await.unwrap();
    assert_eq!(after_finish, PassOutcome::Ignored);
    assert!(harness.editor.listeners().is_empty());
}

#[tokio::test]
async fn unevaluable_rule_fails_without_a_hint() {
    let definition = TutorialDefinition::new(
        vec![
            Step::new("step1.xml")
                .with_rule(Rule::new("//bogus:note").with_hint("never shown").with_render_anyway(false)),
        ],
        "",
    );
    let mut harness = Harness::build(definition, TutorOptions::default(), assets(), false);
    harness.controller.start().await.unwrap();
    harness.view.take();

    let outcome = harness.type_text("<note/>").await;

    let PassOutcome::Invalid(verdict) = outcome else {
        panic!("expected an invalid verdict");
    };
    assert_eq!(verdict.hint, None);
    assert!(verdict.render_anyway);
    assert_eq!(harness.rendered().len(), 1);
    assert!(!harness.view.events().iter().any(|event| matches!(event, ViewEvent::Hint(_))));
    assert_eq!(harness.editor.listeners().len(), 1);
}

#[tokio::test]
async fn missing_content_leaves_the_step_loading() {
    let fetcher = MemoryFetcher::new(&[("step1.html", "Write a note")]);
    let mut harness = Harness::build(tutorial(), TutorOptions::default(), fetcher, false);

    let err = harness.controller.start().await.unwrap_err();

    assert!(matches!(
        err,
        StepError::Fetch { step: 0, source: FetchError::NotFound { ref path } } if path == "step1.xml"
    ));
    assert_eq!(harness.controller.phase(), StepPhase::Loading);
    assert!(harness.controller.run_state().is_none());
    assert!(harness.editor.listeners().is_empty());
}

#[tokio::test]
async fn missing_description_is_not_fatal() {
    let fetcher = MemoryFetcher::new(&[("step1.xml", STEP_ONE)]);
    let mut harness = Harness::build(tutorial(), TutorOptions::default(), fetcher, false);

    harness.controller.start().await.unwrap();

    assert_eq!(harness.controller.phase(), StepPhase::Armed);
    assert!(
        !harness
            .view
            .events()
            .iter()
            .any(|event| matches!(event, ViewEvent::Instruction(_)))
    );
}

#[tokio::test]
async fn misplaced_markers_are_an_authoring_error() {
    let fetcher = MemoryFetcher::new(&[(
        "step1.xml",
        "<mei><?snippet-start?><a/><?snippet-end?><?preview-start?><b/><?preview-end?></mei>",
    )]);
    let mut harness = Harness::build(tutorial(), TutorOptions::default(), fetcher, false);

    let err = harness.controller.start().await.unwrap_err();

    assert!(matches!(err, StepError::Region { step: 0, .. }));
    assert_eq!(harness.controller.phase(), StepPhase::Loading);
    assert!(harness.editor.listeners().is_empty());
}

#[tokio::test]
async fn stalled_fetch_times_out_when_configured() {
    let options = TutorOptions::default().with_fetch_timeout(Duration::from_millis(20));
    let mut harness = Harness::build(tutorial(), options, StalledFetcher, false);

    let err = harness.controller.start().await.unwrap_err();

    assert!(matches!(
        err,
        StepError::Fetch { step: 0, source: FetchError::TimedOut { .. } }
    ));
    assert_eq!(harness.controller.phase(), StepPhase::Loading);
}

#[tokio::test]
async fn loading_an_unknown_step_fails() {
    let mut harness = Harness::build(tutorial(), TutorOptions::default(), assets(), false);
    let err = harness.controller.load_step(7).await.unwrap_err();
    assert!(matches!(err, StepError::NoSuchStep { index: 7 }));
    assert_eq!(harness.controller.phase(), StepPhase::Idle);
}

#[tokio::test]
async fn finished_tutorial_cannot_be_reloaded() {
    let definition = TutorialDefinition::new(
        vec![Step::new("step1.xml").with_rule(Rule::new("count(//mei:note) = 1"))],
        "Bye",
    );
    let mut harness = Harness::build(definition, TutorOptions::default(), assets(), false);
    harness.controller.start().await.unwrap();
    assert_eq!(harness.type_text("<note/>").await, PassOutcome::Finished);
    let registrations = harness.editor.registrations();

    let err = harness.controller.load_step(0).await.unwrap_err();
    assert!(matches!(err, StepError::Finished));
    let err = harness.controller.start().await.unwrap_err();
    assert!(matches!(err, StepError::Finished));

    assert_eq!(harness.controller.phase(), StepPhase::Finished);
    assert!(harness.editor.listeners().is_empty());
    assert_eq!(harness.editor.registrations(), registrations);
    assert_eq!(harness.controller.active_listener(), None);
}
