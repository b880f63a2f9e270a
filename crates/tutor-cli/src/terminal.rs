//! Editor and view adapters backed by a line-oriented terminal.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use tracing::{trace, warn};
use tutor_core::{
    EditorAdapter, HintSurface, ListenerHandle, PreviewSurface, RenderSurface, StepMarker,
    StepView,
};

#[derive(Debug, Default)]
struct EditorState {
    value: String,
    listeners: Vec<ListenerHandle>,
    next_id: u64,
    height: f32,
}

/// Text buffer fed from stdin. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct TerminalEditor {
    state: Rc<RefCell<EditorState>>,
}

impl TerminalEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the buffer as the learner would and return the listeners to notify.
    pub fn type_text(&self, text: &str) -> Vec<ListenerHandle> {
        let mut state = self.state.borrow_mut();
        state.value = text.to_string();
        state.listeners.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    pub fn height(&self) -> f32 {
        self.state.borrow().height
    }
}

impl EditorAdapter for TerminalEditor {
    fn set_value(&mut self, text: &str) {
        self.state.borrow_mut().value = text.to_string();
    }

    fn value(&self) -> String {
        self.state.borrow().value.clone()
    }

    fn on_change(&mut self) -> ListenerHandle {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let handle = ListenerHandle::new(state.next_id);
        state.listeners.push(handle);
        handle
    }

    fn off_change(&mut self, handle: ListenerHandle) {
        self.state
            .borrow_mut()
            .listeners
            .retain(|active| *active != handle);
    }

    fn resize(&mut self, height: f32) {
        trace!(height, "editor resized");
        self.state.borrow_mut().height = height;
    }
}

/// Writes every surface update as plain text.
pub struct TerminalView<W> {
    out: W,
    entries: Vec<String>,
    preview_rows: u16,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            entries: Vec::new(),
            preview_rows: 0,
        }
    }

    /// Rows requested for the preview of the current step.
    pub fn preview_rows(&self) -> u16 {
        self.preview_rows
    }

    fn emit(&mut self, text: &str) {
        if let Err(error) = writeln!(self.out, "{text}") {
            warn!(%error, "failed to write to terminal");
        }
    }

    fn block(&mut self, title: &str, body: &str) {
        self.emit(&format!("--- {title} ---"));
        self.emit(body);
        self.emit("---");
    }
}

impl<W: Write> PreviewSurface for TerminalView<W> {
    fn set_preview_text(&mut self, text: &str) {
        self.block("preview", text);
    }

    fn set_preview_rows(&mut self, rows: u16) {
        self.preview_rows = rows;
    }
}

impl<W: Write> HintSurface for TerminalView<W> {
    fn show_hint(&mut self, text: &str) {
        self.emit(&format!("! {text}"));
    }

    fn clear_hints(&mut self) {}
}

impl<W: Write> RenderSurface for TerminalView<W> {
    fn set_markup(&mut self, markup: &str) {
        self.block("rendering", markup);
    }

    fn clear_markup(&mut self) {}
}

impl<W: Write> StepView for TerminalView<W> {
    fn show_steps(&mut self, labels: &[String]) {
        self.entries = labels.to_vec();
        self.emit("Steps:");
        for (index, label) in labels.iter().enumerate() {
            self.emit(&format!("  {}. {label}", index + 1));
        }
    }

    fn activate_step(&mut self, marker: StepMarker) {
        let position = match marker {
            StepMarker::Step(index) => index,
            StepMarker::Outro => self.entries.len().saturating_sub(1),
        };
        if let Some(entry) = self.entries.get(position).cloned() {
            self.emit(&format!(">> {entry}"));
        }
    }

    fn set_label(&mut self, label: &str) {
        self.emit(&format!("# {label}"));
    }

    fn show_instruction(&mut self, text: &str) {
        self.emit(text.trim_end());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_reports_registered_listeners() {
        let mut editor = TerminalEditor::new();
        let first = editor.on_change();
        let second = editor.on_change();
        editor.off_change(first);

        assert_eq!(editor.type_text("<note/>"), vec![second]);
        assert_eq!(editor.value(), "<note/>");
        assert_eq!(editor.listener_count(), 1);
    }

    #[test]
    fn view_marks_the_outro_entry() {
        let mut view = TerminalView::new(Vec::new());
        view.show_steps(&["Notes".to_string(), "Finish".to_string()]);
        view.activate_step(StepMarker::Outro);
        view.show_hint("Add a note.");
        view.set_preview_rows(8);
        assert_eq!(view.preview_rows(), 8);

        let text = String::from_utf8(view.out).unwrap();
        assert_eq!(text, "Steps:\n  1. Notes\n  2. Finish\n>> Finish\n! Add a note.\n");
    }
}
