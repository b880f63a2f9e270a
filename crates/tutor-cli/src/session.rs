//! Interactive tutorial session over line-oriented input and output.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::debug;
use tutor_core::{Collaborators, ContentFetcher, PassOutcome, StepController};
use tutor_model::{TutorOptions, TutorialDefinition};

use crate::terminal::{TerminalEditor, TerminalView};

/// Input line that submits the lines typed since the previous submission.
pub const SUBMIT_LINE: &str = ".";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSummary {
    /// Evaluation passes run.
    pub passes: usize,
    pub steps_completed: usize,
    pub finished: bool,
}

/// Run a tutorial, reading editor contents from `input` and writing every
/// surface to `output`.
///
/// Lines are collected until a line holding only `.`; the collected text then
/// replaces the editor buffer and fires one change. End of input ends the
/// session.
pub async fn run_session<F, R, W>(
    definition: TutorialDefinition,
    options: TutorOptions,
    fetcher: F,
    input: R,
    output: W,
) -> Result<SessionSummary>
where
    F: ContentFetcher,
    R: BufRead,
    W: Write + 'static,
{
    let editor = TerminalEditor::new();
    let collaborators = Collaborators::with_defaults(
        &options,
        fetcher,
        Box::new(editor.clone()),
        Box::new(TerminalView::new(output)),
    );
    let mut controller = StepController::new(definition, options, collaborators);
    controller
        .start()
        .await
        .context("failed to load the first step")?;

    let mut summary = SessionSummary::default();
    let mut buffer: Vec<String> = Vec::new();
    for line in input.lines() {
        let line = line.context("failed to read editor input")?;
        if line.trim_end() != SUBMIT_LINE {
            buffer.push(line);
            continue;
        }

        let text = buffer.join("\n");
        buffer.clear();
        for handle in editor.type_text(&text) {
            let outcome = controller
                .handle_edit(handle)
                .await
                .context("failed to load the next step")?;
            debug!(?outcome, "pass complete");
            match outcome {
                PassOutcome::Ignored => continue,
                PassOutcome::Advanced { .. } | PassOutcome::Finished => summary.steps_completed += 1,
                PassOutcome::Malformed | PassOutcome::Invalid(_) => {}
            }
            summary.passes += 1;
        }
        if controller.is_finished() {
            break;
        }
    }

    summary.finished = controller.is_finished();
    Ok(summary)
}
