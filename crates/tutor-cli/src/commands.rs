use std::io;

use anyhow::{Context, Result};
use tracing::info_span;
use tutor_cli::check::{CheckReport, check_tutorial};
use tutor_cli::config::{assets_dir, load_options};
use tutor_cli::session::{SessionSummary, run_session};
use tutor_core::FsFetcher;
use tutor_model::{TutorOptions, TutorialDefinition, load_tutorial};

use crate::cli::TutorialArgs;

pub fn run_tutorial(args: &TutorialArgs) -> Result<SessionSummary> {
    let (definition, options, fetcher) = prepare(args)?;
    let span = info_span!("run", tutorial = %args.tutorial.display());
    let _guard = span.enter();
    runtime()?.block_on(run_session(
        definition,
        options,
        fetcher,
        io::stdin().lock(),
        io::stdout(),
    ))
}

pub fn run_check(args: &TutorialArgs) -> Result<CheckReport> {
    let (definition, options, fetcher) = prepare(args)?;
    let span = info_span!("check", tutorial = %args.tutorial.display());
    let _guard = span.enter();
    Ok(runtime()?.block_on(check_tutorial(&definition, &options, &fetcher)))
}

fn prepare(args: &TutorialArgs) -> Result<(TutorialDefinition, TutorOptions, FsFetcher)> {
    let definition = load_tutorial(&args.tutorial)
        .with_context(|| format!("failed to load tutorial {}", args.tutorial.display()))?;
    let options = load_options(args.config.as_deref())?;
    let fetcher = FsFetcher::new(assets_dir(&args.tutorial, args.assets.as_deref()));
    Ok((definition, options, fetcher))
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")
}
