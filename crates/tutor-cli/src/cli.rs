//! CLI argument definitions for the tutorial runner.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "tutor",
    version,
    about = "Run interactive snippet tutorials in the terminal",
    long_about = "Run step-by-step tutorials in which a marked snippet of an XML document\n\
                  is edited, validated against XPath rules and rendered after every change."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a tutorial, reading editor input from stdin.
    ///
    /// Type the snippet, then a line containing only `.` to submit it.
    Run(TutorialArgs),

    /// Check every step's assets, markers and rules without running.
    Check(TutorialArgs),
}

#[derive(Parser)]
pub struct TutorialArgs {
    /// Path to the tutorial definition (JSON).
    #[arg(value_name = "TUTORIAL_JSON")]
    pub tutorial: PathBuf,

    /// Directory asset references resolve against (default: the tutorial's directory).
    #[arg(long = "assets", value_name = "DIR")]
    pub assets: Option<PathBuf>,

    /// TOML file with tutor options.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
