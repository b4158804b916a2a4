//! CLI command definitions using clap

use crate::journeys::Journey;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Pagewright: browser journeys for the starter template
#[derive(Parser, Debug)]
#[command(name = "pagewright")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format on stderr
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run journeys against a live app in Chromium
    Run(RunArgs),

    /// List the starter pages and their identity locators
    Pages(PagesArgs),

    /// Show the effective e2e configuration
    Config(ConfigArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Journey to run (repeatable; default: all)
    #[arg(short = 'J', long = "journey", value_name = "NAME")]
    pub journeys: Vec<JourneyArg>,

    /// YAML configuration file
    #[arg(short, long, env = "PAGEWRIGHT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the app under test
    #[arg(long)]
    pub base_url: Option<String>,

    /// Postgres URL used for cleanup
    #[arg(long)]
    pub database_url: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Journeys run at once (0 = all)
    #[arg(short = 'j', long, default_value = "0")]
    pub jobs: usize,

    /// Stop starting journeys after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Result format on stdout
    #[arg(short, long, default_value = "text")]
    pub format: FormatArg,
}

/// Arguments for the pages command
#[derive(Parser, Debug)]
pub struct PagesArgs {
    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: FormatArg,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// YAML configuration file
    #[arg(short, long, env = "PAGEWRIGHT_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Journey names accepted on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum JourneyArg {
    /// Sign up a new account and land on the dashboard
    SignUp,
    /// Sign up twice with one email and see the error
    DuplicateSignUp,
    /// Sign in with an existing account
    SignIn,
}

impl From<JourneyArg> for Journey {
    fn from(arg: JourneyArg) -> Self {
        match arg {
            JourneyArg::SignUp => Self::SignUp,
            JourneyArg::DuplicateSignUp => Self::DuplicateSignUp,
            JourneyArg::SignIn => Self::SignIn,
        }
    }
}

/// Output format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

impl From<FormatArg> for crate::output::OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

/// Log format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
