//! Pagewright CLI library
//!
//! Runs the starter-template journeys in Chromium, cleans up through the
//! Postgres side channel and reports the results.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod datastore;
mod error;
mod journeys;
mod output;
mod runner;

pub use commands::{
    Cli, ColorArg, Commands, ConfigArgs, FormatArg, JourneyArg, LogFormatArg, PagesArgs, RunArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use datastore::{DeleteUserFixture, UserDirectory, UserRow, UserStore};
pub use error::{CliError, CliResult};
pub use journeys::{Journey, JourneyContext, SeedUserFixture};
pub use output::{render_config, render_pages, render_results, OutputFormat, ProgressReporter};
pub use runner::{JourneyResult, JourneyResults, JourneyRunner};
