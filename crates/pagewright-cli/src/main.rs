//! Pagewright CLI: browser journeys for the starter template
//!
//! ## Usage
//!
//! ```bash
//! pagewright run                          # Run every journey
//! pagewright run -J sign-up --headed      # One journey, visible browser
//! pagewright run --format json > out.json # Machine-readable results
//! pagewright pages                        # List pages and identity locators
//! pagewright config -c e2e.yaml           # Show the effective configuration
//! ```

use clap::Parser;
use pagewright::pages::starter_pages;
use pagewright::{ChromiumBrowser, DriverFactory, E2eConfig};
use pagewright_cli::{
    render_config, render_pages, render_results, Cli, CliConfig, CliResult, ColorChoice,
    Commands, ConfigArgs, Journey, JourneyContext, JourneyRunner, LogFormatArg, OutputFormat,
    PagesArgs, RunArgs, UserDirectory, UserStore, Verbosity,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(config.verbosity, cli.log_format);

    match run(config, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: CliConfig, command: Commands) -> CliResult<()> {
    match command {
        Commands::Run(args) => run_journeys(config, args).await,
        Commands::Pages(args) => run_pages(&args),
        Commands::Config(args) => run_config(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.clone().into();

    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

fn init_tracing(verbosity: Verbosity, format: LogFormatArg) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // A subscriber may already be installed when embedded; keep it.
    let _ = match format {
        LogFormatArg::Text => builder.try_init(),
        LogFormatArg::Json => builder.json().try_init(),
    };
}

/// File, then environment, then flags
fn load_e2e_config(args: &RunArgs) -> CliResult<E2eConfig> {
    let mut e2e = E2eConfig::load(args.config.as_deref())?;
    if let Some(ref url) = args.base_url {
        e2e = e2e.with_base_url(url.clone());
    }
    if let Some(ref url) = args.database_url {
        e2e = e2e.with_database_url(url.clone());
    }
    if args.headed {
        e2e = e2e.with_headless(false);
    }
    e2e.validate()?;
    Ok(e2e)
}

fn selected_journeys(args: &RunArgs) -> Vec<Journey> {
    if args.journeys.is_empty() {
        return Journey::all().to_vec();
    }
    let mut journeys: Vec<Journey> = Vec::with_capacity(args.journeys.len());
    for journey in args.journeys.iter().copied().map(Journey::from) {
        if !journeys.contains(&journey) {
            journeys.push(journey);
        }
    }
    journeys
}

async fn run_journeys(config: CliConfig, args: RunArgs) -> CliResult<()> {
    let e2e = load_e2e_config(&args)?;
    let journeys = selected_journeys(&args);
    let format = OutputFormat::from(args.format);
    let config = config
        .with_parallel_jobs(args.jobs)
        .with_fail_fast(args.fail_fast);

    info!(
        base_url = %e2e.base_url,
        journeys = journeys.len(),
        "starting journey run"
    );

    let users: Arc<dyn UserDirectory> = Arc::new(UserStore::connect(&e2e.database_url).await?);
    let browser = Arc::new(ChromiumBrowser::launch(e2e.driver_config()).await?);
    let factory: Arc<dyn DriverFactory> = browser.clone();
    let ctx = JourneyContext::new(
        factory,
        users,
        e2e.test_email.clone(),
        e2e.test_password.clone(),
    );

    let mut runner = JourneyRunner::new(config);
    let results = runner
        .run(&journeys, |journey| {
            let ctx = ctx.clone();
            async move { journey.run(&ctx).await }
        })
        .await;

    drop(ctx);
    match Arc::try_unwrap(browser) {
        Ok(browser) => {
            if let Err(e) = browser.close().await {
                warn!(error = %e, "browser did not shut down cleanly");
            }
        }
        Err(_) => warn!("browser still referenced after the run; leaving it to drop"),
    }

    println!("{}", render_results(&results, format)?);
    results.into_result().map(|_| ())
}

fn run_pages(args: &PagesArgs) -> CliResult<()> {
    let rendered = render_pages(&starter_pages(), args.format.into())?;
    print!("{rendered}");
    Ok(())
}

fn run_config(args: &ConfigArgs) -> CliResult<()> {
    let e2e = E2eConfig::load(args.config.as_deref())?;
    print!("{}", render_config(&e2e)?);
    Ok(())
}
