//! Journey runner implementation

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::journeys::Journey;
use crate::output::ProgressReporter;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::warn;

/// Outcome of one journey
#[derive(Debug, Clone, Serialize)]
pub struct JourneyResult {
    /// Journey name
    pub name: String,
    /// Whether the journey passed
    pub passed: bool,
    /// Error message if failed
    pub error: Option<String>,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

impl JourneyResult {
    /// Create a passing result
    #[must_use]
    pub fn pass(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            passed: true,
            error: None,
            duration_ms: duration.as_millis() as u64,
        }
    }

    /// Create a failing result
    #[must_use]
    pub fn fail(name: impl Into<String>, error: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            passed: false,
            error: Some(error.into()),
            duration_ms: duration.as_millis() as u64,
        }
    }

    fn from_outcome(journey: Journey, outcome: CliResult<()>, duration: Duration) -> Self {
        match outcome {
            Ok(()) => Self::pass(journey.name(), duration),
            Err(e) => Self::fail(journey.name(), e.to_string(), duration),
        }
    }
}

/// Aggregated journey results
#[derive(Debug, Clone, Default, Serialize)]
pub struct JourneyResults {
    /// Results in journey order
    pub results: Vec<JourneyResult>,
    /// Journeys never started because of `--fail-fast`
    pub skipped: usize,
    /// Total wall time in milliseconds
    pub duration_ms: u64,
}

impl JourneyResults {
    /// Create new empty results
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a result
    pub fn add(&mut self, result: JourneyResult) {
        self.results.push(result);
    }

    /// Number of passed journeys
    #[must_use]
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Number of failed journeys
    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }

    /// Journeys that ran
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Whether every journey that ran passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Failed results
    #[must_use]
    pub fn failures(&self) -> Vec<&JourneyResult> {
        self.results.iter().filter(|r| !r.passed).collect()
    }

    /// `Ok` when every journey passed, otherwise [`CliError::JourneyFailed`]
    pub fn into_result(self) -> CliResult<Self> {
        if self.all_passed() {
            Ok(self)
        } else {
            Err(CliError::JourneyFailed {
                failed: self.failed(),
                total: self.total() + self.skipped,
            })
        }
    }
}

/// Runs journeys with bounded concurrency and reports progress on stderr
#[derive(Debug)]
pub struct JourneyRunner {
    config: CliConfig,
    reporter: ProgressReporter,
}

impl JourneyRunner {
    /// Create a new runner
    #[must_use]
    pub fn new(config: CliConfig) -> Self {
        let reporter =
            ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
        Self { config, reporter }
    }

    /// Run `journeys` through `run_one`.
    ///
    /// At most `effective_jobs` journeys are in flight. Results come back in
    /// the order given. With fail-fast, journeys not yet started when one
    /// fails are skipped; those in flight still finish so their fixtures
    /// tear down.
    pub async fn run<F, Fut>(&mut self, journeys: &[Journey], run_one: F) -> JourneyResults
    where
        F: Fn(Journey) -> Fut,
        Fut: Future<Output = CliResult<()>>,
    {
        let start = Instant::now();
        let mut results = JourneyResults::new();

        if journeys.is_empty() {
            self.reporter.warning("No journeys selected");
            return results;
        }

        self.reporter.header("Running Journeys");
        self.reporter
            .start_progress(journeys.len() as u64, "Starting...");

        let jobs = self.config.effective_jobs(journeys.len());
        let fail_fast = self.config.fail_fast;
        let stop = AtomicBool::new(false);
        let (stop, run_one) = (&stop, &run_one);

        let mut outcomes = stream::iter(journeys.iter().copied())
            .map(move |journey| async move {
                if stop.load(Ordering::SeqCst) {
                    return (journey, None);
                }
                let started = Instant::now();
                let outcome = run_one(journey).await;
                if outcome.is_err() && fail_fast {
                    stop.store(true, Ordering::SeqCst);
                }
                let result = JourneyResult::from_outcome(journey, outcome, started.elapsed());
                (journey, Some(result))
            })
            .buffered(jobs);

        while let Some((journey, result)) = outcomes.next().await {
            self.reporter.set_message(journey.name());
            match result {
                Some(result) => {
                    if result.passed {
                        self.reporter.success(&result.name);
                    } else {
                        let error = result.error.as_deref().unwrap_or("unknown error");
                        warn!(journey = %journey, %error, "journey failed");
                        self.reporter
                            .failure(&format!("{}: {error}", result.name));
                    }
                    results.add(result);
                }
                None => {
                    results.skipped += 1;
                    self.reporter.warning(&format!("{journey}: skipped"));
                }
            }
            self.reporter.increment(1);
        }

        self.reporter.finish();
        results.duration_ms = start.elapsed().as_millis() as u64;
        self.reporter.summary(
            results.passed(),
            results.failed(),
            results.skipped,
            start.elapsed(),
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColorChoice, Verbosity};
    use std::sync::atomic::AtomicUsize;

    fn quiet_config() -> CliConfig {
        CliConfig::new()
            .with_verbosity(Verbosity::Quiet)
            .with_color(ColorChoice::Never)
    }

    mod journey_result_tests {
        use super::*;

        #[test]
        fn test_pass_result() {
            let result = JourneyResult::pass("sign-up", Duration::from_millis(100));
            assert!(result.passed);
            assert!(result.error.is_none());
            assert_eq!(result.duration_ms, 100);
        }

        #[test]
        fn test_fail_result() {
            let result =
                JourneyResult::fail("sign-in", "assertion failed", Duration::from_millis(50));
            assert!(!result.passed);
            assert_eq!(result.error.as_deref(), Some("assertion failed"));
        }

        #[test]
        fn test_serialize() {
            let result = JourneyResult::pass("sign-up", Duration::from_millis(10));
            let json = serde_json::to_value(&result).unwrap();
            assert_eq!(json["name"], "sign-up");
            assert_eq!(json["duration_ms"], 10);
        }
    }

    mod journey_results_tests {
        use super::*;

        #[test]
        fn test_counts() {
            let mut results = JourneyResults::new();
            results.add(JourneyResult::pass("a", Duration::ZERO));
            results.add(JourneyResult::fail("b", "error", Duration::ZERO));
            results.add(JourneyResult::pass("c", Duration::ZERO));

            assert_eq!(results.total(), 3);
            assert_eq!(results.passed(), 2);
            assert_eq!(results.failed(), 1);
            assert!(!results.all_passed());
            assert_eq!(results.failures()[0].name, "b");
        }

        #[test]
        fn test_into_result_counts_skipped() {
            let mut results = JourneyResults::new();
            results.add(JourneyResult::fail("a", "error", Duration::ZERO));
            results.skipped = 2;

            let err = results.into_result().unwrap_err();
            assert_eq!(err.to_string(), "1 of 3 journey(s) failed");
        }

        #[test]
        fn test_into_result_ok_when_all_pass() {
            let mut results = JourneyResults::new();
            results.add(JourneyResult::pass("a", Duration::ZERO));
            assert!(results.into_result().is_ok());
        }
    }

    mod runner_tests {
        use super::*;

        #[tokio::test]
        async fn test_no_journeys() {
            let mut runner = JourneyRunner::new(quiet_config());
            let results = runner.run(&[], |_| async { Ok(()) }).await;
            assert_eq!(results.total(), 0);
        }

        #[tokio::test]
        async fn test_results_keep_journey_order() {
            let mut runner = JourneyRunner::new(quiet_config());
            let results = runner
                .run(&Journey::all(), |journey| async move {
                    if journey == Journey::SignUp {
                        tokio::time::sleep(Duration::from_millis(20)).await;
                    }
                    Ok(())
                })
                .await;

            let names: Vec<_> = results.results.iter().map(|r| r.name.as_str()).collect();
            assert_eq!(names, vec!["sign-up", "duplicate-sign-up", "sign-in"]);
            assert!(results.all_passed());
        }

        #[tokio::test]
        async fn test_failures_are_recorded_without_stopping() {
            let mut runner = JourneyRunner::new(quiet_config());
            let results = runner
                .run(&Journey::all(), |journey| async move {
                    if journey == Journey::DuplicateSignUp {
                        Err(CliError::journey_assertion("row count 2"))
                    } else {
                        Ok(())
                    }
                })
                .await;

            assert_eq!(results.passed(), 2);
            assert_eq!(results.failed(), 1);
            assert!(results.failures()[0]
                .error
                .as_deref()
                .unwrap()
                .contains("row count 2"));
        }

        #[tokio::test]
        async fn test_fail_fast_skips_unstarted_journeys() {
            let started = AtomicUsize::new(0);
            let mut runner = JourneyRunner::new(
                quiet_config().with_parallel_jobs(1).with_fail_fast(true),
            );

            let results = runner
                .run(&Journey::all(), |_| {
                    let _ = started.fetch_add(1, Ordering::SeqCst);
                    async { Err(CliError::journey_assertion("boom")) }
                })
                .await;

            assert_eq!(started.load(Ordering::SeqCst), 1);
            assert_eq!(results.failed(), 1);
            assert_eq!(results.skipped, 2);
        }

        #[tokio::test]
        async fn test_jobs_bound_concurrency() {
            let in_flight = AtomicUsize::new(0);
            let peak = AtomicUsize::new(0);
            let (in_flight_ref, peak_ref) = (&in_flight, &peak);
            let mut runner = JourneyRunner::new(quiet_config().with_parallel_jobs(2));

            let _ = runner
                .run(&Journey::all(), move |_| async move {
                    let (in_flight, peak) = (in_flight_ref, peak_ref);
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    let _ = peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    let _ = in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                })
                .await;

            assert_eq!(peak.load(Ordering::SeqCst), 2);
        }
    }
}
