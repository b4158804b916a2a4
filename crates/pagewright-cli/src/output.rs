//! Output formatting and progress reporting
//!
//! Progress and pass/fail lines go to stderr; rendered results go to stdout
//! so `--format json` output can be piped.

use crate::error::CliResult;
use crate::runner::JourneyResults;
use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use pagewright::pages::PageSummary;
use pagewright::E2eConfig;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::time::Duration;

/// Output format for results and listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Progress reporter for journey execution
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet || !self.term.is_term() {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Increment progress
    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    /// Update progress message
    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    fn line(&self, line: &str) {
        match self.progress_bar {
            Some(ref pb) => pb.println(line),
            None => {
                let _ = self.term.write_line(line);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };

        self.line(&format!("{prefix} {message}"));
    }

    /// Print a failure message, even in quiet mode
    pub fn failure(&self, message: &str) {
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        self.line(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("⚠").yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };

        self.line(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&styled);
    }

    /// Print the run summary
    pub fn summary(&self, passed: usize, failed: usize, skipped: usize, duration: Duration) {
        if self.quiet && failed == 0 {
            return;
        }

        let _ = self.term.write_line("");

        let total = passed + failed + skipped;
        let duration_secs = duration.as_secs_f64();

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let skipped_style = Style::new().yellow();

            let status = if failed > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };

            let _ = self.term.write_line(&format!(
                "{} {} journeys in {:.2}s ({} passed, {} failed, {} skipped)",
                status,
                total,
                duration_secs,
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
                skipped_style.apply_to(skipped)
            ));
        } else {
            let status = if failed > 0 { "FAILED" } else { "PASSED" };
            let _ = self.term.write_line(&format!(
                "{status} {total} journeys in {duration_secs:.2}s ({passed} passed, {failed} failed, {skipped} skipped)"
            ));
        }
    }
}

/// Render the page listing
pub fn render_pages(pages: &[PageSummary], format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(pages)?),
        OutputFormat::Text => {
            let mut out = String::new();
            for page in pages {
                let _ = writeln!(out, "{} ({})", page.name, page.url);
                for locator in &page.identity {
                    let _ = writeln!(out, "  - {locator}");
                }
            }
            Ok(out)
        }
    }
}

/// Render journey results for stdout
pub fn render_results(results: &JourneyResults, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(results)?),
        OutputFormat::Text => {
            let mut out = String::new();
            for result in &results.results {
                let status = if result.passed { "ok" } else { "FAILED" };
                let _ = writeln!(
                    out,
                    "journey {} ... {status} ({}ms)",
                    result.name, result.duration_ms
                );
                if let Some(ref error) = result.error {
                    let _ = writeln!(out, "    {error}");
                }
            }
            let _ = writeln!(
                out,
                "\n{} passed; {} failed; {} skipped",
                results.passed(),
                results.failed(),
                results.skipped
            );
            Ok(out)
        }
    }
}

/// Render the effective configuration as YAML, with the password masked
pub fn render_config(config: &E2eConfig) -> CliResult<String> {
    let mut masked = config.clone();
    if !masked.test_password.is_empty() {
        masked.test_password = "********".to_string();
    }
    Ok(masked.to_yaml()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::JourneyResult;

    mod output_format_tests {
        use super::*;

        #[test]
        fn test_default_format() {
            assert_eq!(OutputFormat::default(), OutputFormat::Text);
        }
    }

    mod progress_reporter_tests {
        use super::*;

        #[test]
        fn test_new_reporter() {
            let reporter = ProgressReporter::new(true, false);
            assert!(reporter.use_color);
            assert!(!reporter.quiet);
        }

        #[test]
        fn test_progress_lifecycle() {
            let mut reporter = ProgressReporter::new(false, false);
            reporter.start_progress(3, "Running journeys");
            reporter.increment(1);
            reporter.set_message("sign-up");
            reporter.success("sign-up");
            reporter.failure("sign-in: boom");
            reporter.finish();
            reporter.summary(1, 1, 1, Duration::from_secs(2));
        }

        #[test]
        fn test_quiet_mode_skips_progress_bar() {
            let mut reporter = ProgressReporter::new(false, true);
            reporter.start_progress(10, "Running journeys");
            assert!(reporter.progress_bar.is_none());
            reporter.warning("hidden");
            reporter.failure("shown");
        }
    }

    mod render_tests {
        use super::*;

        #[test]
        fn test_pages_text_lists_identity_locators() {
            let out = render_pages(&pagewright::pages::starter_pages(), OutputFormat::Text).unwrap();
            assert!(out.contains("SignUpPage (/sign-up)"));
            assert!(out.contains("DashboardHomePage (/dashboard)"));
            assert!(out.lines().filter(|l| l.starts_with("  - ")).count() >= 8);
        }

        #[test]
        fn test_pages_json_is_an_array() {
            let out = render_pages(&pagewright::pages::starter_pages(), OutputFormat::Json).unwrap();
            let value: serde_json::Value = serde_json::from_str(&out).unwrap();
            assert_eq!(value.as_array().unwrap().len(), 3);
            assert_eq!(value[1]["url"], "/sign-in");
        }

        #[test]
        fn test_results_text() {
            let mut results = JourneyResults::new();
            results.add(JourneyResult::pass("sign-up", Duration::from_millis(12)));
            results.add(JourneyResult::fail(
                "sign-in",
                "Assertion failed: Expected DashboardHomePage to be the current page",
                Duration::from_millis(40),
            ));

            let out = render_results(&results, OutputFormat::Text).unwrap();

            assert!(out.contains("journey sign-up ... ok (12ms)"));
            assert!(out.contains("journey sign-in ... FAILED (40ms)"));
            assert!(out.contains("    Assertion failed"));
            assert!(out.contains("1 passed; 1 failed; 0 skipped"));
        }

        #[test]
        fn test_results_json() {
            let mut results = JourneyResults::new();
            results.add(JourneyResult::pass("sign-up", Duration::from_millis(12)));
            let out = render_results(&results, OutputFormat::Json).unwrap();
            let value: serde_json::Value = serde_json::from_str(&out).unwrap();
            assert_eq!(value["results"][0]["passed"], true);
        }

        #[test]
        fn test_config_masks_password() {
            let out = render_config(&E2eConfig::default()).unwrap();
            assert!(out.contains("base_url"));
            assert!(out.contains("********"));
            assert!(!out.contains(pagewright::DEFAULT_TEST_PASSWORD));
        }
    }
}
