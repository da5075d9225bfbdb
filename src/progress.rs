// progress.rs - Console Reporting and Progress
// Purpose: Turn scan events (found archives, failures, chunk boundaries) and the
//          completed-request counter into timestamped, colored console output

use chrono::{SecondsFormat, Utc};
use colored::*;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::registry::ScanCounters;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Sink for everything the scan wants a human to see
pub trait ScanReporter: Send + Sync {
    fn info(&self, message: &str);

    fn chunk_started(&self, index: usize, hosts: usize);

    /// Called once per host, by the worker that won the found transition
    fn found(&self, url: &str);

    /// Transport failure; only surfaced in verbose mode
    fn request_failed(&self, url: &str, error: &anyhow::Error);

    /// Per-candidate timing line; only surfaced in verbose mode
    fn probed(&self, url: &str, status: u16, elapsed: Duration);

    fn progress(&self, completed: u64);
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Colored terminal reporter with a spinner for the running request count
pub struct ConsoleReporter {
    verbose: bool,
    bar: ProgressBar,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message("Requests completed: 0");

        Self { verbose, bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ScanReporter for ConsoleReporter {
    fn info(&self, message: &str) {
        self.bar
            .suspend(|| eprintln!("[{}] {} {}", timestamp(), "[*]".cyan(), message));
    }

    fn chunk_started(&self, index: usize, hosts: usize) {
        self.info(&format!("Processing chunk {} ({} hosts)...", index + 1, hosts));
    }

    fn found(&self, url: &str) {
        self.bar.suspend(|| {
            println!(
                "[{}] {} {}",
                timestamp(),
                "[+]".green().bold(),
                format!("Found archive: {}", url).green()
            )
        });
    }

    fn request_failed(&self, url: &str, error: &anyhow::Error) {
        if !self.verbose {
            return;
        }
        self.bar.suspend(|| {
            eprintln!(
                "[{}] {} Request failed for {}: {:#}",
                timestamp(),
                "[!]".red(),
                url,
                error
            )
        });
    }

    fn probed(&self, url: &str, status: u16, elapsed: Duration) {
        if !self.verbose {
            return;
        }
        self.bar.suspend(|| {
            eprintln!(
                "[{}] url={} took={:?} status={}",
                timestamp(),
                url,
                elapsed,
                status
            )
        });
    }

    fn progress(&self, completed: u64) {
        self.bar.set_message(format!("Requests completed: {}", completed));
        self.bar.tick();
    }
}

/// Background task pushing the completed counter to the reporter once a second
pub struct ProgressTicker {
    handle: JoinHandle<()>,
    counters: Arc<ScanCounters>,
    reporter: Arc<dyn ScanReporter>,
}

impl ProgressTicker {
    pub fn spawn(counters: Arc<ScanCounters>, reporter: Arc<dyn ScanReporter>) -> Self {
        let handle = {
            let counters = Arc::clone(&counters);
            let reporter = Arc::clone(&reporter);
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(TICK_INTERVAL);
                loop {
                    interval.tick().await;
                    reporter.progress(counters.completed());
                }
            })
        };

        Self {
            handle,
            counters,
            reporter,
        }
    }

    /// Stops ticking and reports the final count
    pub fn stop(self) {
        self.handle.abort();
        self.reporter.progress(self.counters.completed());
    }
}
