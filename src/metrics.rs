// metrics.rs - Scan Summary
// Purpose: Snapshot counters and findings at the end of a scan and render them
//          as colored text or JSON

use chrono::{DateTime, Utc};
use colored::*;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::registry::ScanCounters;

/// End-of-scan statistics, printed as text or JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    pub scan_id: String,
    pub hosts_file: String,
    pub intensity: String,
    pub concurrency: usize,
    pub chunk_size: usize,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: f64,

    pub hosts_processed: u64,
    pub requests_completed: u64,
    pub transport_errors: u64,
    pub archives_found: u64,
    pub found_urls: Vec<String>,
}

impl ScanSummary {
    pub fn start(config: &Config) -> Self {
        Self {
            scan_id: uuid::Uuid::new_v4().to_string(),
            hosts_file: config.hosts_file.display().to_string(),
            intensity: config.intensity.to_string(),
            concurrency: config.concurrency,
            chunk_size: config.chunk_size,
            start_time: Utc::now(),
            end_time: None,
            duration_seconds: 0.0,
            hosts_processed: 0,
            requests_completed: 0,
            transport_errors: 0,
            archives_found: 0,
            found_urls: Vec::new(),
        }
    }

    /// Snapshots the counters and computes the duration
    pub fn finalize(&mut self, counters: &ScanCounters, found_urls: Vec<String>) {
        let end = Utc::now();
        self.end_time = Some(end);
        self.duration_seconds = (end - self.start_time).num_milliseconds() as f64 / 1000.0;

        self.hosts_processed = counters.hosts();
        self.requests_completed = counters.completed();
        self.transport_errors = counters.errors();
        self.archives_found = counters.found();
        self.found_urls = found_urls;
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{}\n\
             - Scan ID: {}\n\
             - Hosts processed: {}\n\
             - Requests completed: {}\n\
             - Transport errors: {}\n\
             - Archives found: {}\n\
             - Duration: {:.2}s\n",
            "Scan summary".cyan().bold(),
            self.scan_id,
            self.hosts_processed,
            self.requests_completed,
            self.transport_errors,
            self.archives_found.to_string().green().bold(),
            self.duration_seconds
        );

        for url in &self.found_urls {
            summary.push_str(&format!("  {} {}\n", "└─".cyan(), url.green()));
        }

        summary
    }
}
