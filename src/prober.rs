// prober.rs - Concurrent Archive Prober
// Purpose: Bounded worker pool that gate-checks each candidate URL, fetches a body
//          prefix only when the gate passes, verifies it and records findings once per host

use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

use crate::candidates::CandidateUrl;
use crate::fetcher::{Fetcher, ProbeMethod, ProbeResult};
use crate::host_tokens::host_key;
use crate::progress::ScanReporter;
use crate::registry::{FoundHostRegistry, ScanCounters};
use crate::verifier::{ArchiveVerifier, MAX_BODY_PREFIX};

/// Terminal state of one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    ParseError,
    SkippedHostFound,
    TransportError,
    /// Gate status or content-type ruled the candidate out before any body transfer
    Rejected,
    NotFound,
    Found,
    /// Verified, but another worker already reported this host
    FoundDuplicate,
}

/// Cheap pre-check: only 200/206 responses that look binary are worth a GET
pub fn gate_passes(gate: &ProbeResult) -> bool {
    let content_type = gate.content_type.to_lowercase();
    matches!(gate.status, 200 | 206)
        && (content_type.contains("application") || content_type.contains("octet"))
}

struct ProbeContext {
    fetcher: Arc<dyn Fetcher>,
    verifier: ArchiveVerifier,
    registry: Arc<FoundHostRegistry>,
    counters: Arc<ScanCounters>,
    reporter: Arc<dyn ScanReporter>,
    findings: Mutex<Vec<String>>,
}

impl ProbeContext {
    async fn probe(&self, candidate: &CandidateUrl) -> ProbeOutcome {
        let url = candidate.url.as_str();

        let Some(host) = Url::parse(url).ok().as_ref().and_then(host_key) else {
            return ProbeOutcome::ParseError;
        };

        if self.registry.is_found(&host) {
            return ProbeOutcome::SkippedHostFound;
        }

        let started = Instant::now();

        let gate = match self.fetcher.fetch(url, ProbeMethod::Head, 0).await {
            Ok(gate) => gate,
            Err(e) => {
                self.counters.record_error();
                self.reporter.request_failed(url, &e);
                return ProbeOutcome::TransportError;
            }
        };

        if !gate_passes(&gate) {
            self.reporter.probed(url, gate.status, started.elapsed());
            return ProbeOutcome::Rejected;
        }

        let response = match self.fetcher.fetch(url, ProbeMethod::Get, MAX_BODY_PREFIX).await {
            Ok(response) => response,
            Err(e) => {
                self.counters.record_error();
                self.reporter.request_failed(url, &e);
                return ProbeOutcome::TransportError;
            }
        };
        self.reporter.probed(url, response.status, started.elapsed());

        if response.status != 200
            || !self
                .verifier
                .verify(&response.body, url, &response.content_type)
        {
            return ProbeOutcome::NotFound;
        }

        if !self.registry.try_mark_found(&host) {
            return ProbeOutcome::FoundDuplicate;
        }

        self.counters.record_found();
        match self.findings.lock() {
            Ok(mut findings) => findings.push(url.to_string()),
            Err(poisoned) => poisoned.into_inner().push(url.to_string()),
        }
        self.reporter.found(url);
        ProbeOutcome::Found
    }

    async fn probe_and_count(&self, candidate: CandidateUrl) -> ProbeOutcome {
        let outcome = self.probe(&candidate).await;
        self.counters.record_completed();
        outcome
    }
}

/// Admission-gated pool shared across all chunks of a scan
pub struct ConcurrentProber {
    ctx: Arc<ProbeContext>,
    semaphore: Arc<Semaphore>,
}

impl ConcurrentProber {
    pub fn new(
        concurrency: usize,
        fetcher: Arc<dyn Fetcher>,
        verifier: ArchiveVerifier,
        registry: Arc<FoundHostRegistry>,
        counters: Arc<ScanCounters>,
        reporter: Arc<dyn ScanReporter>,
    ) -> Self {
        Self {
            ctx: Arc::new(ProbeContext {
                fetcher,
                verifier,
                registry,
                counters,
                reporter,
                findings: Mutex::new(Vec::new()),
            }),
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    /// Probes every candidate and returns once all of them have completed.
    /// The producer waits for a free slot before pulling the next candidate.
    pub async fn run_chunk<I>(&self, candidates: I)
    where
        I: IntoIterator<Item = CandidateUrl>,
    {
        let mut tasks = JoinSet::new();

        for candidate in candidates {
            let Ok(permit) = Arc::clone(&self.semaphore).acquire_owned().await else {
                break;
            };
            let ctx = Arc::clone(&self.ctx);

            tasks.spawn(async move {
                let _permit = permit;
                ctx.probe_and_count(candidate).await
            });

            while let Some(joined) = tasks.try_join_next() {
                self.report_join_error(joined);
            }
        }

        while let Some(joined) = tasks.join_next().await {
            self.report_join_error(joined);
        }
    }

    /// Single candidate, bypassing the pool
    pub async fn probe_one(&self, candidate: CandidateUrl) -> ProbeOutcome {
        self.ctx.probe_and_count(candidate).await
    }

    /// URLs reported as found so far, in report order
    pub fn findings(&self) -> Vec<String> {
        match self.ctx.findings.lock() {
            Ok(findings) => findings.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn report_join_error(&self, joined: Result<ProbeOutcome, tokio::task::JoinError>) {
        if let Err(e) = joined {
            // the task died before counting its candidate
            self.ctx.counters.record_completed();
            self.ctx
                .reporter
                .info(&format!("probe task aborted: {}", e));
        }
    }
}
