// test_support.rs - In-memory fetcher and recording reporter for unit tests

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::fetcher::{Fetcher, ProbeMethod, ProbeResult};
use crate::progress::ScanReporter;

#[derive(Debug, Clone)]
pub enum Route {
    Respond { gate: ProbeResult, body: ProbeResult },
    Fail,
    /// Panics inside the fetch, killing the probe task
    Panic,
}

impl Route {
    pub fn new(status: u16, content_type: &str, body: Vec<u8>) -> Self {
        let gate = ProbeResult {
            status,
            content_type: content_type.to_string(),
            body: Vec::new(),
        };
        let body = ProbeResult {
            body,
            ..gate.clone()
        };
        Route::Respond { gate, body }
    }

    pub fn zip() -> Self {
        let mut body = vec![0x50, 0x4B, 0x03, 0x04];
        body.resize(256, 0);
        Self::new(200, "application/zip", body)
    }

    pub fn gate_only(status: u16, content_type: &str) -> Self {
        Self::new(status, content_type, Vec::new())
    }

    fn not_found() -> Self {
        Self::new(404, "text/html", b"<html>404</html>".to_vec())
    }
}

#[derive(Default)]
pub struct FakeFetcher {
    routes: HashMap<String, Route>,
    delay: Option<Duration>,
    route_delays: HashMap<String, Duration>,
    events: Mutex<Vec<String>>,
    head_calls: AtomicUsize,
    get_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Delay for one URL only, overriding `with_delay`
    pub fn with_route_delay(mut self, url: &str, delay: Duration) -> Self {
        self.route_delays.insert(url.to_string(), delay);
        self
    }

    pub fn route(mut self, url: &str, route: Route) -> Self {
        self.routes.insert(url.to_string(), route);
        self
    }

    pub fn head_calls(&self) -> usize {
        self.head_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.head_calls() + self.get_calls()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// `start <url>` / `end <url>` entries in the order fetches began and returned
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn log(&self, event: &str, url: &str) {
        self.events.lock().unwrap().push(format!("{} {}", event, url));
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn fetch(&self, url: &str, method: ProbeMethod, max_body: usize) -> Result<ProbeResult> {
        match method {
            ProbeMethod::Head => self.head_calls.fetch_add(1, Ordering::SeqCst),
            ProbeMethod::Get => self.get_calls.fetch_add(1, Ordering::SeqCst),
        };

        self.log("start", url);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.route_delays.get(url).copied().or(self.delay) {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.log("end", url);

        match self.routes.get(url).cloned().unwrap_or_else(Route::not_found) {
            Route::Fail => Err(anyhow!("connection refused: {}", url)),
            Route::Panic => panic!("fetcher blew up on {}", url),
            Route::Respond { gate, mut body } => match method {
                ProbeMethod::Head => Ok(gate),
                ProbeMethod::Get => {
                    body.body.truncate(max_body);
                    Ok(body)
                }
            },
        }
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    found: Mutex<Vec<String>>,
    infos: Mutex<Vec<String>>,
    failures: AtomicUsize,
    last_progress: Mutex<Option<u64>>,
}

impl RecordingReporter {
    pub fn found_urls(&self) -> Vec<String> {
        self.found.lock().unwrap().clone()
    }

    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }

    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }

    pub fn last_progress(&self) -> Option<u64> {
        *self.last_progress.lock().unwrap()
    }
}

impl ScanReporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn chunk_started(&self, index: usize, hosts: usize) {
        self.info(&format!("chunk {} ({} hosts)", index, hosts));
    }

    fn found(&self, url: &str) {
        self.found.lock().unwrap().push(url.to_string());
    }

    fn request_failed(&self, _url: &str, _error: &anyhow::Error) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }

    fn probed(&self, _url: &str, _status: u16, _elapsed: Duration) {}

    fn progress(&self, completed: u64) {
        *self.last_progress.lock().unwrap() = Some(completed);
    }
}
