// fetcher.rs - HTTP Fetcher Capability
// Purpose: Uniform fetch contract for the prober with two reqwest-backed transports
//          chosen once at startup (standard HEAD gate, lean ranged-GET gate)

use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue, CONNECTION, CONTENT_TYPE, RANGE, USER_AGENT};
use reqwest::{Client, Response};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, FetcherKind};

/// Realistic browser strings rotated per request
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_12_6) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/61.0.3163.100 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/57.0.2987.98 Safari/537.36",
    "Mozilla/5.0 (Windows NT 6.1; Win64; x64; rv:53.0) Gecko/20100101 Firefox/53.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_2) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Request kind asked of a fetcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMethod {
    /// Cheap gate: status and content-type only
    Head,
    /// Real fetch of a bounded body prefix
    Get,
}

/// Status, content-type and at most `max_body` bytes of one response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeResult {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    fn name(&self) -> &'static str;

    /// Transport failures come back as `Err`; any HTTP status is `Ok`.
    async fn fetch(&self, url: &str, method: ProbeMethod, max_body: usize) -> Result<ProbeResult>;
}

/// Builds the transport selected in the configuration
pub fn build_fetcher(config: &Config) -> Result<Arc<dyn Fetcher>> {
    Ok(match config.fetcher {
        FetcherKind::Standard => Arc::new(StandardFetcher::new(config)?),
        FetcherKind::Lean => Arc::new(LeanFetcher::new(config)?),
    })
}

fn content_type_of(response: &Response) -> String {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

/// Reads at most `max` bytes, then drops the rest of the stream
async fn read_prefix(mut response: Response, max: usize) -> Result<Vec<u8>> {
    let mut body = Vec::with_capacity(max);
    while body.len() < max {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                let take = (max - body.len()).min(chunk.len());
                body.extend_from_slice(&chunk[..take]);
            }
            Ok(None) => break,
            // a truncated prefix is still worth verifying
            Err(_) if !body.is_empty() => break,
            Err(e) => return Err(e).context("failed to read response body"),
        }
    }
    Ok(body)
}

async fn into_probe_result(response: Response, max_body: usize) -> Result<ProbeResult> {
    let status = response.status().as_u16();
    let content_type = content_type_of(&response);
    let body = if max_body > 0 {
        read_prefix(response, max_body).await?
    } else {
        Vec::new()
    };

    Ok(ProbeResult {
        status,
        content_type,
        body,
    })
}

// ═══════════════════════════════════════════════════════════════════
// STANDARD TRANSPORT
// ═══════════════════════════════════════════════════════════════════

/// HEAD gate, then a streamed GET
pub struct StandardFetcher {
    client: Client,
}

impl StandardFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(true)
            .redirect(reqwest::redirect::Policy::none())
            .pool_max_idle_per_host(config.concurrency)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .http1_only()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for StandardFetcher {
    fn name(&self) -> &'static str {
        "standard"
    }

    async fn fetch(&self, url: &str, method: ProbeMethod, max_body: usize) -> Result<ProbeResult> {
        let request = match method {
            ProbeMethod::Head => self.client.head(url),
            ProbeMethod::Get => self.client.get(url),
        };

        let response = request
            .header(USER_AGENT, random_user_agent())
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;

        let max_body = if method == ProbeMethod::Head { 0 } else { max_body };
        into_probe_result(response, max_body).await
    }
}

// ═══════════════════════════════════════════════════════════════════
// LEAN TRANSPORT
// ═══════════════════════════════════════════════════════════════════

/// Keep-alive HTTP/1.1 client whose gate is a one-byte ranged GET,
/// for servers that mishandle HEAD
pub struct LeanFetcher {
    client: Client,
}

impl LeanFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(true)
            .redirect(reqwest::redirect::Policy::none())
            .default_headers(headers)
            .pool_max_idle_per_host(config.concurrency)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .tcp_nodelay(true)
            .http1_only()
            .build()
            .context("Failed to create lean HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for LeanFetcher {
    fn name(&self) -> &'static str {
        "lean"
    }

    async fn fetch(&self, url: &str, method: ProbeMethod, max_body: usize) -> Result<ProbeResult> {
        let mut request = self
            .client
            .get(url)
            .header(USER_AGENT, random_user_agent());

        if method == ProbeMethod::Head {
            request = request.header(RANGE, "bytes=0-0");
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;

        let max_body = if method == ProbeMethod::Head { 0 } else { max_body };
        into_probe_result(response, max_body).await
    }
}
