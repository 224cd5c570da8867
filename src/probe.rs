//! Lightweight existence probe against a bookmarked URL
//!
//! One HEAD request per URL, no retries. Failures are values, not errors.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::redirect::Policy as RedirectPolicy;
use reqwest::Client;
use std::error::Error as StdError;
use std::time::Duration;

const USER_AGENT: &str = concat!("stale/", env!("CARGO_PKG_VERSION"));
const MAX_REDIRECTS: usize = 10;

/// Outcome of one probe attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The server answered with this HTTP status
    Status(u16),
    /// The request did not complete within the timeout
    Timeout,
    /// Any other transport failure (DNS, refused connection, TLS, ...)
    Transport(String),
}

#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe a URL; the URL is sent as given
    async fn probe(&self, url: &str) -> ProbeOutcome;
}

/// reqwest-backed prober sharing one client for the whole run
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .redirect(RedirectPolicy::limited(MAX_REDIRECTS))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        log::debug!("HEAD {}", url);
        match self.client.head(url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                log::debug!("{} -> {}", url, status);
                ProbeOutcome::Status(status)
            }
            Err(e) if e.is_timeout() => {
                log::debug!("{} -> timeout", url);
                ProbeOutcome::Timeout
            }
            Err(e) => {
                let detail = error_detail(&e);
                log::debug!("{} -> {}", url, detail.replace('\n', ": "));
                ProbeOutcome::Transport(detail)
            }
        }
    }
}

/// Remove the fragment; it is client-side only and never sent to the server
pub fn strip_fragment(url: &str) -> &str {
    match url.find('#') {
        Some(pos) => &url[..pos],
        None => url,
    }
}

/// Render an error and its source chain, one cause per line
pub fn error_detail(err: &(dyn StdError + 'static)) -> String {
    let mut lines = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if lines.last() != Some(&text) {
            lines.push(text);
        }
        source = cause.source();
    }
    lines.join("\n")
}
