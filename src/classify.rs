//! Staleness classification
//!
//! `classify_outcome` is a pure function of (probe outcome, policy).
//! `classify` adds the ignore-pattern check and the probe itself.

use crate::policy::Policy;
use crate::probe::{strip_fragment, ProbeOutcome, Prober};
use std::fmt;

/// Why a bookmark was judged stale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    Status(u16),
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Fresh,
    Stale(StaleReason),
    Skipped,
    TransientError,
}

impl Verdict {
    pub fn is_stale(&self) -> bool {
        matches!(self, Verdict::Stale(_))
    }
}

/// Short code shown in brackets on a report line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayCode {
    Skip,
    Timeout,
    Status(u16),
    Error,
    Ok,
}

impl fmt::Display for DisplayCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayCode::Skip => f.write_str("Skip"),
            DisplayCode::Timeout => f.write_str("Timeout"),
            DisplayCode::Status(code) => write!(f, "{}", code),
            DisplayCode::Error => f.write_str("!!"),
            DisplayCode::Ok => f.write_str("OK"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub verdict: Verdict,
    pub code: DisplayCode,
    /// Transport error text, if any
    pub detail: Option<String>,
}

impl Classification {
    fn new(verdict: Verdict, code: DisplayCode) -> Self {
        Self {
            verdict,
            code,
            detail: None,
        }
    }

    pub fn skipped() -> Self {
        Self::new(Verdict::Skipped, DisplayCode::Skip)
    }

    /// Fresh links are only worth a line in verbose mode
    pub fn should_report(&self, verbose: bool) -> bool {
        verbose || self.verdict != Verdict::Fresh
    }
}

/// 4xx means the resource is gone, except 403: the probe carries no
/// credentials, so a refusal says nothing about the link itself.
fn is_stale_status(status: u16) -> bool {
    (400..500).contains(&status) && status != 403
}

/// Map a probe outcome to a verdict under the given policy
pub fn classify_outcome(outcome: &ProbeOutcome, policy: &Policy) -> Classification {
    match outcome {
        ProbeOutcome::Timeout => Classification::new(Verdict::TransientError, DisplayCode::Timeout),
        ProbeOutcome::Status(status) if is_stale_status(*status) => Classification::new(
            Verdict::Stale(StaleReason::Status(*status)),
            DisplayCode::Status(*status),
        ),
        ProbeOutcome::Status(_) => Classification::new(Verdict::Fresh, DisplayCode::Ok),
        ProbeOutcome::Transport(detail) => {
            let verdict = if policy.treat_errors_as_stale {
                Verdict::Stale(StaleReason::Error)
            } else {
                Verdict::TransientError
            };
            Classification {
                verdict,
                code: DisplayCode::Error,
                detail: Some(detail.clone()),
            }
        }
    }
}

/// Classify one bookmarked URL, probing it unless its host is ignored
pub async fn classify(url: &str, policy: &Policy, prober: &dyn Prober) -> Classification {
    if policy.ignore.matches_url(url) {
        log::debug!("skipping ignored host: {}", url);
        return Classification::skipped();
    }
    let outcome = prober.probe(strip_fragment(url)).await;
    classify_outcome(&outcome, policy)
}
