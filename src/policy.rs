//! Run policy: the read-only configuration that drives classification

use regex::Regex;
use std::time::Duration;
use url::Url;

/// Default probe timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: f64 = 5.0;

/// Hostname patterns that exempt a bookmark from probing.
///
/// Patterns are independent: a host is ignored when any of them matches,
/// so their order never changes the outcome.
#[derive(Debug, Clone, Default)]
pub struct HostFilter {
    patterns: Vec<Regex>,
}

impl HostFilter {
    /// Compile a filter from raw regular expressions
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True if any pattern matches the hostname
    pub fn matches_host(&self, host: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(host))
    }

    /// True if the URL has a host and any pattern matches it, in either
    /// its punycode or its Unicode spelling
    pub fn matches_url(&self, url: &str) -> bool {
        if self.is_empty() {
            return false;
        }
        let Some(host) = host_of(url) else {
            return false;
        };
        if self.matches_host(&host) {
            return true;
        }
        let (unicode, _) = idna::domain_to_unicode(&host);
        unicode != host && self.matches_host(&unicode)
    }
}

/// Extract the hostname of a URL, if it has one
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(String::from))
}

/// Classification policy, built once per run
#[derive(Debug, Clone)]
pub struct Policy {
    pub treat_errors_as_stale: bool,
    pub verbose: bool,
    pub timeout: Duration,
    pub ignore: HostFilter,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            treat_errors_as_stale: false,
            verbose: false,
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
            ignore: HostFilter::default(),
        }
    }
}

/// Parse a positive, finite timeout given in (fractional) seconds
pub fn parse_timeout(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid number of seconds: {}", s))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("timeout must be greater than zero: {}", s));
    }
    Ok(Duration::from_secs_f64(secs))
}
