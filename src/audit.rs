//! The audit run: fetch every bookmark, classify it, report it, and
//! optionally delete the stale ones.

use crate::classify::{classify, Verdict};
use crate::pinboard::{
    Bookmark, BookmarkSink, BookmarkSource, Credentials, PinboardClient, DEFAULT_API_URL,
};
use crate::policy::{parse_timeout, HostFilter, Policy};
use crate::probe::{HttpProber, Prober};
use crate::report::{ColorChoice, Reporter};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Args)]
pub struct AuditArgs {
    /// Pinboard API token (user:TOKEN)
    #[arg(short, long, env = "STALE_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Account username (HTTP basic auth; takes precedence over a token)
    #[arg(short, long)]
    pub username: Option<String>,

    /// Account password (prompted for if omitted)
    #[arg(short, long, env = "STALE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Skip bookmarks whose hostname matches any of these regexes
    /// (tried against both the Unicode and the punycode form)
    #[arg(long, value_name = "PATTERN", num_args = 1..)]
    pub ignore: Vec<String>,

    /// Delete stale bookmarks
    #[arg(short, long)]
    pub delete: bool,

    /// Equate errors with staleness
    #[arg(short, long)]
    pub errors: bool,

    /// Probe timeout in seconds
    #[arg(long, value_name = "SECONDS", default_value = "5", value_parser = parse_timeout)]
    pub timeout: Duration,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// When to color report lines
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Print a JSON summary when done
    #[arg(long)]
    pub json: bool,

    /// Bookmarks API base URL
    #[arg(long, env = "STALE_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
}

impl AuditArgs {
    pub fn policy(&self) -> Result<Policy, regex::Error> {
        Ok(Policy {
            treat_errors_as_stale: self.errors,
            verbose: self.verbose,
            timeout: self.timeout,
            ignore: HostFilter::new(&self.ignore)?,
        })
    }
}

/// Tally of one run
#[derive(Debug, Default, Serialize)]
pub struct Summary {
    pub total: usize,
    pub checked: usize,
    pub fresh: usize,
    pub stale: usize,
    pub skipped: usize,
    pub errors: usize,
    pub deleted: usize,
    pub delete_failures: usize,
    pub interrupted: bool,
}

#[derive(Debug, Serialize)]
struct SummaryOutput<'a> {
    summary: &'a Summary,
    timestamp: String,
}

/// Run the audit command
pub async fn run_audit(args: AuditArgs) -> Result<()> {
    let policy = match args.policy() {
        Ok(policy) => policy,
        Err(e) => {
            eprintln!("Invalid --ignore pattern: {}", e);
            std::process::exit(2);
        }
    };

    let credentials = match resolve_credentials(&args) {
        Ok(credentials) => credentials,
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(2);
        }
    };

    let client = PinboardClient::new(&args.api_url, credentials)?;

    if args.verbose {
        eprintln!("Retrieving all posts for {}", client.credentials().user());
    }

    let bookmarks = match client.list_all().await {
        Ok(bookmarks) => bookmarks,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if args.verbose {
        eprintln!("Checking {} posts ...", bookmarks.len());
    }

    let prober = HttpProber::new(policy.timeout)?;
    let sink: Option<&dyn BookmarkSink> = if args.delete { Some(&client) } else { None };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let mut reporter = Reporter::new(io::stdout(), args.color.enabled());
    let summary = audit(&bookmarks, &prober, sink, &policy, &mut reporter, &cancel).await?;

    if summary.interrupted {
        eprintln!("Interrupted; {} of {} posts checked", summary.checked, summary.total);
    }

    if args.verbose {
        eprintln!(
            "Done: {} stale, {} skipped, {} errors, {} deleted",
            summary.stale, summary.skipped, summary.errors, summary.deleted
        );
    }

    if args.json {
        let output = SummaryOutput {
            summary: &summary,
            timestamp: Utc::now().to_rfc3339(),
        };
        println!("{}", serde_json::to_string(&output)?);
    }

    Ok(())
}

/// An explicit username wins over a token, which may come from the
/// environment; whatever is missing is prompted for
fn resolve_credentials(args: &AuditArgs) -> Result<Credentials> {
    if let Some(username) = &args.username {
        let password = match &args.password {
            Some(password) => password.clone(),
            None => rpassword::prompt_password("Password: ").context("Failed to read password")?,
        };
        if username.is_empty() || password.is_empty() {
            bail!("a username and password must be provided");
        }
        return Ok(Credentials::Basic {
            username: username.clone(),
            password,
        });
    }

    let token = match &args.token {
        Some(token) => token.clone(),
        None => rpassword::prompt_password("API token (user:TOKEN): ")
            .context("Failed to read API token")?,
    };
    let token = token.trim();
    if token.is_empty() {
        bail!("an API token or a username and password must be provided");
    }
    Ok(Credentials::Token(token.to_string()))
}

/// Classify every bookmark in order, reporting as we go.
///
/// Stops early, without error, once `cancel` fires; an in-flight probe is
/// abandoned.
pub async fn audit<W: Write>(
    bookmarks: &[Bookmark],
    prober: &dyn Prober,
    sink: Option<&dyn BookmarkSink>,
    policy: &Policy,
    reporter: &mut Reporter<W>,
    cancel: &CancellationToken,
) -> Result<Summary> {
    let mut summary = Summary {
        total: bookmarks.len(),
        ..Summary::default()
    };

    for bookmark in bookmarks {
        if cancel.is_cancelled() {
            summary.interrupted = true;
            break;
        }

        let url = bookmark.url.as_str();
        let classification = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                summary.interrupted = true;
                break;
            }
            c = classify(url, policy, prober) => c,
        };

        summary.checked += 1;
        match classification.verdict {
            Verdict::Fresh => summary.fresh += 1,
            Verdict::Stale(_) => summary.stale += 1,
            Verdict::Skipped => summary.skipped += 1,
            Verdict::TransientError => summary.errors += 1,
        }

        reporter
            .verdict(url, &classification, policy.verbose)
            .context("Failed to write report")?;

        if let Some(sink) = sink.filter(|_| classification.verdict.is_stale()) {
            reporter.deleting(url).context("Failed to write report")?;
            match sink.delete(url).await {
                Ok(()) => summary.deleted += 1,
                Err(e) => {
                    log::warn!("could not delete {}: {}", url, e);
                    summary.delete_failures += 1;
                    reporter
                        .deletion_failed(&e.to_string())
                        .context("Failed to write report")?;
                }
            }
        }
    }

    reporter.flush().context("Failed to write report")?;
    Ok(summary)
}
