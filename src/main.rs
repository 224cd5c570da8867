//! stale CLI
//!
//! Checks every bookmark in a Pinboard account and reports the dead ones.
//! 403 responses are not treated as dead: the probe carries no credentials.

use anyhow::Result;
use clap::Parser;
use stale::{logging, run_audit, AuditArgs};

#[derive(Parser)]
#[command(name = "stale")]
#[command(author = "Jon Parise")]
#[command(version)]
#[command(about = "Identify (and optionally delete) stale Pinboard bookmarks")]
#[command(long_about = "Identify (and optionally delete) stale Pinboard bookmarks.\n\nEach bookmark gets one HEAD request. Client errors (4xx, except 403) mark a\nbookmark stale; timeouts never do.")]
struct Cli {
    #[command(flatten)]
    audit: AuditArgs,

    /// Log debug diagnostics to stderr
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.debug);
    run_audit(cli.audit).await
}
