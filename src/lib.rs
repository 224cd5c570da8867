//! stale: Identify (and optionally delete) stale Pinboard bookmarks
//!
//! Each bookmark gets one HEAD probe; the outcome is classified as fresh,
//! stale, skipped or a transient error under the run's policy.

pub mod audit;
pub mod classify;
pub mod logging;
pub mod pinboard;
pub mod policy;
pub mod probe;
pub mod report;

pub use audit::{audit, run_audit, AuditArgs, Summary};
pub use classify::{classify, classify_outcome, Classification, DisplayCode, StaleReason, Verdict};
pub use pinboard::{ApiError, Bookmark, BookmarkSink, BookmarkSource, Credentials, PinboardClient};
pub use policy::{HostFilter, Policy};
pub use probe::{HttpProber, ProbeOutcome, Prober};
pub use report::{ColorChoice, Reporter};
