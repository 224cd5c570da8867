//! Diagnostic logging on stderr
//!
//! Report lines go to stdout; everything logged here goes to stderr so the
//! report stays clean when piped.

use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Install the global logger. Warnings only, unless `debug` is set.
///
/// Safe to call more than once; later calls are no-ops.
pub fn initialize(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    // HTTP stack internals are noise at debug level.
    let config = ConfigBuilder::new()
        .add_filter_allow_str("stale")
        .set_time_level(LevelFilter::Off)
        .build();

    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}
