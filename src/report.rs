//! Report lines: `[<code>] <url>`, optionally colored, with `>` continuations

use crate::classify::{Classification, Verdict};
use clap::ValueEnum;
use std::io::{self, IsTerminal, Write};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Color when stdout is a terminal and NO_COLOR is unset
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Resolve against the actual stdout
    pub fn enabled(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal()
            }
        }
    }
}

pub struct Reporter<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write the line for one classified bookmark, if it warrants one
    pub fn verdict(&mut self, url: &str, c: &Classification, verbose: bool) -> io::Result<()> {
        if !c.should_report(verbose) {
            return Ok(());
        }
        let code = c.code.to_string();
        match self.color_for(c.verdict) {
            Some(color) => writeln!(self.out, "{}[{}]{} {}", color, code, RESET, url)?,
            None => writeln!(self.out, "[{}] {}", code, url)?,
        }
        if let Some(detail) = &c.detail {
            self.quote(detail)?;
        }
        Ok(())
    }

    pub fn deleting(&mut self, url: &str) -> io::Result<()> {
        writeln!(self.out, "  Deleting {}", url)
    }

    pub fn deletion_failed(&mut self, error: &str) -> io::Result<()> {
        self.quote(error)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn quote(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", quote_lines(text))
    }

    fn color_for(&self, verdict: Verdict) -> Option<&'static str> {
        if !self.color {
            return None;
        }
        Some(match verdict {
            Verdict::Fresh => GREEN,
            Verdict::Stale(_) => RED,
            Verdict::Skipped | Verdict::TransientError => YELLOW,
        })
    }
}

/// Prefix every line of `text` with `  > `
fn quote_lines(text: &str) -> String {
    text.lines()
        .map(|line| format!("  > {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}
