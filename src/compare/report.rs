//! Console rendering of comparison results.

use super::driver::{ComparisonResult, Summary};
use std::io::{self, Write};

/// Output rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// `"{left} differs from {right}. Difference: {diff}"` lines
    #[default]
    Text,
    /// One JSON object per differing pair (JSON Lines)
    Json,
}

/// Line confirming that no pair differed, printed in text mode.
pub const IDENTICAL_MESSAGE: &str = "Alignment files are identical";

/// Writes results to an output stream as they arrive.
pub struct Reporter<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    /// Write one differing pair.
    pub fn result(&mut self, result: &ComparisonResult) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.out, "{}", result),
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, result)?;
                writeln!(self.out)
            }
        }
    }

    /// Write the closing status and flush.
    pub fn finish(&mut self, summary: &Summary) -> io::Result<()> {
        if summary.is_identical() && self.format == OutputFormat::Text {
            writeln!(self.out, "{}", IDENTICAL_MESSAGE)?;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
