//! Output layer shared by the CLI commands: human-readable text or stable
//! JSON, selected by the global `--json` flag.

use std::io::{self, Write};

use serde::Serialize;

/// The two output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text.
    Human,
    /// Machine-readable JSON, one object per command.
    Json,
}

/// Serialize `value` as pretty JSON to stdout.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

/// Render a labeled score column in human output.
pub fn print_scores(labels: &[String], scores: &[f64]) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    for (label, score) in labels.iter().zip(scores) {
        writeln!(stdout, "{label:<24} {score:.6}")?;
    }
    Ok(())
}
