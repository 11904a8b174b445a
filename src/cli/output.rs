//! Output formatting utilities for CLI commands

use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::Path;

use is_terminal::IsTerminal;

use super::parser::OutputFormat;
use crate::aggregate::CorpusReport;
use crate::error::Result;

/// Colorize text with ANSI escape codes (only if stdout is a terminal)
pub fn color(code: &str, text: &str) -> String {
    if io::stdout().is_terminal() {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

/// Write output to file or stdout
///
/// # Errors
///
/// [`Error::Io`](crate::Error::Io) if writing fails.
pub fn write_output(content: &str, path: Option<&Path>) -> Result<()> {
    if let Some(path) = path {
        std::fs::write(path, content)?;
        log::info!("wrote report to {}", path.display());
    } else {
        let mut stdout = io::stdout().lock();
        stdout.write_all(content.as_bytes())?;
        stdout.flush()?;
    }
    Ok(())
}

/// Render a corpus report.
///
/// # Errors
///
/// [`Error::Json`](crate::Error::Json) if JSON serialization fails.
pub fn render_report(report: &CorpusReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(report)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Text => Ok(render_text(report)),
    }
}

fn render_text(report: &CorpusReport) -> String {
    let mut out = String::new();

    for doc in &report.per_document {
        let name = doc.doc_id.as_deref().unwrap_or("<unnamed>");
        for line in doc.diagnostics() {
            let _ = writeln!(out, "{}: {}", name, line);
        }
        if let Some(conll) = doc.conll_f1 {
            let _ = writeln!(out, "{}: conll {:.2}", name, conll * 100.0);
        }
        for warning in &doc.warnings {
            let _ = writeln!(out, "{}: {} {}", name, color("33", "warning:"), warning);
        }
    }
    if !report.per_document.is_empty() {
        out.push('\n');
    }

    if let Some(stats) = &report.alignment {
        let _ = writeln!(out, "Alignment: {}", stats);
    }
    let _ = write!(out, "{}", report);

    for skipped in &report.skipped {
        let _ = writeln!(
            out,
            "{} {}: {}",
            color("33", "skipped"),
            skipped.doc_id,
            skipped.reason
        );
    }
    out
}
