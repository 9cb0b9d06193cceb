use anyhow::{Context, Result};
use std::fmt::Write;

use crate::core::config::SummaryFormat;
use crate::core::engine::{BatchSummary, FileStatus};

pub trait SummaryReporter {
    fn render_summary(&self, summary: &BatchSummary) -> Result<String>;
}

/// Returns the reporter for the configured summary format.
pub fn reporter_for(format: SummaryFormat) -> Box<dyn SummaryReporter> {
    match format {
        SummaryFormat::Text => Box::new(ConsoleReporter::new()),
        SummaryFormat::Json | SummaryFormat::Yaml => Box::new(StructuredReporter::new(format)),
    }
}

/// Renders the human-readable summary printed after a multi-file run.
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }

    /// One line per file, prefixed with an icon for its status.
    fn format_file_lines(&self, out: &mut String, summary: &BatchSummary) -> std::fmt::Result {
        for report in &summary.files {
            // 🟢 cleaned, ⚪ nothing to do, 🟡 dry run, 🔴 failed
            let (icon, detail) = match report.status {
                FileStatus::Cleaned => ("🟢", format!("{} block(s) removed", report.blocks_found)),
                FileStatus::Unchanged => ("⚪", "no blocks".to_string()),
                FileStatus::DryRun => ("🟡", format!("{} block(s) found", report.blocks_found)),
                FileStatus::Failed => (
                    "🔴",
                    report.error.clone().unwrap_or_else(|| "failed".to_string()),
                ),
            };
            writeln!(out, "  {icon} {} ({detail})", report.path.display())?;
        }
        Ok(())
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryReporter for ConsoleReporter {
    fn render_summary(&self, summary: &BatchSummary) -> Result<String> {
        let mut out = String::new();

        writeln!(out, "\n=== Results Summary ===")?;
        self.format_file_lines(&mut out, summary)?;
        writeln!(out, "Successfully processed: {} files", summary.succeeded)?;
        writeln!(out, "Failed to process: {} files", summary.failed)?;

        if !summary.all_succeeded() {
            writeln!(out, "\nFailed files:")?;
            for path in summary.failed_paths() {
                writeln!(out, "  - {}", path.display())?;
            }
        }

        Ok(out)
    }
}

/// Serializes the whole summary for scripts and CI logs.
pub struct StructuredReporter {
    format: SummaryFormat,
}

impl StructuredReporter {
    pub fn new(format: SummaryFormat) -> Self {
        Self { format }
    }
}

impl SummaryReporter for StructuredReporter {
    fn render_summary(&self, summary: &BatchSummary) -> Result<String> {
        match self.format {
            SummaryFormat::Json => {
                serde_json::to_string_pretty(summary).context("Failed to serialize summary to JSON")
            }
            SummaryFormat::Yaml => {
                serde_yaml::to_string(summary).context("Failed to serialize summary to YAML")
            }
            SummaryFormat::Text => ConsoleReporter::new().render_summary(summary),
        }
    }
}
