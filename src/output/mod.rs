pub mod json;
pub mod line;
pub mod table;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::report::CampaignReport;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Line,
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Show programs without a baseline as new instead of unchanged.
    pub mark_new_programs: bool,
}

pub fn render_report(
    report: &CampaignReport,
    format: ReportFormat,
    options: &RenderOptions,
) -> Result<String> {
    match format {
        ReportFormat::Line => Ok(line::render_line_report(report, options)),
        ReportFormat::Table => Ok(table::render_table(report, options)),
        ReportFormat::Json => json::render_json(report),
    }
}

pub fn write_message(path: &Path, message: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating message directory: {}", parent.display())
            })?;
        }
    }
    fs::write(path, message)
        .with_context(|| format!("failed writing message file: {}", path.display()))
}

pub(crate) fn failure_lines(report: &CampaignReport) -> String {
    report
        .failures
        .iter()
        .map(|f| format!("[ERROR] {}: {}\n", f.label, f.reason))
        .collect()
}
