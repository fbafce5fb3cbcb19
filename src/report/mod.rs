//! Rendering of a [`Report`] for people and tools.

pub mod html;
pub mod text;

use std::fs;
use std::io::Write;
use std::path::Path;

use clap::ValueEnum;
use tracing::info;

use crate::history::Report;

/// Result type for report rendering
pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to serialize report")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to write report to {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Output format of the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Standalone HTML page
    Html,
    /// `{ job: { "class#test": [bool, ...] } }`
    Json,
    /// One line per flagged test, `.` for a pass and `X` for a failure
    Text,
}

/// Render the report in the given format
pub fn render(report: &Report, format: ReportFormat) -> ReportResult<String> {
    match format {
        ReportFormat::Html => Ok(html::render(report)),
        ReportFormat::Json => {
            let mut json = serde_json::to_string_pretty(report)?;
            json.push('\n');
            Ok(json)
        }
        ReportFormat::Text => Ok(text::render(report)),
    }
}

/// Render the report and write it to `output`, or to stdout when `output` is `-`
pub fn write_report(report: &Report, format: ReportFormat, output: &Path) -> ReportResult<()> {
    let rendered = render(report, format)?;

    if output == Path::new("-") {
        let mut stdout = std::io::stdout().lock();
        return stdout
            .write_all(rendered.as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(|source| ReportError::Io {
                path: "stdout".to_string(),
                source,
            });
    }

    fs::write(output, rendered).map_err(|source| ReportError::Io {
        path: output.display().to_string(),
        source,
    })?;
    info!(path = %output.display(), ?format, "report written");
    Ok(())
}
