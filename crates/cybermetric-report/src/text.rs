//! Plain-text evaluation log writer.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use cybermetric_core::report::EvalReport;

/// Replace every character outside `[A-Za-z0-9._-]` with `-`.
pub fn sanitize(component: &str) -> String {
    component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// `{timestamp}__{id[..5]}__{model}__{dataset}.txt`, each part sanitized.
pub fn report_file_name(report: &EvalReport) -> String {
    format!(
        "{}__{}__{}__{}.txt",
        sanitize(&report.run.timestamp()),
        sanitize(&report.run.short_id()),
        sanitize(&report.run.model),
        sanitize(&report.run.dataset)
    )
}

/// Write the evaluation log into `dir`, creating it if needed.
///
/// Returns the path of the written file.
pub fn write_text_report(report: &EvalReport, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let path = dir.join(report_file_name(report));
    std::fs::write(&path, report.to_log())
        .with_context(|| format!("failed to write evaluation log to {}", path.display()))?;

    tracing::info!(path = %path.display(), "evaluation log saved");
    Ok(path)
}
