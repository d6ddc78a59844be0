//! Run report presentation.

use crate::cli::presentation::to_pretty_json;
use crate::error::ApiError;
use crate::pipeline::RunReport;

pub fn format_run_report_text(report: &RunReport) -> String {
    let mut output = format!(
        "Run {}: {} subject(s)\n  Generated: {}\n  Added: {}\n  Skipped duplicates: {}\n  Evicted: {}\n  Failed: {}\n  Images: {}\n  Archive size: {}",
        report.started_at,
        report.subjects,
        report.generated,
        report.added,
        report.skipped_duplicates,
        report.evicted,
        report.failed.len(),
        report.images_used,
        report.archive_size
    );
    if !report.failed.is_empty() {
        output.push_str("\n\nFailed subjects:");
        for failure in &report.failed {
            output.push_str(&format!("\n  - {}: {}", failure.subject, failure.error));
        }
    }
    output
}

pub fn format_run_report_json(report: &RunReport) -> Result<String, ApiError> {
    to_pretty_json(report)
}
