//! JSON run reports.
//!
//! Each invocation writes one [`RunReport`] so cron runs leave a trail of
//! what was published, or why nothing was.

use crate::models::RunReport;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `report` to `{report_dir}/{date}/{HHMMSS}.json`.
///
/// Date and time are taken from the report's `started_at`.
///
/// # Returns
///
/// The path of the written file.
#[instrument(level = "info", skip_all, fields(report_dir = %report_dir))]
pub async fn write_report(report: &RunReport, report_dir: &str) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;

    let full_dir = PathBuf::from(report_dir).join(report.started_at.format("%Y-%m-%d").to_string());
    info!(full_dir = %full_dir.display(), "Ensuring report directory exists");
    if let Err(e) = fs::create_dir_all(&full_dir).await {
        error!(full_dir = %full_dir.display(), error = %e, "Failed to create report dir");
        return Err(e.into());
    }

    let path = full_dir.join(format!("{}.json", report.started_at.format("%H%M%S")));
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote run report");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PipelineOutcome;
    use chrono::{Local, TimeZone};

    #[tokio::test]
    async fn test_write_report_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let started_at = Local.with_ymd_and_hms(2025, 5, 6, 8, 0, 12).unwrap();
        let report = RunReport {
            started_at,
            finished_at: started_at,
            outcome: PipelineOutcome::ExhaustedRetries {
                attempts: 10,
                last_title: "Same".to_string(),
            },
        };

        let path = write_report(&report, tmp.path().to_str().unwrap()).await.unwrap();

        assert_eq!(path, tmp.path().join("2025-05-06").join("080012.json"));
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["outcome"]["outcome"], "exhausted_retries");
        assert_eq!(written["outcome"]["last_title"], "Same");
    }
}
