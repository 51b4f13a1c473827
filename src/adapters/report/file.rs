//! File Report Sink
//!
//! Persists one JSON document plus a plain-text summary per epoch. The JSON
//! carries a sha256 content hash over the deterministic fields and a write
//! timestamp, making reports tamper-evident and content-addressed.

use std::fmt::Write as _;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::domain::report::EpochReport;
use crate::ports::reporting::{ReportError, ReportSink};

#[derive(Serialize)]
struct PersistedReport<'a> {
    #[serde(flatten)]
    report: &'a EpochReport,
    hash: String,
    created_at: String,
}

/// Writes `epoch-{id}.json` and `epoch-{id}-summary.txt` into a directory
pub struct FileReportSink {
    reports_dir: PathBuf,
}

impl FileReportSink {
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
        }
    }
}

/// sha256 over the deterministic report fields, hex-encoded
pub fn content_digest(report: &EpochReport) -> Result<String, serde_json::Error> {
    let canonical = serde_json::to_string(&serde_json::json!({
        "epoch_id": report.epoch_id,
        "timestamp": report.timestamp,
        "fees": report.fees,
        "plan": report.plan,
        "transactions": report.transactions,
    }))?;

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());

    let mut hex = String::new();
    for byte in hasher.finalize() {
        let _ = write!(hex, "{byte:02x}");
    }
    Ok(hex)
}

#[async_trait]
impl ReportSink for FileReportSink {
    async fn write_report(&self, report: &EpochReport) -> Result<(), ReportError> {
        tokio::fs::create_dir_all(&self.reports_dir).await?;

        let persisted = PersistedReport {
            report,
            hash: content_digest(report)?,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        let json = serde_json::to_string_pretty(&persisted)?;

        let json_path = self.reports_dir.join(format!("epoch-{}.json", report.epoch_id));
        let summary_path = self
            .reports_dir
            .join(format!("epoch-{}-summary.txt", report.epoch_id));

        tokio::fs::write(&json_path, json).await?;
        tokio::fs::write(&summary_path, &report.summary).await?;

        tracing::info!(
            path = %json_path.display(),
            "wrote execution report"
        );
        Ok(())
    }
}
