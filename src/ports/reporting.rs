//! Report sink port

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::report::EpochReport;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persists epoch reports as hash-stamped artifacts. A write failure is a
/// cycle failure.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn write_report(&self, report: &EpochReport) -> Result<(), ReportError>;
}
