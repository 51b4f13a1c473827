//! In-Memory Report Sink
//!
//! Records reports for inspection in tests; the failure switch drives the
//! report-persistence error path.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::report::EpochReport;
use crate::ports::reporting::{ReportError, ReportSink};

#[derive(Debug, Default)]
pub struct MemoryReportSink {
    reports: Mutex<Vec<EpochReport>>,
    failing: AtomicBool,
}

impl MemoryReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All reports written so far
    pub fn written(&self) -> Vec<EpochReport> {
        self.reports.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReportSink for MemoryReportSink {
    async fn write_report(&self, report: &EpochReport) -> Result<(), ReportError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ReportError::Io(io::Error::other("simulated write failure")));
        }

        self.reports.lock().unwrap().push(report.clone());
        Ok(())
    }
}
