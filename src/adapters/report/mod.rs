//! Report Sinks
//!
//! File-backed persistence for production and an in-memory recorder for
//! tests.

pub mod file;
pub mod memory;

pub use file::{FileReportSink, content_digest};
pub use memory::MemoryReportSink;
