//! Application Layer - Epoch orchestration
//!
//! The execution engine runs one epoch end-to-end; the scheduler drives it
//! on a cadence with single-flight guarantees.

pub mod engine;
pub mod scheduler;

pub use engine::{
    EngineError, EngineSettings, EpochOutcome, ExecutionEngine, GatingStatus, SkipReason,
};
pub use scheduler::{EpochScheduler, SchedulerStats};
