//! Circuit Breaker
//!
//! Failure-count gate that suspends epoch execution after repeated failures.
//! States: CLOSED (normal) -> OPEN (tripped) -> HALF_OPEN (testing) -> CLOSED.
//!
//! The breaker holds no lock of its own; the scheduler's single-flight guard
//! guarantees it is never driven concurrently.

use serde::{Deserialize, Serialize};

/// Default consecutive failures before the breaker trips
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Default seconds the breaker stays open before allowing a trial
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 3_600;

/// Breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CircuitState {
    /// Normal operation, executions allowed
    Closed,
    /// Tripped, executions blocked until the timeout elapses
    Open,
    /// Timeout elapsed, exactly one trial execution allowed
    HalfOpen,
}

impl CircuitState {
    pub fn description(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed - executions allowed",
            CircuitState::Open => "OPEN - executions blocked",
            CircuitState::HalfOpen => "half-open - one trial execution allowed",
        }
    }
}

/// Consecutive-failure gate for epoch execution
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    timeout_seconds: u64,

    state: CircuitState,
    failure_count: u32,
    last_failure_at: Option<u64>,
    next_attempt_at: Option<u64>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_THRESHOLD, DEFAULT_TIMEOUT_SECONDS)
    }
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, timeout_seconds: u64) -> Self {
        Self {
            failure_threshold,
            timeout_seconds,
            state: CircuitState::Closed,
            failure_count: 0,
            last_failure_at: None,
            next_attempt_at: None,
        }
    }

    /// Whether an execution may proceed at `now` (unix seconds).
    ///
    /// An open breaker whose timeout has elapsed transitions to half-open as
    /// a side effect and admits one trial.
    pub fn can_execute(&mut self, now: u64) -> bool {
        match self.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                if self.next_attempt_at.is_some_and(|at| now >= at) {
                    tracing::info!("circuit breaker transitioning to half-open");
                    self.state = CircuitState::HalfOpen;
                    true
                } else {
                    tracing::warn!(
                        next_attempt_at = ?self.next_attempt_at,
                        "circuit breaker is open, blocking execution"
                    );
                    false
                }
            }
            // One trial allowed; the caller serializes attempts
            CircuitState::HalfOpen => true,
        }
    }

    /// Record a successful execution.
    ///
    /// A half-open success fully resets the breaker; a closed success clears
    /// the failure count (successes do not accumulate credit).
    pub fn record_success(&mut self) {
        if self.state == CircuitState::HalfOpen {
            tracing::info!("circuit breaker trial succeeded, resetting to closed");
            self.reset();
        } else {
            self.failure_count = 0;
        }
    }

    /// Record a failed execution at `now`; trips the breaker once the
    /// threshold is reached. A half-open failure re-opens with a fresh
    /// timeout window.
    pub fn record_failure(&mut self, now: u64) {
        self.failure_count += 1;
        self.last_failure_at = Some(now);

        tracing::warn!(
            failure_count = self.failure_count,
            threshold = self.failure_threshold,
            "circuit breaker recorded failure"
        );

        if self.failure_count >= self.failure_threshold {
            self.trip(now);
        }
    }

    /// Force the breaker back to closed - operator override
    pub fn reset(&mut self) {
        self.state = CircuitState::Closed;
        self.failure_count = 0;
        self.last_failure_at = None;
        self.next_attempt_at = None;
        tracing::info!("circuit breaker reset to closed");
    }

    pub fn state(&self) -> CircuitState {
        self.state
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    /// Unix seconds when the next trial is allowed, while open
    pub fn next_attempt_at(&self) -> Option<u64> {
        self.next_attempt_at
    }

    fn trip(&mut self, now: u64) {
        self.state = CircuitState::Open;
        self.next_attempt_at = Some(now + self.timeout_seconds);

        tracing::error!(
            next_attempt_at = self.next_attempt_at,
            timeout_seconds = self.timeout_seconds,
            "circuit breaker TRIPPED - blocking executions"
        );
    }
}
