//! # Circuit Breaker Module
//!
//! Circuit breaker guarding the OCR engine. After a run of consecutive
//! failures the breaker opens and OCR requests fail fast until the reset
//! window has elapsed; the first call after that is let through as a trial.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::ocr_config::RecoveryConfig;

/// Observable state of the breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Requests pass through
    Closed,
    /// Failure threshold reached, requests are rejected
    Open,
    /// Reset window elapsed, the next request is a trial
    HalfOpen,
}

#[derive(Debug, Default)]
struct BreakerInner {
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Circuit breaker for OCR operations
///
/// Thresholds come from [`RecoveryConfig`]:
/// - `circuit_breaker_threshold`: consecutive failures before opening
/// - `circuit_breaker_reset_secs`: time before a trial request is allowed
#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Mutex<BreakerInner>,
    threshold: u32,
    reset_after: Duration,
}

impl CircuitBreaker {
    /// Create a new, closed circuit breaker
    ///
    /// ```rust
    /// use college_companion::circuit_breaker::{BreakerState, CircuitBreaker};
    /// use college_companion::ocr_config::RecoveryConfig;
    ///
    /// let breaker = CircuitBreaker::new(RecoveryConfig::default());
    /// assert_eq!(breaker.state(), BreakerState::Closed);
    /// ```
    pub fn new(config: RecoveryConfig) -> Self {
        Self {
            inner: Mutex::new(BreakerInner::default()),
            threshold: config.circuit_breaker_threshold.max(1),
            reset_after: Duration::from_secs(config.circuit_breaker_reset_secs),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerInner> {
        // A panic while holding the lock cannot leave the counters inconsistent
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current state, taking the reset window into account
    pub fn state(&self) -> BreakerState {
        let inner = self.lock();
        match inner.opened_at {
            None => BreakerState::Closed,
            Some(opened_at) if opened_at.elapsed() < self.reset_after => BreakerState::Open,
            Some(_) => BreakerState::HalfOpen,
        }
    }

    /// `true` while requests should be rejected without calling OCR
    pub fn is_open(&self) -> bool {
        self.state() == BreakerState::Open
    }

    /// Record a failed OCR call; opens the circuit at the threshold
    pub fn record_failure(&self) {
        let mut inner = self.lock();
        inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
        if inner.consecutive_failures >= self.threshold {
            // A failed trial restarts the reset window
            inner.opened_at = Some(Instant::now());
        }
    }

    /// Record a successful OCR call; closes the circuit
    pub fn record_success(&self) {
        let mut inner = self.lock();
        inner.consecutive_failures = 0;
        inner.opened_at = None;
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(threshold: u32, reset_secs: u64) -> RecoveryConfig {
        RecoveryConfig {
            circuit_breaker_threshold: threshold,
            circuit_breaker_reset_secs: reset_secs,
            ..Default::default()
        }
    }

    #[test]
    fn test_opens_at_threshold() {
        let breaker = CircuitBreaker::new(config(2, 60));
        assert!(!breaker.is_open());

        breaker.record_failure();
        assert!(!breaker.is_open());

        breaker.record_failure();
        assert!(breaker.is_open());
        assert_eq!(breaker.state(), BreakerState::Open);
    }

    #[test]
    fn test_success_closes_circuit() {
        let breaker = CircuitBreaker::new(config(1, 60));
        breaker.record_failure();
        assert!(breaker.is_open());

        breaker.record_success();
        assert_eq!(breaker.state(), BreakerState::Closed);
        assert_eq!(breaker.consecutive_failures(), 0);
    }

    #[test]
    fn test_half_open_after_reset_window() {
        let breaker = CircuitBreaker::new(config(1, 0));
        breaker.record_failure();
        // Zero-second window: the trial is allowed immediately
        assert_eq!(breaker.state(), BreakerState::HalfOpen);
        assert!(!breaker.is_open());
    }

    #[test]
    fn test_zero_threshold_is_treated_as_one() {
        let breaker = CircuitBreaker::new(config(0, 60));
        assert!(!breaker.is_open());
        breaker.record_failure();
        assert!(breaker.is_open());
    }
}
