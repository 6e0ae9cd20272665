//! Local request-rate guard.
//!
//! A sliding-window approximation of the backend's request quota, kept
//! per operation class. It does not query the backend's actual quota state;
//! its job is to fail fast locally before spending a round trip. The store
//! invokes it before every backend call.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use thiserror::Error;

const WINDOW: Duration = Duration::from_secs(60);

/// Default read requests per minute
pub const DEFAULT_READ_LIMIT: usize = 300;
/// Default write requests per minute
pub const DEFAULT_WRITE_LIMIT: usize = 60;

/// Request classes tracked in separate windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationClass {
    Read,
    Write,
}

impl fmt::Display for OperationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationClass::Read => write!(f, "read"),
            OperationClass::Write => write!(f, "write"),
        }
    }
}

/// Raised when the local window for a class is exhausted
#[derive(Debug, Clone, Error)]
#[error("quota exceeded for {class} operations: limit {limit} requests per minute")]
pub struct QuotaExceededError {
    /// The exhausted class
    pub class: OperationClass,
    /// The configured per-minute limit
    pub limit: usize,
}

/// Per-class request limits
#[derive(Debug, Clone, Copy)]
pub struct QuotaLimits {
    pub read_per_minute: usize,
    pub write_per_minute: usize,
}

impl Default for QuotaLimits {
    fn default() -> Self {
        Self {
            read_per_minute: DEFAULT_READ_LIMIT,
            write_per_minute: DEFAULT_WRITE_LIMIT,
        }
    }
}

/// Sliding-window request-rate guard
pub struct QuotaMonitor {
    limits: QuotaLimits,
    read_window: Mutex<VecDeque<Instant>>,
    write_window: Mutex<VecDeque<Instant>>,
}

impl QuotaMonitor {
    pub fn new(limits: QuotaLimits) -> Self {
        Self {
            limits,
            read_window: Mutex::new(VecDeque::new()),
            write_window: Mutex::new(VecDeque::new()),
        }
    }

    /// Records one request of the given class, or fails if the trailing
    /// 60-second window is already at its limit.
    pub fn check(&self, class: OperationClass) -> Result<(), QuotaExceededError> {
        self.check_at(class, Instant::now())
    }

    fn check_at(&self, class: OperationClass, now: Instant) -> Result<(), QuotaExceededError> {
        let (window, limit) = match class {
            OperationClass::Read => (&self.read_window, self.limits.read_per_minute),
            OperationClass::Write => (&self.write_window, self.limits.write_per_minute),
        };
        let mut window = window.lock().unwrap_or_else(|e| e.into_inner());

        while let Some(&oldest) = window.front() {
            if now.duration_since(oldest) > WINDOW {
                window.pop_front();
            } else {
                break;
            }
        }

        if window.len() >= limit {
            return Err(QuotaExceededError { class, limit });
        }

        window.push_back(now);
        Ok(())
    }
}

impl Default for QuotaMonitor {
    fn default() -> Self {
        Self::new(QuotaLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_limits() -> QuotaLimits {
        QuotaLimits {
            read_per_minute: 3,
            write_per_minute: 2,
        }
    }

    #[test]
    fn test_calls_within_limit_succeed() {
        let monitor = QuotaMonitor::new(small_limits());
        let now = Instant::now();
        for _ in 0..3 {
            monitor.check_at(OperationClass::Read, now).unwrap();
        }
    }

    #[test]
    fn test_call_over_limit_fails() {
        let monitor = QuotaMonitor::new(small_limits());
        let now = Instant::now();
        for _ in 0..3 {
            monitor.check_at(OperationClass::Read, now).unwrap();
        }
        let err = monitor.check_at(OperationClass::Read, now).unwrap_err();
        assert_eq!(err.limit, 3);
        assert_eq!(err.class, OperationClass::Read);
    }

    #[test]
    fn test_window_slides_after_a_minute() {
        let monitor = QuotaMonitor::new(small_limits());
        let start = Instant::now();
        for _ in 0..2 {
            monitor.check_at(OperationClass::Write, start).unwrap();
        }
        assert!(monitor.check_at(OperationClass::Write, start).is_err());

        // 61 seconds later the old entries have aged out
        let later = start + Duration::from_secs(61);
        monitor.check_at(OperationClass::Write, later).unwrap();
    }

    #[test]
    fn test_classes_are_independent() {
        let monitor = QuotaMonitor::new(small_limits());
        let now = Instant::now();
        for _ in 0..2 {
            monitor.check_at(OperationClass::Write, now).unwrap();
        }
        assert!(monitor.check_at(OperationClass::Write, now).is_err());
        // Read window is untouched
        monitor.check_at(OperationClass::Read, now).unwrap();
    }
}
