//! Wrapper errors for setup and execution failures (spec.md 6/7).
//!
//! These mirror the Java-shaped `ServiceSetupException` /
//! `ServiceExecutionException` named as collaborators in spec.md 6: every
//! crate's operation-level error enum (`LockError`, `SchedulerError`, ...)
//! converts into one of these two at the service boundary, carrying the
//! original error as `source()`.

use std::error::Error as StdError;
use thiserror::Error;

/// Wraps a failure that occurred while initializing a service.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ServiceSetupError {
    message: String,
    #[source]
    cause: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl ServiceSetupError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(
        message: impl Into<String>,
        cause: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }
}

/// Wraps a failure that occurred while running a dependent operation.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ServiceExecutionError {
    message: String,
    #[source]
    cause: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl ServiceExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(
        message: impl Into<String>,
        cause: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn setup_error_without_cause_has_no_source() {
        let err = ServiceSetupError::new("bad config");
        assert!(StdError::source(&err).is_none());
        assert_eq!(err.to_string(), "bad config");
    }

    #[test]
    fn setup_error_with_cause_reports_source() {
        let io_err = io::Error::new(io::ErrorKind::Other, "disk full");
        let err = ServiceSetupError::with_cause("failed to load config", io_err);
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn execution_error_roundtrips_message() {
        let err = ServiceExecutionError::new("task failed");
        assert_eq!(err.to_string(), "task failed");
    }
}
