//! Error classification for remote operations and coordinator failures.

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Implemented by error types returned from remote operations so the
/// coordinator can decide whether another attempt is worthwhile.
pub trait ClassifyError {
    /// `true` for transient failures (connectivity, timeouts). Semantic
    /// rejections such as authorization failures return `false`.
    fn is_retryable(&self) -> bool;
}

/// Ready-made operation error for callers without their own error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    /// Transient failure, e.g. the backend was unreachable.
    #[error("{0}")]
    Retryable(String),

    /// The remote store refused the change.
    #[error("{0}")]
    NonRetryable(String),
}

impl ClassifyError for OperationError {
    fn is_retryable(&self) -> bool {
        matches!(self, OperationError::Retryable(_))
    }
}

// ---------------------------------------------------------------------------
// MutationError
// ---------------------------------------------------------------------------

/// Terminal failure of a mutation, carrying the caller's original error.
///
/// The display form is the same composed message stored in the entity's
/// `MutationState::error`.
#[derive(Debug, thiserror::Error)]
pub enum MutationError<E> {
    /// A retryable error persisted through every allowed attempt.
    #[error("{message}")]
    Exhausted {
        message: String,
        attempts: u32,
        error: E,
    },

    /// A non-retryable error ended the attempt chain immediately.
    #[error("{message}")]
    Rejected {
        message: String,
        attempts: u32,
        error: E,
    },
}

impl<E> MutationError<E> {
    pub fn message(&self) -> &str {
        match self {
            MutationError::Exhausted { message, .. } | MutationError::Rejected { message, .. } => {
                message
            }
        }
    }

    /// Total number of times the operation was invoked.
    pub fn attempts(&self) -> u32 {
        match self {
            MutationError::Exhausted { attempts, .. } | MutationError::Rejected { attempts, .. } => {
                *attempts
            }
        }
    }

    /// The error returned by the final attempt.
    pub fn inner(&self) -> &E {
        match self {
            MutationError::Exhausted { error, .. } | MutationError::Rejected { error, .. } => error,
        }
    }

    pub fn into_inner(self) -> E {
        match self {
            MutationError::Exhausted { error, .. } | MutationError::Rejected { error, .. } => error,
        }
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_error_classification() {
        assert!(OperationError::Retryable("offline".into()).is_retryable());
        assert!(!OperationError::NonRetryable("forbidden".into()).is_retryable());
    }

    #[test]
    fn mutation_error_accessors() {
        let err = MutationError::Exhausted {
            message: "Failed to update course-1 after 3 attempts: offline".into(),
            attempts: 3,
            error: OperationError::Retryable("offline".into()),
        };
        assert_eq!(err.attempts(), 3);
        assert_eq!(err.to_string(), err.message());
        assert_eq!(err.inner(), &OperationError::Retryable("offline".into()));
        assert_eq!(err.into_inner(), OperationError::Retryable("offline".into()));
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::Invalid {
            var: "MUTATION_MAX_RETRIES",
            expected: "u32",
            value: "many".into(),
        };
        assert_eq!(
            err.to_string(),
            "MUTATION_MAX_RETRIES must be a valid u32, got 'many'"
        );
    }
}
