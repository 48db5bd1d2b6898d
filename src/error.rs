//! Error types reported by fetchers.
//!
//! A subscription never dies because a fetch failed: the coordinator applies
//! a fixed backoff and tries again until it is closed. [`FetchError`]
//! therefore travels exactly two roads: onto the event bus as a reason
//! string, and back to whoever calls `close`. The most recent failure wins;
//! a later success clears it.

use thiserror::Error;

/// # Errors produced by a fetch attempt.
///
/// The coordinator treats every variant identically (fixed backoff, retry
/// forever); the split exists for fetcher implementors and log labels.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum FetchError {
    /// The source could not be reached, or answered with a transport-level failure.
    #[error("fetch failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// The source answered, but the payload could not be interpreted.
    #[error("malformed feed: {error}")]
    Malformed {
        /// The underlying error message.
        error: String,
    },
}

impl FetchError {
    /// Creates a transport-level failure from any message.
    pub fn failed(error: impl Into<String>) -> Self {
        FetchError::Failed {
            error: error.into(),
        }
    }

    /// Creates a malformed-payload failure from any message.
    pub fn malformed(error: impl Into<String>) -> Self {
        FetchError::Malformed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use feedvisor::FetchError;
    ///
    /// let err = FetchError::failed("connection refused");
    /// assert_eq!(err.as_label(), "fetch_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            FetchError::Failed { .. } => "fetch_failed",
            FetchError::Malformed { .. } => "fetch_malformed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            FetchError::Failed { error } => format!("transport: {error}"),
            FetchError::Malformed { error } => format!("payload: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(FetchError::failed("x").as_label(), "fetch_failed");
        assert_eq!(FetchError::malformed("x").as_label(), "fetch_malformed");
    }

    #[test]
    fn test_display_includes_cause() {
        let err = FetchError::failed("connection refused");
        assert_eq!(err.to_string(), "fetch failed: connection refused");

        let err = FetchError::malformed("not xml");
        assert_eq!(err.to_string(), "malformed feed: not xml");
    }

    #[test]
    fn test_message_includes_cause() {
        let err = FetchError::failed("timeout");
        assert_eq!(err.as_message(), "transport: timeout");
    }
}
