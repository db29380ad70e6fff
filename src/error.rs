use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while driving the remote pool.
#[derive(Debug, Error)]
pub enum StepError {
    /// The pool endpoint was unreachable, refused the connection, or the
    /// handshake timed out. Surfaced immediately, no retry.
    #[error("failed to connect to {endpoint}: {message}")]
    Connection { endpoint: String, message: String },

    /// A page was requested from a session that was already closed.
    #[error("session is closed")]
    SessionClosed,

    /// The selector resolved to nothing on the current page.
    #[error("no element matches selector: {0}")]
    ElementNotFound(String),

    #[error("navigation to {url} timed out after {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    #[error("timed out after {timeout_ms}ms waiting for: {selector}")]
    WaitTimeout { selector: String, timeout_ms: u64 },

    #[error("assertion failed: expected {expected}, got {actual}")]
    AssertionFailed { expected: String, actual: String },

    /// Local I/O failure while saving an output file. Never invalidates
    /// the steps that came before it.
    #[error("failed to write artifact {}: {message}", path.display())]
    Artifact { path: PathBuf, message: String },

    /// A CDP call failed for reasons other than the above, usually
    /// because the session dropped mid-run.
    #[error("browser call failed: {0}")]
    Transport(String),
}

/// Failure classes the diagnostics reporter keys remediation hints on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Connection,
    Session,
    Selector,
    Timeout,
    Assertion,
    Artifact,
    Transport,
}

impl StepError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StepError::Connection { .. } => ErrorCategory::Connection,
            StepError::SessionClosed => ErrorCategory::Session,
            StepError::ElementNotFound(_) => ErrorCategory::Selector,
            StepError::NavigationTimeout { .. } | StepError::WaitTimeout { .. } => {
                ErrorCategory::Timeout
            }
            StepError::AssertionFailed { .. } => ErrorCategory::Assertion,
            StepError::Artifact { .. } => ErrorCategory::Artifact,
            StepError::Transport(_) => ErrorCategory::Transport,
        }
    }

    /// Artifact write failures are recorded but never abort a run,
    /// regardless of the step's declared severity.
    pub fn is_always_soft(&self) -> bool {
        matches!(self, StepError::Artifact { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_names_the_endpoint() {
        let err = StepError::Connection {
            endpoint: "ws://localhost:3000/".into(),
            message: "connection refused".into(),
        };
        assert!(err.to_string().contains("ws://localhost:3000/"));
        assert_eq!(err.category(), ErrorCategory::Connection);
    }

    #[test]
    fn test_timeouts_share_a_category() {
        let nav = StepError::NavigationTimeout {
            url: "https://example.com".into(),
            timeout_ms: 30_000,
        };
        let wait = StepError::WaitTimeout {
            selector: "#firstHeading".into(),
            timeout_ms: 10_000,
        };
        assert_eq!(nav.category(), ErrorCategory::Timeout);
        assert_eq!(wait.category(), ErrorCategory::Timeout);
    }

    #[test]
    fn test_only_artifact_errors_are_always_soft() {
        let artifact = StepError::Artifact {
            path: "artifacts/shot.png".into(),
            message: "read-only file system".into(),
        };
        assert!(artifact.is_always_soft());
        assert!(!StepError::SessionClosed.is_always_soft());
        assert!(!StepError::Transport("ws closed".into()).is_always_soft());
    }
}
