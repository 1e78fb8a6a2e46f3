//! Session error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// What stopped a session.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SessionErrorKind {
    /// The listening socket could not be acquired.
    #[display("Cannot listen on {_0}")]
    Bind(String),
    /// A peer sent an explicit `Error:<message>` marker.
    #[display("Peer reported error: {_0}")]
    Protocol(String),
}

/// Session error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Session error: {} at {}:{}", kind, file, line)]
pub struct SessionError {
    /// Error category.
    pub kind: SessionErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SessionError {
    /// Creates a new session error with caller location tracking.
    #[track_caller]
    #[instrument]
    pub fn new(kind: SessionErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Shorthand for a [`SessionErrorKind::Protocol`] error.
    #[track_caller]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(SessionErrorKind::Protocol(message.into()))
    }
}
