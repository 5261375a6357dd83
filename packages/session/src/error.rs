//! Error types for sessions and the command protocol.

use baglens_core::DecodeError;
use baglens_log::LogError;
use thiserror::Error;

/// Errors surfaced to the caller of a command.
///
/// None of these are retried internally.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The handle is not registered (never issued, or already destructed).
    #[error("invalid handle: {0}")]
    InvalidHandle(u64),

    /// The command name is not recognised at its routing level.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A read was attempted before any `reset_view`.
    #[error("no active view; call reset_view first")]
    NoActiveView,

    /// A read was attempted past the end of the current view.
    #[error("no more records in the current view")]
    NoMoreRecords,

    /// The log collaborator could not open the requested log.
    #[error("cannot open log '{path}': {source}")]
    CannotOpenLog {
        path: String,
        #[source]
        source: LogError,
    },

    /// The record at the cursor could not be split or decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The open log failed while reading an entry.
    #[error("log error: {0}")]
    Log(#[from] LogError),

    /// A required command argument was not supplied.
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    /// A command argument had the wrong host type.
    #[error("bad argument '{name}': expected {expected}")]
    BadArgument {
        name: &'static str,
        expected: &'static str,
    },

    /// The multiplexer's session limit has been reached.
    #[error("too many open sessions (limit {0})")]
    TooManySessions(usize),
}

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn display() {
        assert_eq!(SessionError::InvalidHandle(9).to_string(), "invalid handle: 9");
        assert_eq!(
            SessionError::UnknownCommand("rewind".to_string()).to_string(),
            "unknown command: rewind"
        );
        assert!(SessionError::BadArgument {
            name: "handle",
            expected: "an unsigned integer"
        }
        .to_string()
        .contains("handle"));
    }

    #[test]
    fn cannot_open_log_has_source() {
        let e = SessionError::CannotOpenLog {
            path: "a.log".to_string(),
            source: LogError::UnknownType {
                type_name: "T".to_string(),
            },
        };
        assert!(e.to_string().contains("a.log"));
        assert!(StdError::source(&e).is_some());
    }

    #[test]
    fn decode_error_converts() {
        let e: SessionError = DecodeError::Trailing { count: 1 }.into();
        assert!(matches!(e, SessionError::Decode(_)));
    }
}
