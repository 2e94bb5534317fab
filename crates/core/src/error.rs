//! Client-side error model.

use thiserror::Error;

/// Result type used across the access layer.
pub type ApiResult<T> = Result<T, ApiError>;

/// Failure of a single HTTP operation.
///
/// Transport failures (request never completed) and HTTP status failures
/// (non-success response) are deliberately unified: callers only ever see a
/// display string suitable for the notification sink. A malformed credential
/// payload is *not* an error at this level; it decodes to a logged-out
/// identity instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The response arrived with a non-success status code.
    #[error("{status} {reason}")]
    Status { status: u16, reason: String },

    /// The request never completed (connection refused, DNS failure,
    /// unreadable or undecodable body).
    #[error("{0}")]
    Transport(String),
}

impl ApiError {
    pub fn status(status: u16, reason: impl Into<String>) -> Self {
        Self::Status {
            status,
            reason: reason.into(),
        }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// HTTP status code, if this failure carries one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_displays_code_and_reason() {
        let err = ApiError::status(403, "Forbidden");
        assert_eq!(err.to_string(), "403 Forbidden");
        assert_eq!(err.status_code(), Some(403));
    }

    #[test]
    fn transport_error_displays_message_verbatim() {
        let err = ApiError::transport("connection refused");
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(err.status_code(), None);
    }
}
