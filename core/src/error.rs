//! Error types for the API client.
//!
//! # Design
//! Every dispatch failure is a `DispatchError`. The `Display` text is the
//! human-readable message callers have always seen; the variant (or
//! [`ErrorKind`]) lets code branch on the cause without parsing that text.
//! No variant implies any recovery: failures are surfaced once and never
//! retried.

use thiserror::Error;

/// Errors returned by `RequestDispatcher::dispatch` and the facades.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The server answered with a status outside 2xx.
    #[error("HTTP {status}: {reason}. Body: {body}")]
    Status {
        status: u16,
        reason: String,
        body: String,
    },

    /// The request never produced a response: DNS, refused connection, TLS,
    /// timeout.
    #[error("URL Error: {detail}")]
    Network { detail: String },

    /// The response body was not valid JSON.
    #[error("Invalid JSON response: {detail}")]
    Decode { detail: String },

    /// Anything else that went wrong while building or running the call.
    #[error("Request failed: {detail}")]
    Other { detail: String },
}

/// Fieldless tag for [`DispatchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Status,
    Network,
    Decode,
    Other,
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::Status { .. } => ErrorKind::Status,
            DispatchError::Network { .. } => ErrorKind::Network,
            DispatchError::Decode { .. } => ErrorKind::Decode,
            DispatchError::Other { .. } => ErrorKind::Other,
        }
    }

    /// The human-readable message, identical to the `Display` output.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status code, for `Status` errors only.
    pub fn status(&self) -> Option<u16> {
        match self {
            DispatchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Invalid client configuration read from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required variable {0}")]
    Missing(String),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_embeds_code_reason_and_body() {
        let err = DispatchError::Status {
            status: 404,
            reason: "Not Found".to_string(),
            body: "{}".to_string(),
        };
        assert_eq!(err.message(), "HTTP 404: Not Found. Body: {}");
        assert_eq!(err.kind(), ErrorKind::Status);
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn non_status_errors_have_no_code() {
        let err = DispatchError::Network {
            detail: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "URL Error: connection refused");
        assert_eq!(err.status(), None);

        let err = DispatchError::Decode {
            detail: "expected value at line 1 column 1".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(err.message().starts_with("Invalid JSON response: "));
    }
}
