//! Error types for the remote prediction path

use thiserror::Error;

/// Failure talking to the prediction backend
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Short label used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Http(_) => "http",
            ClientError::Status { .. } => "status",
            ClientError::Timeout(_) => "timeout",
            ClientError::InvalidUrl(_) => "invalid_url",
            ClientError::Decode(_) => "decode",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_error_messages() {
        let err = ClientError::Status {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "backend returned 503: unavailable");
        assert_eq!(err.kind(), "status");

        let err = ClientError::Timeout(Duration::from_secs(10));
        assert_eq!(err.to_string(), "request timed out after 10s");
    }

    #[test]
    fn test_from_conversions() {
        let err: ClientError = url::Url::parse("not a url").unwrap_err().into();
        assert_eq!(err.kind(), "invalid_url");

        let err: ClientError = serde_json::from_str::<u8>("{").unwrap_err().into();
        assert_eq!(err.kind(), "decode");
    }
}
