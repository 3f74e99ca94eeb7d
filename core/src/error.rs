//! Error types for the mget client.
//!
//! # Design
//! Parameter validation is fail-fast: the builder stops at the first
//! offending field and reports it as `InvalidArgument`, before the transport
//! is ever invoked. The remaining variants describe what can go wrong once a
//! request has been handed to the transport.

use thiserror::Error;

/// Errors returned by `build_mget` and `Client::mget`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A parameter had the wrong shape or value. `param` names the option.
    #[error("Invalid {param}: {reason}")]
    InvalidArgument { param: String, reason: String },

    /// The server returned a non-2xx status that was not listed in `ignore`.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The transport failed before producing a response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// A structured request body could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl ApiError {
    pub(crate) fn invalid(param: &str, reason: impl Into<String>) -> Self {
        ApiError::InvalidArgument {
            param: param.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors raised while validating parameters.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, ApiError::InvalidArgument { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_message_names_the_param() {
        let err = ApiError::invalid("index", "{} should be a string.");
        assert_eq!(err.to_string(), "Invalid index: {} should be a string.");
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn http_error_is_not_invalid_argument() {
        let err = ApiError::HttpError {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");
        assert!(!err.is_invalid_argument());
    }
}
