//! OpenAI-specific error handling.

use flatfinder_core::Error;

/// OpenAI-specific error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAIErrorCode {
    /// Invalid authentication credentials.
    AuthenticationError,
    /// Rate limit exceeded.
    RateLimitExceeded,
    /// Model not found or not available.
    ModelNotFound,
    /// Request too large.
    ContextLengthExceeded,
    /// Server error.
    ServerError,
    Unknown,
}

impl OpenAIErrorCode {
    /// Determine error code from HTTP status and error type.
    pub fn from_response(status: u16, error_type: &str) -> Self {
        match (status, error_type) {
            (401, _) => Self::AuthenticationError,
            (429, _) => Self::RateLimitExceeded,
            (404, _) | (_, "model_not_found") => Self::ModelNotFound,
            (400, _) if error_type.contains("context_length") => Self::ContextLengthExceeded,
            (500..=599, _) => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Misconfiguration on our side rather than a failure of the service.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::AuthenticationError | Self::ModelNotFound)
    }
}

/// Convert an OpenAI error response into a flatfinder [`Error`].
///
/// Credential and model problems become [`Error::Config`]; everything else
/// is wrapped by `service_error` (`Error::Embedding` or `Error::Inference`,
/// depending on which endpoint failed).
pub fn to_flatfinder_error(
    code: OpenAIErrorCode,
    message: &str,
    service_error: fn(String) -> Error,
) -> Error {
    match code {
        OpenAIErrorCode::AuthenticationError => {
            Error::Config(format!("Authentication failed: {}", message))
        }
        OpenAIErrorCode::ModelNotFound => Error::Config(format!("Model not found: {}", message)),
        OpenAIErrorCode::RateLimitExceeded => {
            service_error(format!("Rate limit exceeded: {}", message))
        }
        OpenAIErrorCode::ContextLengthExceeded => {
            service_error(format!("Context too long: {}", message))
        }
        OpenAIErrorCode::ServerError => service_error(format!("Server error: {}", message)),
        OpenAIErrorCode::Unknown => service_error(message.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_from_status() {
        assert_eq!(
            OpenAIErrorCode::from_response(401, "invalid_api_key"),
            OpenAIErrorCode::AuthenticationError
        );
        assert_eq!(
            OpenAIErrorCode::from_response(429, "rate_limit_exceeded"),
            OpenAIErrorCode::RateLimitExceeded
        );
        assert_eq!(
            OpenAIErrorCode::from_response(400, "model_not_found"),
            OpenAIErrorCode::ModelNotFound
        );
        assert_eq!(
            OpenAIErrorCode::from_response(400, "context_length_exceeded"),
            OpenAIErrorCode::ContextLengthExceeded
        );
        assert_eq!(
            OpenAIErrorCode::from_response(502, "bad_gateway"),
            OpenAIErrorCode::ServerError
        );
        assert_eq!(
            OpenAIErrorCode::from_response(418, "im_a_teapot"),
            OpenAIErrorCode::Unknown
        );
    }

    #[test]
    fn test_config_codes() {
        assert!(OpenAIErrorCode::AuthenticationError.is_config());
        assert!(OpenAIErrorCode::ModelNotFound.is_config());
        assert!(!OpenAIErrorCode::ServerError.is_config());
    }

    #[test]
    fn test_auth_maps_to_config() {
        let err = to_flatfinder_error(OpenAIErrorCode::AuthenticationError, "bad key", Error::Embedding);
        assert!(matches!(err, Error::Config(msg) if msg.contains("bad key")));
    }

    #[test]
    fn test_service_errors_use_endpoint_variant() {
        let err = to_flatfinder_error(OpenAIErrorCode::ServerError, "boom", Error::Embedding);
        assert!(matches!(err, Error::Embedding(msg) if msg == "Server error: boom"));

        let err = to_flatfinder_error(OpenAIErrorCode::Unknown, "odd", Error::Inference);
        assert!(matches!(err, Error::Inference(msg) if msg == "odd"));
    }
}
