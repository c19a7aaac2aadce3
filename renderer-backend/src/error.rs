//! Error types for renderer-backend

use callback_server::CallbackError;
use renderer_api::ApiError;
use renderer_parser::ParseError;
use thiserror::Error;

/// Result type for renderer-backend operations
pub type Result<T> = std::result::Result<T, BackendError>;

/// Errors that abort session or scheduler construction
///
/// Once a session exists, failures are absorbed and only show up in the
/// next reconciled state.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Device or service description could not be fetched or understood
    #[error("Device description error: {0}")]
    Description(String),

    /// One of AVTransport, RenderingControl or ConnectionManager is absent
    #[error("Renderer lacks mandatory service: {0}")]
    MissingService(String),

    #[error("API error: {0}")]
    Api(ApiError),

    #[error("Callback server error: {0}")]
    CallbackServer(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<ApiError> for BackendError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::MissingService(service) => BackendError::MissingService(service),
            other => BackendError::Api(other),
        }
    }
}

impl From<ParseError> for BackendError {
    fn from(err: ParseError) -> Self {
        BackendError::Description(err.to_string())
    }
}

impl From<CallbackError> for BackendError {
    fn from(err: CallbackError) -> Self {
        BackendError::CallbackServer(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_service_is_lifted() {
        let err: BackendError = ApiError::MissingService("AVTransport".to_string()).into();
        assert!(matches!(err, BackendError::MissingService(ref s) if s == "AVTransport"));

        let err: BackendError = ApiError::ParseError("x".to_string()).into();
        assert!(matches!(err, BackendError::Api(_)));
    }
}
