use renderer_parser::ParseError;
use soap_client::SoapError;
use thiserror::Error;

/// High-level API errors for renderer operations
///
/// Abstracts the SOAP transport details into the three failure classes a
/// caller acts on: the device could not be reached, it answered with a
/// fault, or it answered with something unreadable.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network communication error
    ///
    /// Connection refused, timeout, DNS failure or an HTTP error status
    /// without a SOAP body.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Response parsing error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// SOAP fault returned by device
    #[error("SOAP fault {code}: {description}")]
    SoapFault { code: u16, description: String },

    /// Subscription operation failed
    ///
    /// Covers subscribe, renewal and unsubscribe failures as well as use of
    /// an expired subscription.
    #[error("Subscription error: {0}")]
    SubscriptionError(String),

    /// The device does not expose a required service
    #[error("Missing service: {0}")]
    MissingService(String),
}

impl ApiError {
    /// Create a subscription expired error (used by subscription management)
    pub fn subscription_expired() -> Self {
        Self::SubscriptionError("Subscription expired".to_string())
    }

    /// Whether the request never reached the device
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::NetworkError(_))
    }
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

impl From<SoapError> for ApiError {
    fn from(error: SoapError) -> Self {
        match error {
            SoapError::Network(msg) => ApiError::NetworkError(msg),
            SoapError::Parse(msg) => ApiError::ParseError(msg),
            SoapError::Fault { code, description } => ApiError::SoapFault { code, description },
        }
    }
}

impl From<ParseError> for ApiError {
    fn from(error: ParseError) -> Self {
        ApiError::ParseError(error.to_string())
    }
}
