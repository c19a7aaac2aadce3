//! Error types for the SOAP client

use thiserror::Error;

/// Errors that can occur during SOAP or GENA communication
#[derive(Debug, Error)]
pub enum SoapError {
    /// Network or HTTP communication error (connection, timeout, HTTP status)
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    Parse(String),

    /// SOAP fault returned by the device
    #[error("SOAP fault {code}: {description}")]
    Fault {
        /// UPnP error code (500 when the device omitted one)
        code: u16,
        /// `errorDescription` or `faultstring` text
        description: String,
    },
}

impl SoapError {
    /// Whether the request never reached a SOAP-speaking endpoint
    pub fn is_transport(&self) -> bool {
        matches!(self, SoapError::Network(_))
    }
}
