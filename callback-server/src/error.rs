use thiserror::Error;

/// Errors starting the callback server
#[derive(Debug, Error)]
pub enum CallbackError {
    /// Every port of the configured range was taken
    #[error("No available port found in range {start}-{end}")]
    NoAvailablePort { start: u16, end: u16 },
}
