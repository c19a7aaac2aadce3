use thiserror::Error;

/// Errors converting renderer strings into player state values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("Unknown play mode: {0}")]
    UnknownPlayMode(String),

    #[error("Unknown transport state: {0}")]
    UnknownTransportState(String),
}

pub type Result<T> = std::result::Result<T, StateError>;
