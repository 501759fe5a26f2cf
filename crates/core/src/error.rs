use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown action: {value}")]
    InvalidAction { value: String },

    #[error("Invalid timestamp: {value}")]
    InvalidTimestamp { value: String },

    #[error("Malformed {kind} payload: {reason}")]
    MalformedPayload { kind: String, reason: String },

    #[error("Port error: {source}")]
    Port { source: anyhow::Error },
}

pub type Result<T> = std::result::Result<T, CoreError>;
