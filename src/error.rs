//! Error types for niyantra

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Niyantra error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Communication timeout
    #[error("Communication timeout")]
    Timeout,

    /// Malformed response from the base controller
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration file parse error
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Wire serialization error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
