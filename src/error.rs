//! Error types for Handburst

use thiserror::Error;

/// Main error type for Handburst
#[derive(Error, Debug)]
pub enum HandburstError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Tracking error: {0}")]
    Tracking(#[from] TrackingError),

    #[error("Web server error: {0}")]
    Web(#[from] WebError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration value: {field} - {message}")]
    InvalidValue { field: String, message: String },
}

/// Hand tracker feed errors
#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("Hand receiver error: {0}")]
    Receiver(String),

    #[error("Hand packet parse error: {0}")]
    Parse(String),

    #[error("Hand tracker subprocess error: {0}")]
    Subprocess(String),
}

/// Web server errors
#[derive(Error, Debug)]
pub enum WebError {
    #[error("Failed to bind to address: {0}")]
    Bind(String),

    #[error("Server error: {0}")]
    Serve(String),
}

/// Result type alias for Handburst operations
pub type Result<T> = std::result::Result<T, HandburstError>;
