//! Error types for franchise-scout

use thiserror::Error;

/// Main error type for franchise-scout operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Address not found: {0}")]
    AddressNotFound(String),

    #[error("No location selected")]
    NoLocation,

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid radius: {0}")]
    InvalidRadius(String),

    #[error("Unknown persona: {0}")]
    UnknownPersona(String),

    #[error("Feature query failed: {0}")]
    FeatureQuery(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Geo error: {0}")]
    Geo(String),
}

/// Result type alias for franchise-scout operations
pub type Result<T> = std::result::Result<T, Error>;
