//! Common error types for the rarity generator

use thiserror::Error;

/// Common result type for rarity operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the rarity crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input records failed structural validation
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// A trait value was scored against a tally that never counted it.
    /// The tally and the records come from different snapshots.
    #[error("Tally has no count for trait '{trait_type}' with value '{value}'")]
    MissingTally { trait_type: String, value: String },

    /// Token metadata or image lookup failed
    #[error("Fetch error: {0}")]
    Fetch(String),
}
