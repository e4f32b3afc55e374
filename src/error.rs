//! Error types for the load boundary.
//!
//! Everything else in the simulation resolves misses to defaults or silent
//! no-ops; only a corrupt or missing save record is fatal.

use thiserror::Error;

/// Errors raised while turning a save record into a live arena.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The record could not be parsed at all
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The record parsed but describes an impossible world
    #[error("Validation error: {0}")]
    Validation(String),

    /// A catalog override could not be applied
    #[error("Catalog error: {0}")]
    Catalog(String),
}

/// Result type alias for load operations.
pub type Result<T> = std::result::Result<T, LoadError>;
