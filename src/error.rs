//! Error types for the Agora engine.
//!
//! All fallible operations in this crate return [`Result`], whose error type
//! is the [`AgoraError`] enum below.
//!
//! # Examples
//!
//! ```
//! use agora::error::{AgoraError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(AgoraError::invalid_request("limit must be between 1 and 100"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Agora operations.
///
/// Uses the `thiserror` crate for automatic `Error` trait implementation and
/// provides convenient constructor methods for the common cases.
#[derive(Error, Debug)]
pub enum AgoraError {
    /// I/O errors (catalog files, lexicon files, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Text analysis errors (tokenization, stemming)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Query understanding pipeline errors
    #[error("Understanding error: {0}")]
    Understanding(String),

    /// Index gateway (backend search) errors
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Request validation errors, rejected before the pipeline runs
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with AgoraError.
pub type Result<T> = std::result::Result<T, AgoraError>;

impl AgoraError {
    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        AgoraError::Analysis(msg.into())
    }

    /// Create a new understanding error.
    pub fn understanding<S: Into<String>>(msg: S) -> Self {
        AgoraError::Understanding(msg.into())
    }

    /// Create a new gateway error.
    pub fn gateway<S: Into<String>>(msg: S) -> Self {
        AgoraError::Gateway(msg.into())
    }

    /// Create a new invalid request error.
    pub fn invalid_request<S: Into<String>>(msg: S) -> Self {
        AgoraError::InvalidRequest(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        AgoraError::InvalidConfig(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        AgoraError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = AgoraError::analysis("Test analysis error");
        assert_eq!(error.to_string(), "Analysis error: Test analysis error");

        let error = AgoraError::gateway("Test gateway error");
        assert_eq!(error.to_string(), "Gateway error: Test gateway error");

        let error = AgoraError::invalid_request("page must be >= 1");
        assert_eq!(error.to_string(), "Invalid request: page must be >= 1");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let agora_error = AgoraError::from(io_error);

        match agora_error {
            AgoraError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }
}
