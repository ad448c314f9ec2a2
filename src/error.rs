//! Error types for Synheart Fit
//!
//! The derivation engine itself never fails; these errors only surface at the
//! JSON boundary (pipeline, FFI, CLI).

use thiserror::Error;

/// Errors that can occur while reading decoder output or encoding reports
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse decoder output: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
