//! Error types for the voxcube engine

use thiserror::Error;

/// Main error type for the engine
#[derive(Debug, Error)]
pub enum Error {
    /// Voxel data does not fit the requested dimensions, or two operands
    /// do not share the same X/Y footprint
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Operand kind is not allowed for the requested operation
    #[error("Invalid operand: {0}")]
    InvalidOperand(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Malformed layer file
    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Pipeline description error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the engine
pub type Result<T> = std::result::Result<T, Error>;
