//! Error types for the math library

use thiserror::Error;

/// Math errors
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MathError {
    /// A zero-length vector was normalized
    #[error("cannot normalize a zero-length vector")]
    DegenerateVector,
}

/// Result type for fallible math operations
pub type Result<T> = std::result::Result<T, MathError>;
