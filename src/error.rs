//! Error types shared by every public graph operation

use thiserror::Error;

/// Errors that can occur during graph operations
///
/// Every public operation either returns a value or fails with exactly
/// one of these; partial results are never returned and persistent
/// state is left unchanged on failure.
#[derive(Error, Debug)]
pub enum GraphError {
    /// Unknown vertex or edge property name
    #[error("property '{0}' not found")]
    NotFound(String),

    /// Property exists but with the wrong element type
    #[error("property '{name}' has type {actual}, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Operation called with arguments it is not defined for
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Statistic is undefined on this input (zero variance, no triples)
    #[error("degenerate input: {0}")]
    Degenerate(String),

    /// Configurational-model generation could not complete
    #[error("generation failed: {0}")]
    GenerationFailure(String),

    /// File I/O error
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error while reading or writing graph files
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Cooperative cancellation was requested mid-call
    #[error("operation aborted")]
    Aborted,
}

pub type GraphResult<T> = Result<T, GraphError>;
