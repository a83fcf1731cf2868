//! Error types for the association engine.
//!
//! Every failure is raised synchronously at the point of detection. Nothing
//! is retried inside the core — retries, if wanted, belong to the calling
//! layer (HTTP glue re-prompting the user, for instance). A failed query
//! leaves the [`crate::ConnectionBlock`] canonical state untouched.

/// Why a query vector was rejected.
///
/// The two causes are kept distinguishable so callers can report which rule
/// the input broke.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum InvalidQueryCause {
    /// The vector's length does not match the block's term count.
    #[error("query length must equal the number of terms: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A slot holds something other than exactly 0 or 1.
    #[error("query slot {index} must contain 0 or 1, got {value}")]
    NonBinary { index: usize, value: f64 },
}

/// Errors returned by block construction, composition, and queries.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AcornError {
    /// The input table is not a rectangular, non-empty 2-D numeric array.
    #[error("invalid input table: {0}")]
    Dimension(String),

    /// The query vector failed validation.
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] InvalidQueryCause),

    /// The leak-resistance scalar is outside [0, 1].
    #[error("norm_by must be within [0, 1], got {0}")]
    InvalidParameter(f64),

    /// A required `I - X` inversion is undefined. The backend's exact solve
    /// failed; there is deliberately no pseudo-inverse fallback, because
    /// that would change the circuit model's semantics.
    #[error("singular matrix: inversion of ({0}) is undefined")]
    SingularMatrix(&'static str),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AcornError>;
