//! Error types for the index engine.

use thiserror::Error;

/// Errors the evaluator and retrieval pipeline can surface.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    /// An operator popped an empty operand stack, or the expression did
    /// not reduce to exactly one operand.
    #[error("malformed expression: {0}")]
    MalformedExpression(String),

    /// A tuple leaf in multi-dimensional rule mode had a different
    /// number of components than there are dimensional rule tables.
    #[error("tuple arity mismatch: expected {expected} components, found {found}")]
    ArityMismatch {
        /// Number of dimensional rule tables installed.
        expected: usize,
        /// Number of components parsed from the tuple leaf.
        found: usize,
    },

    /// A weight supplied at ingress was negative, NaN, or infinite.
    #[error("invalid weight: {0}")]
    InvalidWeight(f64),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, IndexError>;
