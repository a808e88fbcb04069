//! Error types for transform construction, evaluation and separation.

use ref_matrix::MatrixError;
use thiserror::Error;

/// Result type for transform operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Errors that can occur when building, evaluating or separating transforms.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// Dimensions of the operands do not agree.
    #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// What was being sized (e.g. "concatenation", "point").
        context: &'static str,
        /// Expected number of dimensions.
        expected: usize,
        /// Actual number of dimensions.
        actual: usize,
    },

    /// An argument is invalid. The message names the offending argument.
    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    /// The operation is not allowed in the current state.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// The requested outputs cannot be computed from the requested inputs.
    #[error("cannot separate transform: {0}")]
    CannotSeparate(String),

    /// The transform has no inverse.
    #[error("transform is not invertible: {0}")]
    NoninvertibleTransform(String),

    /// An iterative computation did not converge.
    #[error("no convergence after {iterations} iterations")]
    NoConvergence {
        /// Number of iterations attempted.
        iterations: usize,
    },

    /// A matrix operation failed.
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

/// Coarse classification of a [`TransformError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller bug: bad index, wrong length, wrong call order.
    Precondition,
    /// Property of the transform: the request cannot be satisfied.
    Infeasible,
    /// Depends on numeric values: singular matrices, divergence.
    Numerical,
}

impl TransformError {
    /// Creates a dimension mismatch error.
    #[must_use]
    pub const fn mismatch(context: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            actual,
        }
    }

    /// Returns the class of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::DimensionMismatch { .. } | Self::IllegalArgument(_) | Self::IllegalState(_) => {
                ErrorKind::Precondition
            }
            Self::CannotSeparate(_) | Self::NoninvertibleTransform(_) => ErrorKind::Infeasible,
            Self::NoConvergence { .. } => ErrorKind::Numerical,
            Self::Matrix(e) => {
                if e.is_numerical() {
                    ErrorKind::Numerical
                } else {
                    ErrorKind::Precondition
                }
            }
        }
    }
}
