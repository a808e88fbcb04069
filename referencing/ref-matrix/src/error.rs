//! Error types for matrix operations.

use thiserror::Error;

/// Result type for matrix operations.
pub type MatrixResult<T> = Result<T, MatrixError>;

/// Errors that can occur when building or combining matrices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    /// Sizes of the operands do not agree.
    #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// What was being sized (e.g. "value count", "multiplication").
        context: &'static str,
        /// Expected size.
        expected: usize,
        /// Actual size.
        actual: usize,
    },

    /// An element index is outside the matrix.
    #[error("element ({row}, {col}) is outside a {rows}×{cols} matrix")]
    ElementOutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },

    /// A selected row index is outside the matrix.
    #[error("row {index} is out of bounds for a matrix of {rows} rows")]
    RowOutOfBounds {
        /// Requested row.
        index: usize,
        /// Number of rows.
        rows: usize,
    },

    /// A selected column index is outside the matrix.
    #[error("column {index} is out of bounds for a matrix of {cols} columns")]
    ColumnOutOfBounds {
        /// Requested column.
        index: usize,
        /// Number of columns.
        cols: usize,
    },

    /// The operation requires a square matrix.
    #[error("matrix is not square: {rows}×{cols}")]
    NotSquare {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },

    /// The operation requires the homogeneous form of an affine map.
    #[error("matrix is not affine: last row must be [0, …, 0, 1]")]
    NotAffine,

    /// The matrix is singular or numerically close to singular.
    #[error("matrix is not invertible")]
    NotInvertible,
}

impl MatrixError {
    /// Creates a dimension mismatch error.
    #[must_use]
    pub const fn mismatch(context: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            actual,
        }
    }

    /// Returns `true` if this error depends on the numeric values of the
    /// matrix rather than on its shape or on the indices given by the caller.
    #[must_use]
    pub const fn is_numerical(&self) -> bool {
        matches!(self, Self::NotInvertible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = MatrixError::mismatch("value count", 12, 11);
        let msg = format!("{err}");
        assert!(msg.contains("value count"));
        assert!(msg.contains("12"));
        assert!(msg.contains("11"));
    }

    #[test]
    fn element_out_of_bounds_display() {
        let err = MatrixError::ElementOutOfBounds {
            row: 5,
            col: 1,
            rows: 3,
            cols: 3,
        };
        assert!(format!("{err}").contains("(5, 1)"));
    }

    #[test]
    fn only_singularity_is_numerical() {
        assert!(MatrixError::NotInvertible.is_numerical());
        assert!(!MatrixError::NotSquare { rows: 2, cols: 3 }.is_numerical());
        assert!(!MatrixError::RowOutOfBounds { index: 4, rows: 2 }.is_numerical());
    }
}
