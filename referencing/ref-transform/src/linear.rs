//! Affine transforms backed by a homogeneous matrix.

use ref_matrix::{Matrix, MatrixError};
use ref_numeric::DoubleDouble;

use crate::error::{TransformError, TransformResult};

/// An affine map from `n` to `m` dimensions stored as an `(m+1) × (n+1)`
/// matrix whose last row is `[0, …, 0, 1]`.
///
/// Coefficients may be `NaN` when the dependency of an output on an input
/// is not determined.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearTransform {
    matrix: Matrix,
}

impl LinearTransform {
    /// Wraps a homogeneous matrix.
    ///
    /// # Errors
    ///
    /// - [`MatrixError::NotAffine`] if the last row is not `[0, …, 0, 1]`
    /// - [`TransformError::IllegalArgument`] if the matrix has no source
    ///   dimension (a single column)
    pub fn new(matrix: Matrix) -> TransformResult<Self> {
        if !matrix.is_affine() {
            return Err(MatrixError::NotAffine.into());
        }
        if matrix.num_cols() < 2 {
            return Err(TransformError::IllegalArgument(
                "matrix must have at least one source dimension".to_string(),
            ));
        }
        Ok(Self { matrix })
    }

    /// The homogeneous matrix.
    #[must_use]
    pub const fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Number of input dimensions.
    #[must_use]
    pub fn source_dimensions(&self) -> usize {
        self.matrix.num_cols() - 1
    }

    /// Number of output dimensions.
    #[must_use]
    pub fn target_dimensions(&self) -> usize {
        self.matrix.num_rows() - 1
    }

    /// Returns `true` if this is the identity map.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.matrix.is_identity()
    }

    /// Multiplies the matrix by `(point, 1)`, accumulating each output in
    /// double-double precision.
    #[must_use]
    pub(crate) fn apply(&self, point: &[f64]) -> Vec<f64> {
        let n = self.source_dimensions();
        (0..self.target_dimensions())
            .map(|r| {
                let mut sum = DoubleDouble::new(self.matrix[(r, n)]);
                for (c, &x) in point.iter().enumerate().take(n) {
                    let a = self.matrix[(r, c)];
                    if a != 0.0 {
                        sum += DoubleDouble::product(a, x);
                    }
                }
                sum.value()
            })
            .collect()
    }

    /// The Jacobian: the matrix without its homogeneous row and column.
    pub(crate) fn jacobian(&self) -> TransformResult<Matrix> {
        let rows: Vec<usize> = (0..self.target_dimensions()).collect();
        let cols: Vec<usize> = (0..self.source_dimensions()).collect();
        Ok(self.matrix.submatrix(&rows, &cols)?)
    }

    /// The inverse map.
    ///
    /// # Errors
    ///
    /// - [`TransformError::NoninvertibleTransform`] if the numbers of source
    ///   and target dimensions differ
    /// - [`MatrixError::NotInvertible`] if the matrix is singular
    pub fn inverse(&self) -> TransformResult<Self> {
        if !self.matrix.is_square() {
            return Err(TransformError::NoninvertibleTransform(format!(
                "affine map from {} to {} dimensions",
                self.source_dimensions(),
                self.target_dimensions()
            )));
        }
        Ok(Self {
            matrix: self.matrix.inverse()?,
        })
    }
}
