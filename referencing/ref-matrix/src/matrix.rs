//! Dense matrix of arbitrary size.

use std::fmt;
use std::ops::Index;

use nalgebra::DMatrix;
use ref_numeric::DoubleDouble;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::coefficient::Coefficient;
use crate::error::{MatrixError, MatrixResult};
use crate::solver;

/// A `rows × cols` matrix of `f64`.
///
/// The shape is fixed at construction. `NaN` is a legal element value that
/// means "coefficient not determined" (see [`Coefficient`]). Equality treats
/// two `NaN` elements as equal, so a matrix always equals its clone.
///
/// Affine maps from `n` to `m` dimensions are stored in homogeneous form as
/// `(m+1) × (n+1)` matrices whose last row is `[0, …, 0, 1]`.
///
/// # Example
///
/// ```
/// use ref_matrix::Matrix;
///
/// let m = Matrix::new(3, 3, &[
///     2.0, 0.0, 7.0,
///     0.0, 4.0, 6.0,
///     0.0, 0.0, 1.0,
/// ])?;
/// assert!(m.is_affine());
/// assert_eq!(m.get(1, 2), Some(6.0));
///
/// let inverse = m.inverse()?;
/// assert_eq!(m.multiply(&inverse)?, Matrix::identity(3));
/// # Ok::<(), ref_matrix::MatrixError>(())
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Matrix {
    elements: DMatrix<f64>,
}

impl Matrix {
    /// Creates a matrix from `values` given in row-major order.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::DimensionMismatch`] if `values.len() != rows * cols`.
    pub fn new(rows: usize, cols: usize, values: &[f64]) -> MatrixResult<Self> {
        let expected = rows * cols;
        if values.len() != expected {
            return Err(MatrixError::mismatch("value count", expected, values.len()));
        }
        Ok(Self {
            elements: DMatrix::from_row_slice(rows, cols, values),
        })
    }

    /// Creates a matrix filled with zeros.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            elements: DMatrix::zeros(rows, cols),
        }
    }

    /// Creates a square identity matrix.
    #[must_use]
    pub fn identity(size: usize) -> Self {
        Self::diagonal(size, size)
    }

    /// Creates a matrix with ones on the diagonal and zeros elsewhere.
    ///
    /// For `rows != cols` the diagonal starts at `(0, 0)` and stops at the
    /// smaller dimension.
    #[must_use]
    pub fn diagonal(rows: usize, cols: usize) -> Self {
        Self {
            elements: DMatrix::identity(rows, cols),
        }
    }

    /// Wraps an existing `nalgebra` matrix.
    #[must_use]
    pub const fn from_dmatrix(elements: DMatrix<f64>) -> Self {
        Self { elements }
    }

    /// The underlying `nalgebra` matrix.
    #[must_use]
    pub const fn as_dmatrix(&self) -> &DMatrix<f64> {
        &self.elements
    }

    /// Consumes this matrix, returning the underlying `nalgebra` matrix.
    #[must_use]
    pub fn into_dmatrix(self) -> DMatrix<f64> {
        self.elements
    }

    /// Number of rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.elements.nrows()
    }

    /// Number of columns.
    #[must_use]
    pub fn num_cols(&self) -> usize {
        self.elements.ncols()
    }

    /// Returns `true` if the matrix has as many rows as columns.
    #[must_use]
    pub fn is_square(&self) -> bool {
        self.num_rows() == self.num_cols()
    }

    /// The element at `(row, col)`, or `None` if outside the matrix.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.elements.get((row, col)).copied()
    }

    /// The element at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::ElementOutOfBounds`] if outside the matrix.
    pub fn element(&self, row: usize, col: usize) -> MatrixResult<f64> {
        self.get(row, col).ok_or(self.out_of_bounds(row, col))
    }

    /// The element at `(row, col)` as a tagged [`Coefficient`].
    #[must_use]
    pub fn coefficient(&self, row: usize, col: usize) -> Option<Coefficient> {
        self.get(row, col).map(Coefficient::from)
    }

    /// Sets the element at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::ElementOutOfBounds`] if outside the matrix.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> MatrixResult<()> {
        let err = self.out_of_bounds(row, col);
        let slot = self.elements.get_mut((row, col)).ok_or(err)?;
        *slot = value;
        Ok(())
    }

    fn out_of_bounds(&self, row: usize, col: usize) -> MatrixError {
        MatrixError::ElementOutOfBounds {
            row,
            col,
            rows: self.num_rows(),
            cols: self.num_cols(),
        }
    }

    /// Copies a row into a new vector, or `None` if out of bounds.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<Vec<f64>> {
        (row < self.num_rows()).then(|| self.elements.row(row).iter().copied().collect())
    }

    /// Returns `true` if the last row is `[0, …, 0, 1]`.
    ///
    /// Such a matrix is the homogeneous form of an affine map.
    #[must_use]
    pub fn is_affine(&self) -> bool {
        let rows = self.num_rows();
        let cols = self.num_cols();
        if rows == 0 || cols == 0 {
            return false;
        }
        let last = rows - 1;
        (0..cols).all(|c| {
            let expected = if c + 1 == cols { 1.0 } else { 0.0 };
            self.elements[(last, c)] == expected
        })
    }

    /// Returns `true` if the matrix is square with ones on the diagonal and
    /// zeros elsewhere.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.is_square()
            && self.elements.iter().enumerate().all(|(i, &v)| {
                // Column-major storage.
                let (r, c) = (i % self.num_rows(), i / self.num_rows());
                v == if r == c { 1.0 } else { 0.0 }
            })
    }

    /// Returns `true` if any element is `NaN`.
    #[must_use]
    pub fn has_unconstrained(&self) -> bool {
        self.elements.iter().any(|v| v.is_nan())
    }

    /// The matrix product `self × other`.
    ///
    /// Each element is accumulated in double-double precision and rounded
    /// once. Terms where either factor is exactly zero are skipped, so an
    /// undetermined (`NaN`) coefficient does not leak into elements that do
    /// not depend on it.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::DimensionMismatch`] if
    /// `self.num_cols() != other.num_rows()`.
    pub fn multiply(&self, other: &Self) -> MatrixResult<Self> {
        let inner = self.num_cols();
        if inner != other.num_rows() {
            return Err(MatrixError::mismatch("multiplication", inner, other.num_rows()));
        }
        let mut result = DMatrix::zeros(self.num_rows(), other.num_cols());
        for r in 0..self.num_rows() {
            for c in 0..other.num_cols() {
                let mut sum = DoubleDouble::ZERO;
                for k in 0..inner {
                    let a = self.elements[(r, k)];
                    let b = other.elements[(k, c)];
                    if a != 0.0 && b != 0.0 {
                        sum += DoubleDouble::product(a, b);
                    }
                }
                result[(r, c)] = sum.value();
            }
        }
        Ok(Self { elements: result })
    }

    /// The transposed matrix.
    #[must_use]
    pub fn transpose(&self) -> Self {
        Self {
            elements: self.elements.transpose(),
        }
    }

    /// The determinant, computed by LU decomposition.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::NotSquare`] for non-square matrices.
    pub fn determinant(&self) -> MatrixResult<f64> {
        if !self.is_square() {
            return Err(MatrixError::NotSquare {
                rows: self.num_rows(),
                cols: self.num_cols(),
            });
        }
        Ok(self.elements.determinant())
    }

    /// The inverse matrix, computed in double-double precision.
    ///
    /// For affine matrices the last row of the result is exactly
    /// `[0, …, 0, 1]`.
    ///
    /// # Errors
    ///
    /// - [`MatrixError::NotSquare`] for non-square matrices
    /// - [`MatrixError::NotInvertible`] if the matrix is singular or
    ///   numerically close to singular
    pub fn inverse(&self) -> MatrixResult<Self> {
        solver::invert(self)
    }

    /// A new matrix made of the given rows, in the given order.
    ///
    /// Selecting no rows is legal and gives a `0 × cols` matrix.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::RowOutOfBounds`] for any invalid index.
    pub fn select_rows(&self, rows: &[usize]) -> MatrixResult<Self> {
        if let Some(&index) = rows.iter().find(|&&r| r >= self.num_rows()) {
            return Err(MatrixError::RowOutOfBounds {
                index,
                rows: self.num_rows(),
            });
        }
        Ok(Self {
            elements: self.elements.select_rows(rows.iter()),
        })
    }

    /// A new matrix made of the given columns, in the given order.
    ///
    /// Selecting no columns is legal and gives a `rows × 0` matrix.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::ColumnOutOfBounds`] for any invalid index.
    pub fn select_columns(&self, cols: &[usize]) -> MatrixResult<Self> {
        if let Some(&index) = cols.iter().find(|&&c| c >= self.num_cols()) {
            return Err(MatrixError::ColumnOutOfBounds {
                index,
                cols: self.num_cols(),
            });
        }
        Ok(Self {
            elements: self.elements.select_columns(cols.iter()),
        })
    }

    /// A new matrix made of the given rows and columns.
    ///
    /// # Errors
    ///
    /// Returns an out-of-bounds error for any invalid index.
    pub fn submatrix(&self, rows: &[usize], cols: &[usize]) -> MatrixResult<Self> {
        self.select_rows(rows)?.select_columns(cols)
    }

    /// A new matrix without the given columns. Indices not in the matrix
    /// are ignored.
    #[must_use]
    pub fn remove_columns(&self, removed: &[usize]) -> Self {
        let kept: Vec<usize> = (0..self.num_cols())
            .filter(|c| !removed.contains(c))
            .collect();
        Self {
            elements: self.elements.select_columns(kept.iter()),
        }
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.elements.shape() == other.elements.shape()
            && self
                .elements
                .iter()
                .zip(other.elements.iter())
                .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()))
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.elements[index]
    }
}

impl From<DMatrix<f64>> for Matrix {
    fn from(elements: DMatrix<f64>) -> Self {
        Self { elements }
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.num_rows() {
            write!(f, "[")?;
            for c in 0..self.num_cols() {
                if c > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self.elements[(r, c)])?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}
