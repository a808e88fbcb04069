//! Matrix inversion in double-double precision.
//!
//! Gauss-Jordan elimination with partial pivoting. Affine matrices take a
//! shortcut: only the linear part is eliminated, the translation is derived
//! from it and the last row is written exactly.

use nalgebra::DMatrix;
use ref_numeric::DoubleDouble;

use crate::error::{MatrixError, MatrixResult};
use crate::matrix::Matrix;

/// Row-major square work area.
struct Grid {
    size: usize,
    cells: Vec<DoubleDouble>,
}

impl Grid {
    fn from_fn(size: usize, f: impl Fn(usize, usize) -> f64) -> Self {
        let mut cells = Vec::with_capacity(size * size);
        for r in 0..size {
            for c in 0..size {
                cells.push(DoubleDouble::new(f(r, c)));
            }
        }
        Self { size, cells }
    }

    fn identity(size: usize) -> Self {
        Self::from_fn(size, |r, c| if r == c { 1.0 } else { 0.0 })
    }

    fn at(&self, r: usize, c: usize) -> DoubleDouble {
        self.cells[r * self.size + c]
    }

    fn put(&mut self, r: usize, c: usize, value: DoubleDouble) {
        self.cells[r * self.size + c] = value;
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a != b {
            for c in 0..self.size {
                self.cells.swap(a * self.size + c, b * self.size + c);
            }
        }
    }

    /// `row[target] -= factor × row[source]`, skipping zero entries.
    fn eliminate(&mut self, target: usize, source: usize, factor: DoubleDouble) {
        for c in 0..self.size {
            let s = self.at(source, c);
            if !s.is_zero() {
                let v = self.at(target, c) - factor * s;
                self.put(target, c, v);
            }
        }
    }

    fn divide_row(&mut self, r: usize, divisor: DoubleDouble) {
        for c in 0..self.size {
            let v = self.at(r, c);
            if !v.is_zero() {
                self.put(r, c, v / divisor);
            }
        }
    }
}

/// Inverts a square matrix.
pub(crate) fn invert(matrix: &Matrix) -> MatrixResult<Matrix> {
    if !matrix.is_square() {
        return Err(MatrixError::NotSquare {
            rows: matrix.num_rows(),
            cols: matrix.num_cols(),
        });
    }
    let size = matrix.num_rows();
    if matrix.is_affine() {
        invert_affine(matrix, size)
    } else {
        let inverse = gauss_jordan(matrix, size)?;
        Ok(Matrix::from_dmatrix(DMatrix::from_fn(size, size, |r, c| {
            inverse.at(r, c).value()
        })))
    }
}

/// Inverse of `[A t; 0 1]`, which is `[A⁻¹  −A⁻¹t; 0 1]`.
fn invert_affine(matrix: &Matrix, size: usize) -> MatrixResult<Matrix> {
    let dim = size - 1;
    let linear = gauss_jordan(matrix, dim)?;
    let mut result = DMatrix::zeros(size, size);
    for r in 0..dim {
        let mut t = DoubleDouble::ZERO;
        for c in 0..dim {
            let a = linear.at(r, c);
            result[(r, c)] = a.value();
            let b = matrix[(c, dim)];
            if b != 0.0 && !a.is_zero() {
                t += a * DoubleDouble::new(b);
            }
        }
        result[(r, dim)] = (-t).value();
    }
    result[(dim, dim)] = 1.0;
    Ok(Matrix::from_dmatrix(result))
}

/// Inverts the upper-left `size × size` block of `matrix`.
fn gauss_jordan(matrix: &Matrix, size: usize) -> MatrixResult<Grid> {
    let mut work = Grid::from_fn(size, |r, c| matrix[(r, c)]);
    let mut inverse = Grid::identity(size);

    let max_abs = work
        .cells
        .iter()
        .map(|v| v.value().abs())
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    #[allow(clippy::cast_precision_loss)]
    let tolerance = max_abs * size as f64 * f64::EPSILON;

    for k in 0..size {
        let pivot_row = select_pivot(&work, k, tolerance).ok_or(MatrixError::NotInvertible)?;
        work.swap_rows(k, pivot_row);
        inverse.swap_rows(k, pivot_row);

        let pivot = work.at(k, k);
        work.divide_row(k, pivot);
        inverse.divide_row(k, pivot);

        for r in (0..size).filter(|&r| r != k) {
            let factor = work.at(r, k);
            if !factor.is_zero() {
                work.eliminate(r, k, factor);
                inverse.eliminate(r, k, factor);
            }
        }
    }
    Ok(inverse)
}

/// Row with the largest pivot candidate in column `k`, at or below row `k`.
///
/// A `NaN` candidate is accepted only when no finite pivot is large enough,
/// so that undetermined coefficients propagate instead of failing.
fn select_pivot(work: &Grid, k: usize, tolerance: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    let mut nan_row = None;
    for r in k..work.size {
        let v = work.at(r, k).value();
        if v.is_nan() {
            nan_row.get_or_insert(r);
        } else if best.is_none_or(|(_, b)| v.abs() > b) {
            best = Some((r, v.abs()));
        }
    }
    match best {
        Some((r, magnitude)) if magnitude > tolerance => Some(r),
        _ => nan_row,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn inverse_of_diagonal() {
        let m = Matrix::new(2, 2, &[4.0, 0.0, 0.0, 0.5]).unwrap();
        let inv = m.inverse().unwrap();
        assert_eq!(inv, Matrix::new(2, 2, &[0.25, 0.0, 0.0, 2.0]).unwrap());
    }

    #[test]
    fn affine_inverse_has_exact_last_row() {
        let m = Matrix::new(3, 3, &[0.0, 0.5, -90.0, 0.5, 0.0, -180.0, 0.0, 0.0, 1.0]).unwrap();
        let inv = m.inverse().unwrap();
        assert_eq!(
            inv,
            Matrix::new(3, 3, &[0.0, 2.0, 360.0, 2.0, 0.0, 180.0, 0.0, 0.0, 1.0]).unwrap()
        );
        assert!(inv.is_affine());
    }

    #[test]
    fn general_inverse_times_original_is_identity() {
        let m = Matrix::new(3, 3, &[2.0, 1.0, 0.0, 1.0, 3.0, 1.0, 0.0, 1.0, 4.0]).unwrap();
        let product = m.multiply(&m.inverse().unwrap()).unwrap();
        for r in 0..3 {
            for c in 0..3 {
                let expected = if r == c { 1.0 } else { 0.0 };
                assert_relative_eq!(product[(r, c)], expected, epsilon = 1e-15);
            }
        }
    }

    #[test]
    fn pivoting_handles_zero_diagonal() {
        let m = Matrix::new(2, 2, &[0.0, 1.0, 1.0, 0.0]).unwrap();
        assert_eq!(m.inverse().unwrap(), m);
    }

    #[test]
    fn singular_matrix_is_rejected() {
        let m = Matrix::new(2, 2, &[1.0, 2.0, 2.0, 4.0]).unwrap();
        assert_eq!(m.inverse(), Err(MatrixError::NotInvertible));
        let m = Matrix::new(3, 3, &[1.0, 0.0, 5.0, 0.0, 0.0, 6.0, 0.0, 0.0, 1.0]).unwrap();
        assert_eq!(m.inverse(), Err(MatrixError::NotInvertible));
    }

    #[test]
    fn non_square_is_rejected() {
        assert!(matches!(
            Matrix::zeros(2, 3).inverse(),
            Err(MatrixError::NotSquare { rows: 2, cols: 3 })
        ));
    }

    #[test]
    fn nan_coefficient_propagates() {
        let m = Matrix::new(2, 2, &[f64::NAN, 6.0, 0.0, 1.0]).unwrap();
        let inv = m.inverse().unwrap();
        assert!(inv[(0, 0)].is_nan());
        assert_eq!(inv.row(1), Some(vec![0.0, 1.0]));
    }

    #[test]
    fn trivial_sizes() {
        assert_eq!(Matrix::identity(1).inverse().unwrap(), Matrix::identity(1));
        assert_eq!(Matrix::zeros(0, 0).inverse().unwrap(), Matrix::zeros(0, 0));
    }
}
