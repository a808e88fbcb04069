//! Uniform-scale enforcement for affine matrices.

use ref_numeric::{DoubleDouble, magnitude};

use crate::error::{MatrixError, MatrixResult};
use crate::matrix::Matrix;

impl Matrix {
    /// Rescales the rows of an affine matrix so that every output axis has
    /// the same scale magnitude, keeping `anchor` fixed.
    ///
    /// The scale magnitude of an output axis is the Euclidean norm of its
    /// row in the linear part. The common magnitude is interpolated between
    /// the smallest and the largest of them: `selector = 0` picks the
    /// smallest, `selector = 1` the largest. Rows with a zero magnitude are
    /// left untouched. `anchor` is a point in target coordinates; the source
    /// point that mapped to it still maps to it afterwards.
    ///
    /// Returns `true` if any element was modified.
    ///
    /// # Errors
    ///
    /// - [`MatrixError::NotAffine`] if the last row is not `[0, …, 0, 1]`
    /// - [`MatrixError::DimensionMismatch`] if `anchor` does not have one
    ///   coordinate per output axis
    ///
    /// # Example
    ///
    /// ```
    /// use ref_matrix::Matrix;
    ///
    /// let mut m = Matrix::new(3, 3, &[
    ///     2.0, 0.0, 10.0,
    ///     0.0, 4.0, 20.0,
    ///     0.0, 0.0, 1.0,
    /// ])?;
    /// assert!(m.force_uniform_scale(1.0, &[10.0, 20.0])?);
    /// assert_eq!(m.get(0, 0), Some(4.0));
    /// assert_eq!(m.get(0, 2), Some(10.0));
    /// # Ok::<(), ref_matrix::MatrixError>(())
    /// ```
    pub fn force_uniform_scale(&mut self, selector: f64, anchor: &[f64]) -> MatrixResult<bool> {
        if !self.is_affine() {
            return Err(MatrixError::NotAffine);
        }
        let axes = self.num_rows() - 1;
        let translation = self.num_cols() - 1;
        if anchor.len() != axes {
            return Err(MatrixError::mismatch("anchor", axes, anchor.len()));
        }

        let magnitudes: Vec<f64> = (0..axes)
            .map(|r| {
                let row: Vec<f64> = (0..translation).map(|c| self[(r, c)]).collect();
                magnitude(&row)
            })
            .collect();
        let nonzero = magnitudes.iter().copied().filter(|&m| m > 0.0);
        let Some((min, max)) = nonzero.fold(None, |acc: Option<(f64, f64)>, m| match acc {
            None => Some((m, m)),
            Some((lo, hi)) => Some((lo.min(m), hi.max(m))),
        }) else {
            return Ok(false);
        };
        let selector = selector.clamp(0.0, 1.0);
        let scale = (1.0 - selector).mul_add(min, selector * max);

        let mut changed = false;
        for (r, &mag) in magnitudes.iter().enumerate() {
            if mag == 0.0 || mag == scale {
                continue;
            }
            let rescale = DoubleDouble::new(scale) / DoubleDouble::new(mag);
            for c in 0..translation {
                let v = (DoubleDouble::new(self[(r, c)]) * rescale).value();
                self.set(r, c, v)?;
            }
            let a = DoubleDouble::new(anchor[r]);
            let t = (DoubleDouble::new(self[(r, translation)]) - a) * rescale + a;
            self.set(r, translation, t.value())?;
            changed = true;
        }
        Ok(changed)
    }
}
