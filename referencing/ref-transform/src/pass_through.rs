//! Transforms that affect a contiguous range of dimensions only.

use ref_matrix::Matrix;

use crate::error::TransformResult;
use crate::transform::MathTransform;

/// Applies a sub-transform to a slice of the coordinates and copies the
/// others unchanged.
///
/// Dimensions `[0, first_affected_ordinate)` and the last
/// `num_trailing_ordinates` pass through. The slice in between is replaced
/// by the output of the sub-transform, whose length may differ from its
/// input length.
#[derive(Debug, Clone)]
pub struct PassThroughTransform {
    first_affected_ordinate: usize,
    sub_transform: MathTransform,
    num_trailing_ordinates: usize,
}

impl PassThroughTransform {
    /// Wraps `sub_transform` between `first_affected_ordinate` leading and
    /// `num_trailing_ordinates` trailing pass-through dimensions.
    #[must_use]
    pub const fn new(
        first_affected_ordinate: usize,
        sub_transform: MathTransform,
        num_trailing_ordinates: usize,
    ) -> Self {
        Self {
            first_affected_ordinate,
            sub_transform,
            num_trailing_ordinates,
        }
    }

    /// Index of the first dimension given to the sub-transform.
    #[must_use]
    pub const fn first_affected_ordinate(&self) -> usize {
        self.first_affected_ordinate
    }

    /// The wrapped transform.
    #[must_use]
    pub const fn sub_transform(&self) -> &MathTransform {
        &self.sub_transform
    }

    /// Number of trailing dimensions that pass through.
    #[must_use]
    pub const fn num_trailing_ordinates(&self) -> usize {
        self.num_trailing_ordinates
    }

    /// Number of input dimensions.
    #[must_use]
    pub fn source_dimensions(&self) -> usize {
        self.first_affected_ordinate
            + self.sub_transform.source_dimensions()
            + self.num_trailing_ordinates
    }

    /// Number of output dimensions.
    #[must_use]
    pub fn target_dimensions(&self) -> usize {
        self.first_affected_ordinate
            + self.sub_transform.target_dimensions()
            + self.num_trailing_ordinates
    }

    /// Evaluates the sub-transform on the affected slice.
    ///
    /// The Jacobian is block diagonal: identity for the pass-through
    /// dimensions, the sub-transform Jacobian for the affected block. A
    /// sub-transform whose outputs also depend on a pass-through coordinate
    /// (for example a horizontal projection whose derivative varies with an
    /// ellipsoidal height carried in the trailing dimensions) is not
    /// expressible with this node and must be built as a concatenation.
    pub(crate) fn evaluate(
        &self,
        point: &[f64],
        derivative: bool,
    ) -> TransformResult<(Vec<f64>, Option<Matrix>)> {
        let k = self.first_affected_ordinate;
        let ns = self.sub_transform.source_dimensions();
        let nt = self.sub_transform.target_dimensions();

        let (inner, sub_jacobian) = self
            .sub_transform
            .evaluate(&point[k..k + ns], derivative)?;
        let mut out = Vec::with_capacity(self.target_dimensions());
        out.extend_from_slice(&point[..k]);
        out.extend(inner);
        out.extend_from_slice(&point[k + ns..]);

        let jacobian = match sub_jacobian {
            Some(sub) => {
                let mut j = Matrix::zeros(self.target_dimensions(), self.source_dimensions());
                for i in 0..k {
                    j.set(i, i, 1.0)?;
                }
                for r in 0..nt {
                    for c in 0..ns {
                        j.set(k + r, k + c, sub[(r, c)])?;
                    }
                }
                for i in 0..self.num_trailing_ordinates {
                    j.set(k + nt + i, k + ns + i, 1.0)?;
                }
                Some(j)
            }
            None => None,
        };
        Ok((out, jacobian))
    }

    /// The same wrapper around the inverse of the sub-transform.
    pub(crate) fn inverse(&self) -> TransformResult<Self> {
        Ok(Self::new(
            self.first_affected_ordinate,
            self.sub_transform.inverse()?,
            self.num_trailing_ordinates,
        ))
    }
}
