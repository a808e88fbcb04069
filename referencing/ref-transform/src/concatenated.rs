//! Sequential composition of two transforms.

use ref_matrix::Matrix;

use crate::error::{TransformError, TransformResult};
use crate::transform::MathTransform;

/// `second ∘ first`: applies `first`, then `second`.
///
/// This is the raw node. Linear folding and identity elision are done by
/// [`TransformFactory`](crate::TransformFactory) before a node is built.
#[derive(Debug, Clone)]
pub struct ConcatenatedTransform {
    first: MathTransform,
    second: MathTransform,
}

impl ConcatenatedTransform {
    /// Creates the composition `second ∘ first`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::DimensionMismatch`] unless
    /// `first.target_dimensions() == second.source_dimensions()`.
    pub fn new(first: MathTransform, second: MathTransform) -> TransformResult<Self> {
        if first.target_dimensions() != second.source_dimensions() {
            return Err(TransformError::mismatch(
                "concatenation",
                first.target_dimensions(),
                second.source_dimensions(),
            ));
        }
        Ok(Self { first, second })
    }

    /// The transform applied first.
    #[must_use]
    pub const fn first(&self) -> &MathTransform {
        &self.first
    }

    /// The transform applied second.
    #[must_use]
    pub const fn second(&self) -> &MathTransform {
        &self.second
    }

    /// Number of input dimensions.
    #[must_use]
    pub fn source_dimensions(&self) -> usize {
        self.first.source_dimensions()
    }

    /// Number of output dimensions.
    #[must_use]
    pub fn target_dimensions(&self) -> usize {
        self.second.target_dimensions()
    }

    /// Evaluates both steps; with `derivative`, applies the chain rule
    /// `J = J_second(first(x)) × J_first(x)`.
    pub(crate) fn evaluate(
        &self,
        point: &[f64],
        derivative: bool,
    ) -> TransformResult<(Vec<f64>, Option<Matrix>)> {
        let (middle, d1) = self.first.evaluate(point, derivative)?;
        let (out, d2) = self.second.evaluate(&middle, derivative)?;
        let jacobian = match (d2, d1) {
            (Some(j2), Some(j1)) => Some(j2.multiply(&j1)?),
            _ => None,
        };
        Ok((out, jacobian))
    }

    /// `first⁻¹ ∘ second⁻¹`.
    pub(crate) fn inverse(&self) -> TransformResult<Self> {
        Self::new(self.second.inverse()?, self.first.inverse()?)
    }
}
