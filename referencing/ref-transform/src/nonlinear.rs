//! Extension point for transforms that are not affine.

use std::fmt;
use std::sync::Arc;

use ref_matrix::Matrix;

use crate::error::TransformResult;

/// A user-supplied transform evaluated point by point.
///
/// Implementations are opaque to the separator: they can be kept whole or
/// dropped, never split. They must be immutable after construction, since
/// a single instance may be evaluated concurrently from many threads.
///
/// The caller guarantees that `point.len() == self.source_dimensions()`.
pub trait NonLinearTransform: fmt::Debug + Send + Sync {
    /// Short human-readable name, used in descriptors and error messages.
    fn name(&self) -> &str;

    /// Number of input dimensions. Must be at least 1.
    fn source_dimensions(&self) -> usize;

    /// Number of output dimensions.
    fn target_dimensions(&self) -> usize;

    /// Transforms one point and, if `derivative` is `true`, also returns
    /// the Jacobian at that point.
    ///
    /// The Jacobian has `target_dimensions()` rows and `source_dimensions()`
    /// columns; element `(j, i)` is `∂output[j] / ∂input[i]`.
    ///
    /// # Errors
    ///
    /// Implementation specific, e.g. an iteration that does not converge.
    fn transform(&self, point: &[f64], derivative: bool)
    -> TransformResult<(Vec<f64>, Option<Matrix>)>;

    /// The inverse transform, if the implementation provides one.
    fn inverse(&self) -> Option<Arc<dyn NonLinearTransform>> {
        None
    }
}
