//! The closed set of transform variants.

use std::sync::Arc;

use ref_matrix::Matrix;

use crate::concatenated::ConcatenatedTransform;
use crate::descriptor::TransformDescriptor;
use crate::error::{TransformError, TransformResult};
use crate::factory::{DefaultFactory, TransformFactory};
use crate::linear::LinearTransform;
use crate::nonlinear::NonLinearTransform;
use crate::pass_through::PassThroughTransform;

/// A function from `source_dimensions()` to `target_dimensions()`
/// coordinates.
///
/// Nodes are immutable and shared through [`Arc`], so cloning is cheap and
/// the same leaf may appear under several parents. Use
/// [`ptr_eq`](Self::ptr_eq) to test whether two handles are the same node.
///
/// # Example
///
/// ```
/// use ref_matrix::Matrix;
/// use ref_transform::MathTransform;
///
/// let scale = MathTransform::linear(Matrix::new(3, 3, &[
///     2.0, 0.0, 1.0,
///     0.0, 3.0, 0.0,
///     0.0, 0.0, 1.0,
/// ])?)?;
/// assert_eq!(scale.transform(&[1.0, 1.0])?, vec![3.0, 3.0]);
///
/// let back = scale.inverse()?;
/// assert_eq!(back.transform(&[3.0, 3.0])?, vec![1.0, 1.0]);
/// # Ok::<(), ref_transform::TransformError>(())
/// ```
#[derive(Debug, Clone)]
pub enum MathTransform {
    /// Affine map backed by a homogeneous matrix.
    Linear(Arc<LinearTransform>),
    /// Sequential composition of two transforms.
    Concatenated(Arc<ConcatenatedTransform>),
    /// Sub-transform applied to a contiguous range of dimensions.
    PassThrough(Arc<PassThroughTransform>),
    /// Opaque user-supplied transform.
    NonLinear(Arc<dyn NonLinearTransform>),
}

impl MathTransform {
    /// Creates an affine transform from a homogeneous matrix.
    ///
    /// # Errors
    ///
    /// See [`LinearTransform::new`].
    pub fn linear(matrix: Matrix) -> TransformResult<Self> {
        Ok(Self::Linear(Arc::new(LinearTransform::new(matrix)?)))
    }

    /// The identity transform in `dimension` dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::IllegalArgument`] if `dimension` is 0.
    pub fn identity(dimension: usize) -> TransformResult<Self> {
        Self::linear(Matrix::identity(dimension + 1))
    }

    /// Wraps a user-supplied transform.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::IllegalArgument`] if the transform declares
    /// no source dimension.
    pub fn non_linear(transform: Arc<dyn NonLinearTransform>) -> TransformResult<Self> {
        if transform.source_dimensions() == 0 {
            return Err(TransformError::IllegalArgument(format!(
                "\"{}\" must have at least one source dimension",
                transform.name()
            )));
        }
        Ok(Self::NonLinear(transform))
    }

    /// `second ∘ first`, built by the [`DefaultFactory`].
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::DimensionMismatch`] unless
    /// `first.target_dimensions() == second.source_dimensions()`.
    pub fn concatenate(first: &Self, second: &Self) -> TransformResult<Self> {
        DefaultFactory::default().create_concatenated(first, second)
    }

    /// A pass-through wrapper, built by the [`DefaultFactory`].
    ///
    /// # Errors
    ///
    /// Propagates errors from expanding a linear sub-transform.
    pub fn pass_through(
        first_affected_ordinate: usize,
        sub_transform: &Self,
        num_trailing_ordinates: usize,
    ) -> TransformResult<Self> {
        DefaultFactory::default().create_pass_through(
            first_affected_ordinate,
            sub_transform,
            num_trailing_ordinates,
        )
    }

    /// Number of input dimensions.
    #[must_use]
    pub fn source_dimensions(&self) -> usize {
        match self {
            Self::Linear(t) => t.source_dimensions(),
            Self::Concatenated(t) => t.source_dimensions(),
            Self::PassThrough(t) => t.source_dimensions(),
            Self::NonLinear(t) => t.source_dimensions(),
        }
    }

    /// Number of output dimensions.
    #[must_use]
    pub fn target_dimensions(&self) -> usize {
        match self {
            Self::Linear(t) => t.target_dimensions(),
            Self::Concatenated(t) => t.target_dimensions(),
            Self::PassThrough(t) => t.target_dimensions(),
            Self::NonLinear(t) => t.target_dimensions(),
        }
    }

    /// Returns `true` if both handles point to the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Linear(a), Self::Linear(b)) => Arc::ptr_eq(a, b),
            (Self::Concatenated(a), Self::Concatenated(b)) => Arc::ptr_eq(a, b),
            (Self::PassThrough(a), Self::PassThrough(b)) => Arc::ptr_eq(a, b),
            (Self::NonLinear(a), Self::NonLinear(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }

    /// Returns `true` for a linear transform whose matrix is the identity.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Linear(t) if t.is_identity())
    }

    /// The homogeneous matrix of a linear transform.
    #[must_use]
    pub fn matrix(&self) -> Option<&Matrix> {
        match self {
            Self::Linear(t) => Some(t.matrix()),
            _ => None,
        }
    }

    /// The flattened sequence of steps: the leaves of nested
    /// concatenations in evaluation order, or `[self]` for other variants.
    #[must_use]
    pub fn steps(&self) -> Vec<Self> {
        let mut steps = Vec::new();
        self.collect_steps(&mut steps);
        steps
    }

    fn collect_steps(&self, steps: &mut Vec<Self>) {
        if let Self::Concatenated(c) = self {
            c.first().collect_steps(steps);
            c.second().collect_steps(steps);
        } else {
            steps.push(self.clone());
        }
    }

    /// Transforms one point.
    ///
    /// # Errors
    ///
    /// - [`TransformError::DimensionMismatch`] if
    ///   `point.len() != self.source_dimensions()`
    /// - errors raised by non-linear leaves
    pub fn transform(&self, point: &[f64]) -> TransformResult<Vec<f64>> {
        Ok(self.evaluate(point, false)?.0)
    }

    /// Transforms one point and returns the Jacobian at that point, a
    /// `target_dimensions() × source_dimensions()` matrix.
    ///
    /// # Errors
    ///
    /// Same as [`transform`](Self::transform).
    pub fn transform_with_derivative(&self, point: &[f64]) -> TransformResult<(Vec<f64>, Matrix)> {
        let (out, jacobian) = self.evaluate(point, true)?;
        let jacobian = jacobian.ok_or_else(|| {
            TransformError::IllegalState("transform did not return a derivative".to_string())
        })?;
        Ok((out, jacobian))
    }

    /// The Jacobian at `point`.
    ///
    /// # Errors
    ///
    /// Same as [`transform`](Self::transform).
    pub fn derivative(&self, point: &[f64]) -> TransformResult<Matrix> {
        Ok(self.transform_with_derivative(point)?.1)
    }

    /// Transforms points packed as consecutive coordinate tuples.
    ///
    /// # Errors
    ///
    /// - [`TransformError::DimensionMismatch`] if `coordinates.len()` is not
    ///   a multiple of `source_dimensions()`
    /// - the first error raised by any point
    pub fn transform_points(&self, coordinates: &[f64]) -> TransformResult<Vec<f64>> {
        let dim = self.source_dimensions();
        let remainder = coordinates.len() % dim;
        if remainder != 0 {
            return Err(TransformError::mismatch(
                "packed coordinates",
                coordinates.len() - remainder + dim,
                coordinates.len(),
            ));
        }
        let mut out = Vec::with_capacity(coordinates.len() / dim * self.target_dimensions());
        for point in coordinates.chunks_exact(dim) {
            out.extend(self.evaluate(point, false)?.0);
        }
        Ok(out)
    }

    pub(crate) fn evaluate(
        &self,
        point: &[f64],
        derivative: bool,
    ) -> TransformResult<(Vec<f64>, Option<Matrix>)> {
        if point.len() != self.source_dimensions() {
            return Err(TransformError::mismatch(
                "point",
                self.source_dimensions(),
                point.len(),
            ));
        }
        match self {
            Self::Linear(t) => {
                let jacobian = if derivative { Some(t.jacobian()?) } else { None };
                Ok((t.apply(point), jacobian))
            }
            Self::Concatenated(t) => t.evaluate(point, derivative),
            Self::PassThrough(t) => t.evaluate(point, derivative),
            Self::NonLinear(t) => {
                let (out, jacobian) = t.transform(point, derivative)?;
                if out.len() != t.target_dimensions() {
                    return Err(TransformError::mismatch(
                        "non-linear output",
                        t.target_dimensions(),
                        out.len(),
                    ));
                }
                if let Some(j) = &jacobian {
                    if j.num_rows() != t.target_dimensions() {
                        return Err(TransformError::mismatch(
                            "non-linear jacobian rows",
                            t.target_dimensions(),
                            j.num_rows(),
                        ));
                    }
                    if j.num_cols() != t.source_dimensions() {
                        return Err(TransformError::mismatch(
                            "non-linear jacobian columns",
                            t.source_dimensions(),
                            j.num_cols(),
                        ));
                    }
                }
                Ok((out, jacobian))
            }
        }
    }

    /// The inverse transform, with source and target dimensions swapped.
    ///
    /// # Errors
    ///
    /// - [`TransformError::NoninvertibleTransform`] for rectangular affine
    ///   maps and for non-linear leaves that provide no inverse
    /// - [`MatrixError::NotInvertible`](ref_matrix::MatrixError::NotInvertible)
    ///   for singular matrices
    pub fn inverse(&self) -> TransformResult<Self> {
        match self {
            Self::Linear(t) => Ok(Self::Linear(Arc::new(t.inverse()?))),
            Self::Concatenated(t) => Ok(Self::Concatenated(Arc::new(t.inverse()?))),
            Self::PassThrough(t) => Ok(Self::PassThrough(Arc::new(t.inverse()?))),
            Self::NonLinear(t) => t.inverse().map(Self::NonLinear).ok_or_else(|| {
                TransformError::NoninvertibleTransform(format!("\"{}\" has no inverse", t.name()))
            }),
        }
    }

    /// A plain-data description of this transform tree.
    #[must_use]
    pub fn describe(&self) -> TransformDescriptor {
        TransformDescriptor::of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn affine(rows: usize, cols: usize, values: &[f64]) -> MathTransform {
        MathTransform::linear(Matrix::new(rows, cols, values).unwrap()).unwrap()
    }

    #[test]
    fn dimensions_of_linear() {
        let t = affine(3, 4, &[1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(t.source_dimensions(), 3);
        assert_eq!(t.target_dimensions(), 2);
    }

    #[test]
    fn point_length_is_checked() {
        let t = MathTransform::identity(2).unwrap();
        assert_eq!(
            t.transform(&[1.0]),
            Err(TransformError::mismatch("point", 2, 1))
        );
    }

    #[test]
    fn identity_needs_a_dimension() {
        assert!(MathTransform::identity(0).is_err());
        assert!(MathTransform::identity(3).unwrap().is_identity());
    }

    #[test]
    fn batch_evaluation() {
        let t = affine(2, 2, &[2.0, 1.0, 0.0, 1.0]);
        assert_eq!(t.transform_points(&[0.0, 1.0, 2.0]).unwrap(), vec![1.0, 3.0, 5.0]);
        let t = MathTransform::identity(2).unwrap();
        assert_eq!(
            t.transform_points(&[0.0, 1.0, 2.0]),
            Err(TransformError::mismatch("packed coordinates", 4, 3))
        );
    }

    #[test]
    fn linear_derivative_is_constant() {
        let t = affine(3, 3, &[2.0, 1.0, 5.0, 0.0, 3.0, 6.0, 0.0, 0.0, 1.0]);
        let d1 = t.derivative(&[0.0, 0.0]).unwrap();
        let d2 = t.derivative(&[100.0, -7.0]).unwrap();
        assert_eq!(d1, d2);
        assert_eq!(d1, Matrix::new(2, 2, &[2.0, 1.0, 0.0, 3.0]).unwrap());
    }

    #[test]
    fn ptr_eq_is_identity_of_nodes() {
        let a = MathTransform::identity(2).unwrap();
        let b = a.clone();
        let c = MathTransform::identity(2).unwrap();
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }

    /// A 2 → 2 leaf whose derivative has the wrong shape.
    #[derive(Debug)]
    struct ShortJacobian;

    impl NonLinearTransform for ShortJacobian {
        fn name(&self) -> &str {
            "short jacobian"
        }

        fn source_dimensions(&self) -> usize {
            2
        }

        fn target_dimensions(&self) -> usize {
            2
        }

        fn transform(
            &self,
            point: &[f64],
            derivative: bool,
        ) -> TransformResult<(Vec<f64>, Option<Matrix>)> {
            let jacobian = derivative.then(|| Matrix::identity(1));
            Ok((point.to_vec(), jacobian))
        }
    }

    #[test]
    fn non_linear_jacobian_shape_is_checked() {
        let leaf = MathTransform::non_linear(Arc::new(ShortJacobian)).unwrap();
        assert_eq!(
            leaf.derivative(&[0.0, 1.0]),
            Err(TransformError::mismatch("non-linear jacobian rows", 2, 1))
        );
        assert_eq!(leaf.transform(&[0.0, 1.0]).unwrap(), vec![0.0, 1.0]);

        let wrapped = MathTransform::pass_through(1, &leaf, 1).unwrap();
        assert!(matches!(
            wrapped.derivative(&[0.0, 1.0, 2.0, 3.0]),
            Err(TransformError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn leaf_without_inverse_is_infeasible() {
        let leaf = MathTransform::non_linear(Arc::new(ShortJacobian)).unwrap();
        let err = leaf.inverse().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Infeasible);
        assert!(matches!(err, TransformError::NoninvertibleTransform(_)));

        #[rustfmt::skip]
        let values = [
            2.0, 0.0, 0.0,
            0.0, 2.0, 0.0,
            0.0, 0.0, 1.0,
        ];
        let scale = MathTransform::linear(Matrix::new(3, 3, &values).unwrap()).unwrap();
        let chain = MathTransform::concatenate(&scale, &leaf).unwrap();
        assert_eq!(
            chain.inverse().unwrap_err().kind(),
            crate::error::ErrorKind::Infeasible
        );
    }

    #[test]
    fn steps_of_single_node() {
        let a = MathTransform::identity(2).unwrap();
        let steps = a.steps();
        assert_eq!(steps.len(), 1);
        assert!(steps[0].ptr_eq(&a));
        assert!(a.matrix().is_some());
    }
}
