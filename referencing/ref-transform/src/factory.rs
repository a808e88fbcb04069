//! Construction of transform nodes with simplification.

use std::sync::Arc;

use ref_matrix::Matrix;
use tracing::{debug, trace};

use crate::concatenated::ConcatenatedTransform;
use crate::error::{TransformError, TransformResult};
use crate::linear::LinearTransform;
use crate::params::FactoryParams;
use crate::pass_through::PassThroughTransform;
use crate::transform::MathTransform;

/// Builds transform nodes.
///
/// The separator creates every new node through a factory, so callers can
/// control how results are assembled.
pub trait TransformFactory {
    /// Creates an affine transform from a homogeneous matrix.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix is not affine or has no source
    /// dimension.
    fn create_affine(&self, matrix: Matrix) -> TransformResult<MathTransform>;

    /// Creates `second ∘ first`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::DimensionMismatch`] unless
    /// `first.target_dimensions() == second.source_dimensions()`.
    fn create_concatenated(
        &self,
        first: &MathTransform,
        second: &MathTransform,
    ) -> TransformResult<MathTransform>;

    /// Creates a pass-through wrapper around `sub_transform`.
    ///
    /// # Errors
    ///
    /// Implementation specific.
    fn create_pass_through(
        &self,
        first_affected_ordinate: usize,
        sub_transform: &MathTransform,
        num_trailing_ordinates: usize,
    ) -> TransformResult<MathTransform>;
}

/// The standard factory.
///
/// - Concatenations are flattened; adjacent linear steps are multiplied into
///   one matrix and identity steps are dropped (both configurable through
///   [`FactoryParams`])
/// - A pass-through with no leading and no trailing dimension is its
///   sub-transform
/// - A pass-through around a linear transform is one expanded linear
///   transform
/// - Nested pass-through wrappers are merged
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFactory {
    params: FactoryParams,
}

impl DefaultFactory {
    /// Creates a factory with the given options.
    #[must_use]
    pub const fn new(params: FactoryParams) -> Self {
        Self { params }
    }

    /// The options of this factory.
    #[must_use]
    pub const fn params(&self) -> &FactoryParams {
        &self.params
    }

    /// Appends `step` to `steps`, multiplying it into the previous step
    /// when both are linear.
    fn push_step(&self, steps: &mut Vec<MathTransform>, step: MathTransform) -> TransformResult<()> {
        let folded = match (steps.last(), &step) {
            (Some(MathTransform::Linear(prev)), MathTransform::Linear(next))
                if self.params.fold_linear =>
            {
                Some(next.matrix().multiply(prev.matrix())?)
            }
            _ => None,
        };
        match folded {
            Some(product) => {
                trace!(
                    rows = product.num_rows(),
                    cols = product.num_cols(),
                    "folded adjacent linear steps"
                );
                steps.pop();
                steps.push(self.create_affine(product)?);
            }
            None => steps.push(step),
        }
        Ok(())
    }
}

/// Builds a left-nested chain of raw concatenation nodes.
fn chain(steps: Vec<MathTransform>) -> TransformResult<Option<MathTransform>> {
    let mut iter = steps.into_iter();
    let Some(head) = iter.next() else {
        return Ok(None);
    };
    iter.try_fold(head, |acc, step| -> TransformResult<MathTransform> {
        Ok(MathTransform::Concatenated(Arc::new(
            ConcatenatedTransform::new(acc, step)?,
        )))
    })
    .map(Some)
}

/// The matrix of `sub` embedded between `leading` and `trailing` identity
/// dimensions.
fn expand(leading: usize, sub: &LinearTransform, trailing: usize) -> TransformResult<Matrix> {
    let ns = sub.source_dimensions();
    let nt = sub.target_dimensions();
    let src = leading + ns + trailing;
    let tgt = leading + nt + trailing;
    let inner = sub.matrix();

    let mut m = Matrix::zeros(tgt + 1, src + 1);
    for i in 0..leading {
        m.set(i, i, 1.0)?;
    }
    for r in 0..nt {
        for c in 0..ns {
            m.set(leading + r, leading + c, inner[(r, c)])?;
        }
        m.set(leading + r, src, inner[(r, ns)])?;
    }
    for i in 0..trailing {
        m.set(leading + nt + i, leading + ns + i, 1.0)?;
    }
    m.set(tgt, src, 1.0)?;
    Ok(m)
}

impl TransformFactory for DefaultFactory {
    fn create_affine(&self, matrix: Matrix) -> TransformResult<MathTransform> {
        MathTransform::linear(matrix)
    }

    fn create_concatenated(
        &self,
        first: &MathTransform,
        second: &MathTransform,
    ) -> TransformResult<MathTransform> {
        if first.target_dimensions() != second.source_dimensions() {
            return Err(TransformError::mismatch(
                "concatenation",
                first.target_dimensions(),
                second.source_dimensions(),
            ));
        }
        if !self.params.fold_linear && !self.params.elide_identity {
            return Ok(MathTransform::Concatenated(Arc::new(
                ConcatenatedTransform::new(first.clone(), second.clone())?,
            )));
        }

        let mut steps = Vec::new();
        for step in first.steps().into_iter().chain(second.steps()) {
            self.push_step(&mut steps, step)?;
        }
        if self.params.elide_identity {
            let before = steps.len();
            steps.retain(|s| !s.is_identity());
            if steps.len() < before {
                debug!(removed = before - steps.len(), "elided identity steps");
            }
        }
        match chain(steps)? {
            Some(result) => Ok(result),
            // Every step was an identity, so the dimensions agree.
            None => MathTransform::identity(first.source_dimensions()),
        }
    }

    fn create_pass_through(
        &self,
        first_affected_ordinate: usize,
        sub_transform: &MathTransform,
        num_trailing_ordinates: usize,
    ) -> TransformResult<MathTransform> {
        if first_affected_ordinate == 0 && num_trailing_ordinates == 0 {
            return Ok(sub_transform.clone());
        }
        match sub_transform {
            MathTransform::Linear(linear) => self.create_affine(expand(
                first_affected_ordinate,
                linear,
                num_trailing_ordinates,
            )?),
            MathTransform::PassThrough(inner) => self.create_pass_through(
                first_affected_ordinate + inner.first_affected_ordinate(),
                inner.sub_transform(),
                num_trailing_ordinates + inner.num_trailing_ordinates(),
            ),
            _ => Ok(MathTransform::PassThrough(Arc::new(
                PassThroughTransform::new(
                    first_affected_ordinate,
                    sub_transform.clone(),
                    num_trailing_ordinates,
                ),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn affine(rows: usize, cols: usize, values: &[f64]) -> MathTransform {
        MathTransform::linear(Matrix::new(rows, cols, values).unwrap()).unwrap()
    }

    fn scale(factor: f64) -> MathTransform {
        affine(3, 3, &[factor, 0.0, 0.0, 0.0, factor, 0.0, 0.0, 0.0, 1.0])
    }

    #[test]
    fn linear_steps_fold() {
        let factory = DefaultFactory::default();
        let t = factory.create_concatenated(&scale(2.0), &scale(3.0)).unwrap();
        assert_eq!(t.matrix(), scale(6.0).matrix());
    }

    #[test]
    fn identity_steps_disappear() {
        let factory = DefaultFactory::new(FactoryParams::default().with_fold_linear(false));
        let id = MathTransform::identity(2).unwrap();
        let s = scale(2.0);
        let t = factory.create_concatenated(&id, &s).unwrap();
        assert!(t.ptr_eq(&s));
        let t = factory.create_concatenated(&id, &id).unwrap();
        assert!(t.is_identity());
    }

    #[test]
    fn verbatim_keeps_every_node() {
        let factory = DefaultFactory::new(FactoryParams::verbatim());
        let t = factory.create_concatenated(&scale(2.0), &scale(3.0)).unwrap();
        assert!(matches!(t, MathTransform::Concatenated(_)));
        assert_eq!(t.steps().len(), 2);
        assert_eq!(t.transform(&[1.0, 1.0]).unwrap(), vec![6.0, 6.0]);
    }

    #[test]
    fn concatenation_checks_dimensions() {
        let factory = DefaultFactory::default();
        let three = MathTransform::identity(3).unwrap();
        assert_eq!(
            factory.create_concatenated(&scale(2.0), &three).unwrap_err(),
            TransformError::mismatch("concatenation", 2, 3)
        );
    }

    #[test]
    fn pass_through_without_offsets_is_sub_transform() {
        let factory = DefaultFactory::default();
        let s = scale(2.0);
        assert!(factory.create_pass_through(0, &s, 0).unwrap().ptr_eq(&s));
    }

    #[test]
    fn pass_through_around_linear_expands() {
        let factory = DefaultFactory::default();
        let sub = affine(2, 2, &[3.0, 4.0, 0.0, 1.0]);
        let t = factory.create_pass_through(1, &sub, 1).unwrap();
        let expected = Matrix::new(
            4,
            4,
            &[
                1.0, 0.0, 0.0, 0.0, //
                0.0, 3.0, 0.0, 4.0, //
                0.0, 0.0, 1.0, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ],
        )
        .unwrap();
        assert_eq!(t.matrix(), Some(&expected));
    }

    #[test]
    fn expand_keeps_rectangular_shape() {
        // 1 → 2 dimensions inside 2 leading and 1 trailing.
        let sub = LinearTransform::new(Matrix::new(3, 2, &[1.0, 5.0, 2.0, 6.0, 0.0, 1.0]).unwrap())
            .unwrap();
        let m = expand(2, &sub, 1).unwrap();
        assert_eq!((m.num_rows(), m.num_cols()), (6, 5));
        assert_eq!(m.row(2), Some(vec![0.0, 0.0, 1.0, 0.0, 5.0]));
        assert_eq!(m.row(3), Some(vec![0.0, 0.0, 2.0, 0.0, 6.0]));
        assert_eq!(m.row(4), Some(vec![0.0, 0.0, 0.0, 1.0, 0.0]));
        assert!(m.is_affine());
    }
}
