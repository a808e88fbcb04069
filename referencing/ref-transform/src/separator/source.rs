//! Reduction of a transform to a subset of its inputs.
//!
//! Each function returns the reduced transform together with the outputs
//! that can still be computed, in ascending order.

use std::sync::Arc;

use ref_matrix::Matrix;

use super::{compose, is_full, with_homogeneous};
use crate::error::{TransformError, TransformResult};
use crate::factory::TransformFactory;
use crate::linear::LinearTransform;
use crate::pass_through::PassThroughTransform;
use crate::transform::MathTransform;

/// Keeps the inputs listed in `sources` and the outputs that depend on
/// nothing else.
pub(super) fn filter(
    transform: &MathTransform,
    sources: &[usize],
    factory: &dyn TransformFactory,
) -> TransformResult<(MathTransform, Vec<usize>)> {
    if is_full(sources, transform.source_dimensions()) {
        let all = (0..transform.target_dimensions()).collect();
        return Ok((transform.clone(), all));
    }
    match transform {
        MathTransform::Linear(linear) => filter_linear(linear, sources, factory),
        MathTransform::Concatenated(_) => chain(&transform.steps(), sources, factory),
        MathTransform::PassThrough(pt) => pass_through(pt, sources, factory),
        MathTransform::NonLinear(leaf) => Err(TransformError::CannotSeparate(format!(
            "non-linear transform \"{}\" needs all of its {} source dimensions, got {sources:?}",
            leaf.name(),
            leaf.source_dimensions()
        ))),
    }
}

/// Keeps the rows whose coefficients outside the requested columns are all
/// zero or undetermined.
fn filter_linear(
    linear: &LinearTransform,
    sources: &[usize],
    factory: &dyn TransformFactory,
) -> TransformResult<(MathTransform, Vec<usize>)> {
    let matrix = linear.matrix();
    let inputs = linear.source_dimensions();
    let excluded: Vec<usize> = (0..inputs)
        .filter(|c| sources.binary_search(c).is_err())
        .collect();
    let kept: Vec<usize> = (0..linear.target_dimensions())
        .filter(|&r| {
            excluded.iter().all(|&c| {
                matrix
                    .coefficient(r, c)
                    .is_none_or(|v| v.is_ignorable())
            })
        })
        .collect();
    let reduced = matrix.submatrix(
        &with_homogeneous(&kept, linear.target_dimensions()),
        &with_homogeneous(sources, inputs),
    )?;
    Ok((factory.create_affine(reduced)?, kept))
}

/// Source filtering of a flattened concatenation, walking forward.
fn chain(
    steps: &[MathTransform],
    sources: &[usize],
    factory: &dyn TransformFactory,
) -> TransformResult<(MathTransform, Vec<usize>)> {
    let mut current = sources.to_vec();
    let mut reduced = Vec::with_capacity(steps.len());
    for (i, step) in steps.iter().enumerate() {
        let (step, outputs) = filter(step, &current, factory)?;
        if outputs.is_empty() && i + 1 < steps.len() {
            return Err(TransformError::CannotSeparate(format!(
                "no output of step {i} depends only on the requested source dimensions"
            )));
        }
        reduced.push(step);
        current = outputs;
    }
    Ok((compose(reduced, factory)?, current))
}

/// Source filtering of a pass-through wrapper.
///
/// The requested inputs split into leading, sub-transform and trailing
/// groups. Pass-through inputs map one to one to outputs. The sub-transform
/// is reduced recursively to its requested inputs; if none are requested,
/// it contributes no output and the result is an identity over the
/// remaining pass-through dimensions.
fn pass_through(
    pt: &Arc<PassThroughTransform>,
    sources: &[usize],
    factory: &dyn TransformFactory,
) -> TransformResult<(MathTransform, Vec<usize>)> {
    let k = pt.first_affected_ordinate();
    let sub = pt.sub_transform();
    let ns = sub.source_dimensions();
    let nt = sub.target_dimensions();

    let leading = sources.iter().filter(|&&s| s < k).count();
    let trailing: Vec<usize> = sources.iter().copied().filter(|&s| s >= k + ns).collect();
    let sub_sources: Vec<usize> = sources
        .iter()
        .filter(|&&s| s >= k && s < k + ns)
        .map(|&s| s - k)
        .collect();

    let mut targets: Vec<usize> = sources[..leading].to_vec();
    let result = if sub_sources.is_empty() {
        factory.create_affine(Matrix::identity(sources.len() + 1))?
    } else {
        let (reduced, sub_targets) = filter(sub, &sub_sources, factory)?;
        targets.extend(sub_targets.iter().map(|&t| t + k));
        factory.create_pass_through(leading, &reduced, trailing.len())?
    };
    targets.extend(trailing.iter().map(|&s| s - ns + nt));
    Ok((result, targets))
}
