//! Reduction of a transform to a subset of its outputs.
//!
//! Target filtering never changes the source dimensions of a transform,
//! except through the optional trimming pass at the end.

use std::sync::Arc;

use ref_matrix::Matrix;
use tracing::trace;

use super::{compose, is_full, with_homogeneous};
use crate::error::{TransformError, TransformResult};
use crate::factory::TransformFactory;
use crate::linear::LinearTransform;
use crate::pass_through::PassThroughTransform;
use crate::transform::MathTransform;

/// Keeps the outputs listed in `targets`, in that order.
pub(super) fn filter(
    transform: &MathTransform,
    targets: &[usize],
    factory: &dyn TransformFactory,
) -> TransformResult<MathTransform> {
    if is_full(targets, transform.target_dimensions()) {
        return Ok(transform.clone());
    }
    match transform {
        MathTransform::Linear(linear) => factory.create_affine(select_rows(linear, targets)?),
        MathTransform::Concatenated(_) => {
            let steps = chain(&transform.steps(), targets, factory)?;
            compose(steps, factory)
        }
        MathTransform::PassThrough(pt) => pass_through(pt, targets, factory),
        MathTransform::NonLinear(leaf) => Err(TransformError::CannotSeparate(format!(
            "non-linear transform \"{}\" cannot be reduced to target dimensions {targets:?}",
            leaf.name()
        ))),
    }
}

fn select_rows(linear: &LinearTransform, targets: &[usize]) -> TransformResult<Matrix> {
    let rows = with_homogeneous(targets, linear.target_dimensions());
    Ok(linear.matrix().select_rows(&rows)?)
}

/// Source columns that some non-homogeneous row of `matrix` depends on.
///
/// A `NaN` coefficient counts as a dependency, so the result does not
/// change when adjacent linear steps are folded into one matrix.
fn used_columns(matrix: &Matrix, inputs: usize) -> Vec<usize> {
    let outputs = matrix.num_rows() - 1;
    (0..inputs)
        .filter(|&c| {
            (0..outputs).any(|r| matrix.coefficient(r, c).is_some_and(|v| !v.is_zero()))
        })
        .collect()
}

/// Target filtering of a flattened concatenation, walking backward.
///
/// When the last step is linear, its rows are selected first; the source
/// columns they do not use are then dropped if the preceding steps can be
/// reduced to the remaining ones. A preceding step that cannot be reduced
/// (a non-linear leaf) is kept whole and the linear step keeps all its
/// columns.
///
/// Only a linear last step narrows the preceding steps. When the last step
/// is a pass-through or a non-linear leaf, the preceding steps are kept
/// whole even if some of their outputs end up unused: the result is
/// correct but not minimal.
fn chain(
    steps: &[MathTransform],
    targets: &[usize],
    factory: &dyn TransformFactory,
) -> TransformResult<Vec<MathTransform>> {
    let Some((last, prefix)) = steps.split_last() else {
        return Ok(Vec::new());
    };
    if prefix.is_empty() {
        return Ok(vec![filter(last, targets, factory)?]);
    }
    let MathTransform::Linear(linear) = last else {
        let mut reduced = prefix.to_vec();
        reduced.push(filter(last, targets, factory)?);
        return Ok(reduced);
    };

    let rows = select_rows(linear, targets)?;
    let inputs = linear.source_dimensions();
    let used = used_columns(&rows, inputs);
    if !used.is_empty() && used.len() < inputs {
        match chain(prefix, &used, factory) {
            Ok(mut reduced) => {
                let unused: Vec<usize> = (0..inputs)
                    .filter(|c| used.binary_search(c).is_err())
                    .collect();
                reduced.push(factory.create_affine(rows.remove_columns(&unused))?);
                return Ok(reduced);
            }
            Err(TransformError::CannotSeparate(reason)) => {
                trace!(%reason, "keeping preceding steps whole");
            }
            Err(e) => return Err(e),
        }
    }
    let mut reduced = prefix.to_vec();
    reduced.push(factory.create_affine(rows)?);
    Ok(reduced)
}

/// Target filtering of a pass-through wrapper.
///
/// Outputs outside the sub-transform block are plain copies of inputs, so a
/// request that does not touch the block is a selection matrix. Otherwise
/// the sub-transform is reduced to the requested block outputs if it can
/// be, kept whole if not, and a selection step drops whatever remains.
fn pass_through(
    pt: &Arc<PassThroughTransform>,
    targets: &[usize],
    factory: &dyn TransformFactory,
) -> TransformResult<MathTransform> {
    let k = pt.first_affected_ordinate();
    let m = pt.num_trailing_ordinates();
    let sub = pt.sub_transform();
    let ns = sub.source_dimensions();
    let nt = sub.target_dimensions();

    let sub_targets: Vec<usize> = targets
        .iter()
        .filter(|&&t| t >= k && t < k + nt)
        .map(|&t| t - k)
        .collect();

    if sub_targets.is_empty() {
        let sources = pt.source_dimensions();
        let mut matrix = Matrix::zeros(targets.len() + 1, sources + 1);
        for (row, &t) in targets.iter().enumerate() {
            let col = if t < k { t } else { t - nt + ns };
            matrix.set(row, col, 1.0)?;
        }
        matrix.set(targets.len(), sources, 1.0)?;
        return factory.create_affine(matrix);
    }

    let (reduced_sub, kept) = match filter(sub, &sub_targets, factory) {
        Ok(reduced) => (reduced, sub_targets),
        Err(TransformError::CannotSeparate(reason)) => {
            trace!(%reason, "keeping pass-through sub-transform whole");
            (sub.clone(), (0..nt).collect())
        }
        Err(e) => return Err(e),
    };
    let wrapper = if reduced_sub.ptr_eq(sub) {
        MathTransform::PassThrough(pt.clone())
    } else {
        factory.create_pass_through(k, &reduced_sub, m)?
    };

    let kept_nt = kept.len();
    let outputs = k + kept_nt + m;
    let rows: Vec<usize> = targets
        .iter()
        .map(|&t| {
            if t < k {
                t
            } else if t < k + nt {
                k + kept.binary_search(&(t - k)).unwrap_or_else(|i| i)
            } else {
                t - nt + kept_nt
            }
        })
        .collect();
    if is_full(&rows, outputs) {
        return Ok(wrapper);
    }
    let mut selection = Matrix::zeros(rows.len() + 1, outputs + 1);
    for (r, &c) in rows.iter().enumerate() {
        selection.set(r, c, 1.0)?;
    }
    selection.set(rows.len(), outputs, 1.0)?;
    factory.create_concatenated(&wrapper, &factory.create_affine(selection)?)
}

/// Drops the source dimensions that no output depends on.
///
/// Applies to linear transforms and to concatenations whose first step is
/// linear. A column counts as used if any of its coefficients is non-zero,
/// including `NaN`. Returns the reduced transform and the kept source
/// dimensions.
pub(super) fn trim_sources(
    transform: &MathTransform,
    factory: &dyn TransformFactory,
) -> TransformResult<(MathTransform, Vec<usize>)> {
    let all: Vec<usize> = (0..transform.source_dimensions()).collect();
    match transform {
        MathTransform::Linear(linear) => match trim_linear(linear)? {
            Some((matrix, kept)) => Ok((factory.create_affine(matrix)?, kept)),
            None => Ok((transform.clone(), all)),
        },
        MathTransform::Concatenated(_) => {
            let mut steps = transform.steps();
            let trimmed = match steps.first() {
                Some(MathTransform::Linear(head)) => trim_linear(head)?,
                _ => None,
            };
            match trimmed {
                Some((matrix, kept)) => {
                    steps[0] = factory.create_affine(matrix)?;
                    Ok((compose(steps, factory)?, kept))
                }
                None => Ok((transform.clone(), all)),
            }
        }
        MathTransform::PassThrough(_) | MathTransform::NonLinear(_) => Ok((transform.clone(), all)),
    }
}

fn trim_linear(linear: &LinearTransform) -> TransformResult<Option<(Matrix, Vec<usize>)>> {
    let matrix = linear.matrix();
    let inputs = linear.source_dimensions();
    let outputs = linear.target_dimensions();
    let kept: Vec<usize> = (0..inputs)
        .filter(|&c| {
            (0..outputs).any(|r| {
                matrix
                    .coefficient(r, c)
                    .is_some_and(|v| !v.is_zero())
            })
        })
        .collect();
    if kept.is_empty() || kept.len() == inputs {
        return Ok(None);
    }
    let cols = with_homogeneous(&kept, inputs);
    Ok(Some((matrix.select_columns(&cols)?, kept)))
}
