//! Extraction of sub-transforms restricted to chosen dimensions.
//!
//! Given a transform and requested source and/or target dimensions, the
//! separator builds the smallest transform that computes the requested
//! outputs from the requested inputs, or reports that it cannot be done.
//!
//! [`separate`] is a pure function. [`TransformSeparator`] is a mutable
//! session around it that accumulates requests and remembers the
//! dimensions actually used by the last separation.

mod source;
mod target;

use tracing::debug;

use crate::error::{TransformError, TransformResult};
use crate::factory::{DefaultFactory, TransformFactory};
use crate::params::SeparatorParams;
use crate::transform::MathTransform;

/// The outcome of a separation.
#[derive(Debug, Clone)]
pub struct Separation {
    /// The reduced transform.
    pub transform: MathTransform,
    /// Source dimensions of the original transform used by the result, in
    /// the order of the result's inputs.
    pub source_dimensions: Vec<usize>,
    /// Target dimensions of the original transform computed by the result,
    /// in the order of the result's outputs.
    pub target_dimensions: Vec<usize>,
}

/// `indices` followed by the homogeneous index `dimension`.
pub(crate) fn with_homogeneous(indices: &[usize], dimension: usize) -> Vec<usize> {
    let mut all = Vec::with_capacity(indices.len() + 1);
    all.extend_from_slice(indices);
    all.push(dimension);
    all
}

/// Returns `true` if `indices` is exactly `0..dimension`.
pub(crate) fn is_full(indices: &[usize], dimension: usize) -> bool {
    indices.len() == dimension && indices.iter().enumerate().all(|(i, &d)| i == d)
}

/// Concatenates `steps` in order through `factory`.
pub(crate) fn compose(
    steps: Vec<MathTransform>,
    factory: &dyn TransformFactory,
) -> TransformResult<MathTransform> {
    let mut iter = steps.into_iter();
    let head = iter
        .next()
        .ok_or_else(|| TransformError::IllegalState("no step to concatenate".to_string()))?;
    iter.try_fold(head, |acc, step| factory.create_concatenated(&acc, &step))
}

/// Reduces `transform` to the requested dimensions.
///
/// Both dimension lists must be strictly increasing and in range; `None`
/// or an empty list means "not specified".
///
/// - With no source dimensions specified (or all of them), the result keeps
///   every input and computes the requested outputs. If
///   `params.trim_source_dimensions` is set, inputs that no output depends
///   on are then dropped.
/// - With source dimensions specified, the result keeps every output that
///   depends on those inputs only; if target dimensions are also specified,
///   each of them must be among those outputs.
/// - With nothing specified and no trimming, the result is `transform`
///   itself.
///
/// # Errors
///
/// - [`TransformError::IllegalArgument`] if a dimension list is out of range
///   or not strictly increasing
/// - [`TransformError::CannotSeparate`] if a requested output cannot be
///   computed from the requested inputs, or if the requested source
///   dimensions leave no output at all
///
/// # Example
///
/// ```
/// use ref_matrix::Matrix;
/// use ref_transform::{DefaultFactory, MathTransform, SeparatorParams, separate};
///
/// let t = MathTransform::linear(Matrix::new(4, 4, &[
///     2.0, 0.0, 0.0, 7.0,
///     0.0, 5.0, 0.0, 6.0,
///     1.0, 0.0, 3.0, 8.0,
///     0.0, 0.0, 0.0, 1.0,
/// ])?)?;
/// let s = separate(&t, Some(&[1, 2]), None, &SeparatorParams::default(), &DefaultFactory::default())?;
/// assert_eq!(s.target_dimensions, vec![1]);
/// assert_eq!(s.transform.transform(&[1.0, 1.0])?, vec![11.0]);
/// # Ok::<(), ref_transform::TransformError>(())
/// ```
pub fn separate(
    transform: &MathTransform,
    sources: Option<&[usize]>,
    targets: Option<&[usize]>,
    params: &SeparatorParams,
    factory: &dyn TransformFactory,
) -> TransformResult<Separation> {
    let num_sources = transform.source_dimensions();
    let num_targets = transform.target_dimensions();
    let sources = sources.filter(|s| !s.is_empty());
    let targets = targets.filter(|t| !t.is_empty());
    if let Some(s) = sources {
        check_dimensions(s, num_sources, "source")?;
    }
    if let Some(t) = targets {
        check_dimensions(t, num_targets, "target")?;
    }
    debug!(
        ?sources,
        ?targets,
        trim = params.trim_source_dimensions,
        "separating transform"
    );

    let separation = match sources {
        Some(sources) if sources.len() < num_sources => {
            let (reduced, derived) = source::filter(transform, sources, factory)?;
            if derived.is_empty() {
                return Err(TransformError::CannotSeparate(
                    "no target dimension depends only on the requested source dimensions"
                        .to_string(),
                ));
            }
            match targets {
                None => Separation {
                    transform: reduced,
                    source_dimensions: sources.to_vec(),
                    target_dimensions: derived,
                },
                Some(requested) => {
                    let positions = requested
                        .iter()
                        .map(|t| {
                            derived.binary_search(t).map_err(|_| {
                                TransformError::CannotSeparate(format!(
                                    "target dimension {t} depends on source dimensions that were not requested"
                                ))
                            })
                        })
                        .collect::<TransformResult<Vec<usize>>>()?;
                    Separation {
                        transform: target::filter(&reduced, &positions, factory)?,
                        source_dimensions: sources.to_vec(),
                        target_dimensions: requested.to_vec(),
                    }
                }
            }
        }
        _ => {
            let requested: Vec<usize> =
                targets.map_or_else(|| (0..num_targets).collect(), <[usize]>::to_vec);
            let reduced = target::filter(transform, &requested, factory)?;
            let (reduced, kept) = if params.trim_source_dimensions {
                target::trim_sources(&reduced, factory)?
            } else {
                (reduced, (0..num_sources).collect())
            };
            Separation {
                transform: reduced,
                source_dimensions: kept,
                target_dimensions: requested,
            }
        }
    };

    debug!(
        sources = ?separation.source_dimensions,
        targets = ?separation.target_dimensions,
        "separated transform"
    );
    Ok(separation)
}

/// Checks that `dimensions` is strictly increasing and below `limit`.
fn check_dimensions(dimensions: &[usize], limit: usize, side: &str) -> TransformResult<()> {
    let mut previous: Option<usize> = None;
    for (i, &d) in dimensions.iter().enumerate() {
        if d >= limit {
            return Err(TransformError::IllegalArgument(format!(
                "{side} dimensions[{i}] = {d} is out of range [0, {limit})"
            )));
        }
        if previous.is_some_and(|p| d <= p) {
            return Err(TransformError::IllegalArgument(format!(
                "{side} dimensions[{i}] = {d} is not greater than the previous dimension"
            )));
        }
        previous = Some(d);
    }
    Ok(())
}

/// Appends `dimensions` to `set` after checking that the result stays
/// strictly increasing and below `limit`. Nothing is appended on error.
fn add_dimensions(set: &mut Option<Vec<usize>>, dimensions: &[usize], limit: usize) -> TransformResult<()> {
    let mut previous = set.as_ref().and_then(|s| s.last().copied());
    for (i, &d) in dimensions.iter().enumerate() {
        if d >= limit {
            return Err(TransformError::IllegalArgument(format!(
                "dimensions[{i}] = {d} is out of range [0, {limit})"
            )));
        }
        if let Some(p) = previous.filter(|&p| d <= p) {
            return Err(TransformError::IllegalArgument(format!(
                "dimensions[{i}] = {d} must be greater than {p}"
            )));
        }
        previous = Some(d);
    }
    if !dimensions.is_empty() {
        set.get_or_insert_with(Vec::new).extend_from_slice(dimensions);
    }
    Ok(())
}

/// Appends `lower..upper` to `set` with the same rules as
/// [`add_dimensions`]. An empty range is accepted and adds nothing.
fn add_dimension_range(
    set: &mut Option<Vec<usize>>,
    lower: usize,
    upper: usize,
    limit: usize,
) -> TransformResult<()> {
    if upper > limit {
        return Err(TransformError::IllegalArgument(format!(
            "upper = {upper} is greater than the number of dimensions {limit}"
        )));
    }
    if lower > upper {
        return Err(TransformError::IllegalArgument(format!(
            "lower = {lower} is greater than upper = {upper}"
        )));
    }
    if let Some(p) = set.as_ref().and_then(|s| s.last().copied()).filter(|&p| lower <= p) {
        return Err(TransformError::IllegalArgument(format!(
            "lower = {lower} must be greater than {p}"
        )));
    }
    if lower < upper {
        set.get_or_insert_with(Vec::new).extend(lower..upper);
    }
    Ok(())
}

/// A separation session around one transform.
///
/// Dimensions are added with the `add_*` methods, in strictly increasing
/// order across calls. [`separate`](Self::separate) runs the separation and
/// replaces the requested dimensions by the ones actually used, which the
/// getters then report. [`clear`](Self::clear) forgets the dimensions and
/// keeps the transform, the options and the factory.
///
/// A session is plain mutable state; share it across threads only behind a
/// lock.
///
/// # Example
///
/// ```
/// use ref_matrix::Matrix;
/// use ref_transform::{MathTransform, TransformSeparator};
///
/// let t = MathTransform::linear(Matrix::new(4, 4, &[
///     2.0, 0.0, 0.0, 7.0,
///     0.0, 5.0, 0.0, 6.0,
///     1.0, 0.0, 3.0, 8.0,
///     0.0, 0.0, 0.0, 1.0,
/// ])?)?;
/// let mut s = TransformSeparator::new(t);
/// s.add_target_dimensions(&[0, 2])?;
/// let reduced = s.separate()?;
/// assert_eq!(reduced.target_dimensions(), 2);
/// assert_eq!(s.source_dimensions()?, &[0, 1, 2]);
/// # Ok::<(), ref_transform::TransformError>(())
/// ```
#[derive(Debug)]
pub struct TransformSeparator<F: TransformFactory = DefaultFactory> {
    transform: MathTransform,
    source_dimensions: Option<Vec<usize>>,
    target_dimensions: Option<Vec<usize>>,
    params: SeparatorParams,
    factory: F,
}

impl TransformSeparator<DefaultFactory> {
    /// Creates a session using the [`DefaultFactory`].
    #[must_use]
    pub fn new(transform: MathTransform) -> Self {
        Self::with_factory(transform, DefaultFactory::default())
    }
}

impl<F: TransformFactory> TransformSeparator<F> {
    /// Creates a session building new nodes through `factory`.
    #[must_use]
    pub fn with_factory(transform: MathTransform, factory: F) -> Self {
        Self {
            transform,
            source_dimensions: None,
            target_dimensions: None,
            params: SeparatorParams::default(),
            factory,
        }
    }

    /// Replaces the options.
    #[must_use]
    pub fn with_params(mut self, params: SeparatorParams) -> Self {
        self.params = params;
        self
    }

    /// The transform to separate.
    #[must_use]
    pub const fn transform(&self) -> &MathTransform {
        &self.transform
    }

    /// Whether unused source dimensions are dropped when no source
    /// dimension is requested.
    #[must_use]
    pub const fn trim_source_dimensions(&self) -> bool {
        self.params.trim_source_dimensions
    }

    /// Sets whether unused source dimensions are dropped when no source
    /// dimension is requested.
    pub fn set_trim_source_dimensions(&mut self, trim: bool) {
        self.params.trim_source_dimensions = trim;
    }

    /// Requests source dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::IllegalArgument`], naming the offending
    /// `dimensions[i]`, if an index is out of range or not greater than
    /// every index added before. Nothing is added on error.
    pub fn add_source_dimensions(&mut self, dimensions: &[usize]) -> TransformResult<()> {
        let limit = self.transform.source_dimensions();
        add_dimensions(&mut self.source_dimensions, dimensions, limit)
    }

    /// Requests the source dimensions `lower..upper`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::IllegalArgument`], naming `lower` or
    /// `upper`, if the range is out of bounds, reversed, or does not start
    /// after every index added before.
    pub fn add_source_dimension_range(&mut self, lower: usize, upper: usize) -> TransformResult<()> {
        let limit = self.transform.source_dimensions();
        add_dimension_range(&mut self.source_dimensions, lower, upper, limit)
    }

    /// Requests target dimensions.
    ///
    /// # Errors
    ///
    /// Same rules as [`add_source_dimensions`](Self::add_source_dimensions).
    pub fn add_target_dimensions(&mut self, dimensions: &[usize]) -> TransformResult<()> {
        let limit = self.transform.target_dimensions();
        add_dimensions(&mut self.target_dimensions, dimensions, limit)
    }

    /// Requests the target dimensions `lower..upper`.
    ///
    /// # Errors
    ///
    /// Same rules as
    /// [`add_source_dimension_range`](Self::add_source_dimension_range).
    pub fn add_target_dimension_range(&mut self, lower: usize, upper: usize) -> TransformResult<()> {
        let limit = self.transform.target_dimensions();
        add_dimension_range(&mut self.target_dimensions, lower, upper, limit)
    }

    /// The requested source dimensions, or after a successful
    /// [`separate`](Self::separate), the source dimensions used.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::IllegalState`] if no source dimension was
    /// requested and no separation has run since the last
    /// [`clear`](Self::clear).
    pub fn source_dimensions(&self) -> TransformResult<&[usize]> {
        self.source_dimensions
            .as_deref()
            .ok_or_else(|| TransformError::IllegalState("source dimensions are not specified".to_string()))
    }

    /// The requested target dimensions, or after a successful
    /// [`separate`](Self::separate), the target dimensions computed.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::IllegalState`] if no target dimension was
    /// requested and no separation has run since the last
    /// [`clear`](Self::clear).
    pub fn target_dimensions(&self) -> TransformResult<&[usize]> {
        self.target_dimensions
            .as_deref()
            .ok_or_else(|| TransformError::IllegalState("target dimensions are not specified".to_string()))
    }

    /// Forgets all requested and used dimensions.
    pub fn clear(&mut self) {
        self.source_dimensions = None;
        self.target_dimensions = None;
    }

    /// Separates the transform for the dimensions requested so far.
    ///
    /// On success the session reports the dimensions actually used. On
    /// failure the requested dimensions are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::CannotSeparate`] if the requested outputs
    /// cannot be computed from the requested inputs.
    pub fn separate(&mut self) -> TransformResult<MathTransform> {
        let separation = separate(
            &self.transform,
            self.source_dimensions.as_deref(),
            self.target_dimensions.as_deref(),
            &self.params,
            &self.factory,
        )?;
        self.source_dimensions = Some(separation.source_dimensions);
        self.target_dimensions = Some(separation.target_dimensions);
        Ok(separation.transform)
    }
}
