//! Geodetic to geocentric conversion on an ellipsoid.
//!
//! The non-linear kernel works on an ellipsoid of semi-major axis 1, with
//! angles in radians. [`geodetic_conversion`] wraps it between linear steps
//! that convert from degrees and scale to the real axis length, which is
//! the usual shape of a transform chain around a non-linear leaf.

use std::sync::Arc;

use ref_matrix::Matrix;
use ref_numeric::DoubleDouble;
use tracing::debug;

use crate::error::{TransformError, TransformResult};
use crate::factory::{DefaultFactory, TransformFactory};
use crate::nonlinear::NonLinearTransform;
use crate::transform::MathTransform;

/// Maximum number of iterations of the geocentric to geodetic conversion.
const MAX_ITERATIONS: usize = 20;

/// Convergence threshold on latitude, in radians.
const ANGULAR_TOLERANCE: f64 = 1e-14;

/// Converts (λ, φ[, h]) to (X, Y, Z) on a unit ellipsoid.
///
/// λ and φ are in radians; h and the outputs are in units of the semi-major
/// axis. Without height, h is taken as 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipsoidToCartesian {
    eccentricity_squared: f64,
    with_height: bool,
}

impl EllipsoidToCartesian {
    /// Creates the conversion for an ellipsoid of the given eccentricity².
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::IllegalArgument`] unless
    /// `0 <= eccentricity_squared < 1`.
    pub fn new(eccentricity_squared: f64, with_height: bool) -> TransformResult<Self> {
        if !(0.0..1.0).contains(&eccentricity_squared) {
            return Err(TransformError::IllegalArgument(format!(
                "eccentricity_squared = {eccentricity_squared} must be in [0, 1)"
            )));
        }
        Ok(Self {
            eccentricity_squared,
            with_height,
        })
    }

    /// The square of the first eccentricity.
    #[must_use]
    pub const fn eccentricity_squared(&self) -> f64 {
        self.eccentricity_squared
    }

    /// Returns `true` if the input has a height dimension.
    #[must_use]
    pub const fn with_height(&self) -> bool {
        self.with_height
    }

    /// Forward conversion with its 3 × 3 Jacobian with respect to (λ, φ, h).
    fn convert(&self, lambda: f64, phi: f64, h: f64) -> ([f64; 3], [[f64; 3]; 3]) {
        let e2 = self.eccentricity_squared;
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let (sin_phi, cos_phi) = phi.sin_cos();
        // Prime vertical radius of curvature.
        let nu = 1.0 / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        // Meridional radius of curvature.
        let rho = (1.0 - e2) * nu * nu * nu;

        let r = (nu + h) * cos_phi;
        let point = [
            r * cos_lambda,
            r * sin_lambda,
            (nu * (1.0 - e2) + h) * sin_phi,
        ];
        let dphi = -(rho + h) * sin_phi;
        let jacobian = [
            [-r * sin_lambda, dphi * cos_lambda, cos_phi * cos_lambda],
            [r * cos_lambda, dphi * sin_lambda, cos_phi * sin_lambda],
            [0.0, (rho + h) * cos_phi, sin_phi],
        ];
        (point, jacobian)
    }
}

impl NonLinearTransform for EllipsoidToCartesian {
    fn name(&self) -> &str {
        "Ellipsoid to Cartesian"
    }

    fn source_dimensions(&self) -> usize {
        if self.with_height { 3 } else { 2 }
    }

    fn target_dimensions(&self) -> usize {
        3
    }

    fn transform(
        &self,
        point: &[f64],
        derivative: bool,
    ) -> TransformResult<(Vec<f64>, Option<Matrix>)> {
        let h = if self.with_height { point[2] } else { 0.0 };
        let (out, j) = self.convert(point[0], point[1], h);
        let jacobian = if derivative {
            let cols = self.source_dimensions();
            let mut m = Matrix::zeros(3, cols);
            for (r, row) in j.iter().enumerate() {
                for (c, &v) in row.iter().take(cols).enumerate() {
                    m.set(r, c, v)?;
                }
            }
            Some(m)
        } else {
            None
        };
        Ok((out.to_vec(), jacobian))
    }

    fn inverse(&self) -> Option<Arc<dyn NonLinearTransform>> {
        Some(Arc::new(CartesianToEllipsoid { forward: *self }))
    }
}

/// Converts (X, Y, Z) on a unit ellipsoid to (λ, φ[, h]).
///
/// Latitude is found by fixed-point iteration, which converges in a few
/// steps for points near the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartesianToEllipsoid {
    forward: EllipsoidToCartesian,
}

impl CartesianToEllipsoid {
    fn convert(&self, x: f64, y: f64, z: f64) -> TransformResult<[f64; 3]> {
        let e2 = self.forward.eccentricity_squared;
        let lambda = y.atan2(x);
        let p = x.hypot(y);

        let mut phi = z.atan2(p * (1.0 - e2));
        let mut h = 0.0;
        for _ in 0..MAX_ITERATIONS {
            let (sin_phi, cos_phi) = phi.sin_cos();
            let w = (1.0 - e2 * sin_phi * sin_phi).sqrt();
            let nu = 1.0 / w;
            h = p.mul_add(cos_phi, z * sin_phi) - w;
            let next = z.atan2(p * (1.0 - e2 * nu / (nu + h)));
            if (next - phi).abs() <= ANGULAR_TOLERANCE {
                return Ok([lambda, next, h]);
            }
            phi = next;
        }
        debug!(x, y, z, phi, h, "latitude iteration did not converge");
        Err(TransformError::NoConvergence {
            iterations: MAX_ITERATIONS,
        })
    }
}

impl NonLinearTransform for CartesianToEllipsoid {
    fn name(&self) -> &str {
        "Cartesian to ellipsoid"
    }

    fn source_dimensions(&self) -> usize {
        3
    }

    fn target_dimensions(&self) -> usize {
        self.forward.source_dimensions()
    }

    fn transform(
        &self,
        point: &[f64],
        derivative: bool,
    ) -> TransformResult<(Vec<f64>, Option<Matrix>)> {
        let geodetic = self.convert(point[0], point[1], point[2])?;
        let dims = self.target_dimensions();
        let jacobian = if derivative {
            // Inverse of the forward Jacobian at the converted point.
            let (_, j) = self.forward.convert(geodetic[0], geodetic[1], geodetic[2]);
            let forward = Matrix::new(3, 3, &j.concat())?;
            let inverse = forward.inverse()?;
            let rows: Vec<usize> = (0..dims).collect();
            Some(inverse.select_rows(&rows)?)
        } else {
            None
        };
        Ok((geodetic[..dims].to_vec(), jacobian))
    }

    fn inverse(&self) -> Option<Arc<dyn NonLinearTransform>> {
        Some(Arc::new(self.forward))
    }
}

/// Geographic (longitude°, latitude°[, height]) to geocentric (X, Y, Z)
/// conversion on an ellipsoid of the given axis lengths.
///
/// The result is a chain of three steps: a normalization (degrees to
/// radians, height divided by the semi-major axis), the unit-ellipsoid
/// kernel, and a denormalization (multiplication by the semi-major axis).
///
/// # Errors
///
/// Returns [`TransformError::IllegalArgument`] unless
/// `0 < semi_minor <= semi_major` and both are finite.
///
/// # Example
///
/// ```
/// use ref_transform::geodetic_conversion;
///
/// let wgs84 = geodetic_conversion(6_378_137.0, 6_356_752.314_245_179, false)?;
/// assert_eq!(wgs84.steps().len(), 3);
///
/// let xyz = wgs84.transform(&[0.0, 0.0])?;
/// assert!((xyz[0] - 6_378_137.0).abs() < 1e-6);
/// # Ok::<(), ref_transform::TransformError>(())
/// ```
pub fn geodetic_conversion(
    semi_major: f64,
    semi_minor: f64,
    with_height: bool,
) -> TransformResult<MathTransform> {
    if !(semi_major.is_finite() && semi_minor.is_finite() && semi_minor > 0.0 && semi_minor <= semi_major)
    {
        return Err(TransformError::IllegalArgument(format!(
            "axis lengths ({semi_major}, {semi_minor}) must satisfy 0 < semi_minor <= semi_major"
        )));
    }
    let ratio = semi_minor / semi_major;
    let kernel = EllipsoidToCartesian::new(ratio.mul_add(-ratio, 1.0), with_height)?;

    let dim = kernel.source_dimensions();
    let to_radians = DoubleDouble::DEGREES_TO_RADIANS.value();
    let mut normalize = Matrix::identity(dim + 1);
    normalize.set(0, 0, to_radians)?;
    normalize.set(1, 1, to_radians)?;
    if with_height {
        normalize.set(2, 2, 1.0 / semi_major)?;
    }

    let mut denormalize = Matrix::identity(4);
    for i in 0..3 {
        denormalize.set(i, i, semi_major)?;
    }

    let factory = DefaultFactory::default();
    let head = factory.create_concatenated(
        &factory.create_affine(normalize)?,
        &MathTransform::non_linear(Arc::new(kernel))?,
    )?;
    factory.create_concatenated(&head, &factory.create_affine(denormalize)?)
}
