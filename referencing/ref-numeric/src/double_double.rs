//! Double-double arithmetic.
//!
//! A [`DoubleDouble`] represents `value + error` as an unevaluated sum where
//! `value` is the correctly rounded `f64` result and `|error| <= ulp(value)`.
//! The algorithms are the classical error-free transformations (Knuth's
//! two-sum, Dekker's fast two-sum, fused multiply-add for exact products).

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::constants::error_for_well_known_value;

/// An extended-precision scalar stored as the unevaluated sum of two `f64`.
///
/// Every arithmetic operation returns a new normalized value; instances are
/// never partially updated.
///
/// # Example
///
/// ```
/// use ref_numeric::DoubleDouble;
///
/// let a = DoubleDouble::sum(1.0, 1e-20);
/// assert_eq!(a.value(), 1.0);
/// assert_eq!(a.error(), 1e-20);
///
/// let b = a - DoubleDouble::new(1.0);
/// assert_eq!(b.value(), 1e-20);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DoubleDouble {
    value: f64,
    error: f64,
}

impl DoubleDouble {
    /// Zero.
    pub const ZERO: Self = Self::new(0.0);

    /// One.
    pub const ONE: Self = Self::new(1.0);

    /// The π/180 conversion factor from degrees to radians.
    pub const DEGREES_TO_RADIANS: Self = Self {
        value: 0.017_453_292_519_943_295,
        error: 2.948_652_270_870_168_7e-19,
    };

    /// Creates a value with no error term.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self { value, error: 0.0 }
    }

    /// Creates a value from its two parts without normalizing them.
    ///
    /// Call [`normalize`](Self::normalize) if `|error|` may exceed one ulp of
    /// `value`.
    #[must_use]
    pub const fn from_parts(value: f64, error: f64) -> Self {
        Self { value, error }
    }

    /// Creates a value from a decimal literal, recovering the binary rounding
    /// error when the literal is one of the well-known constants.
    #[must_use]
    pub fn from_literal(value: f64) -> Self {
        Self {
            value,
            error: error_for_well_known_value(value),
        }
    }

    /// The exact sum `a + b` for arbitrary magnitudes (two-sum).
    #[must_use]
    pub fn sum(a: f64, b: f64) -> Self {
        let value = a + b;
        if !value.is_finite() {
            return Self::new(value);
        }
        let v = value - a;
        Self {
            value,
            error: (a - (value - v)) + (b - v),
        }
    }

    /// The exact sum `a + b`, assuming `|a| >= |b|` (fast two-sum).
    ///
    /// The result is wrong if the assumption does not hold; use
    /// [`sum`](Self::sum) when the order of magnitudes is unknown.
    #[must_use]
    pub fn quick_sum(a: f64, b: f64) -> Self {
        let value = a + b;
        if !value.is_finite() {
            return Self::new(value);
        }
        Self {
            value,
            error: b - (value - a),
        }
    }

    /// The exact product `a * b`.
    #[must_use]
    pub fn product(a: f64, b: f64) -> Self {
        let value = a * b;
        if !value.is_finite() {
            return Self::new(value);
        }
        Self {
            value,
            error: a.mul_add(b, -value),
        }
    }

    /// The rounded `f64` value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.value
    }

    /// The error term to add to [`value`](Self::value) for the extended result.
    #[must_use]
    pub const fn error(self) -> f64 {
        self.error
    }

    /// Re-establishes `|error| <= ulp(value)` with `value` equal to the
    /// rounded sum of both parts.
    ///
    /// Assumes `|value| >= |error|`, which holds for every result of this type.
    #[must_use]
    pub fn normalize(self) -> Self {
        Self::quick_sum(self.value, self.error)
    }

    /// Returns `true` if both parts are zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.value == 0.0 && self.error == 0.0
    }

    /// Returns `numerator / self`.
    #[must_use]
    pub fn inverse_divide(self, numerator: Self) -> Self {
        numerator / self
    }

    /// The square root, or `NaN` for negative values.
    #[must_use]
    pub fn sqrt(self) -> Self {
        if self.value <= 0.0 {
            return if self.value == 0.0 {
                Self::ZERO
            } else {
                Self::new(f64::NAN)
            };
        }
        let root = self.value.sqrt();
        let square = Self::product(root, root);
        let residual = (self - square).value;
        Self::quick_sum(root, residual / (2.0 * root))
    }

    /// Product with a plain `f64`.
    fn mul_f64(self, b: f64) -> Self {
        let p = Self::product(self.value, b);
        if !p.value.is_finite() {
            return p;
        }
        Self::quick_sum(p.value, p.error + self.error * b)
    }
}

impl From<f64> for DoubleDouble {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<DoubleDouble> for f64 {
    fn from(dd: DoubleDouble) -> Self {
        dd.value
    }
}

impl Add for DoubleDouble {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        let s = Self::sum(self.value, other.value);
        if !s.value.is_finite() {
            return s;
        }
        let t = Self::sum(self.error, other.error);
        let s = Self::quick_sum(s.value, s.error + t.value);
        Self::quick_sum(s.value, s.error + t.error)
    }
}

impl Sub for DoubleDouble {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self + (-other)
    }
}

impl Neg for DoubleDouble {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            value: -self.value,
            error: -self.error,
        }
    }
}

impl Mul for DoubleDouble {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        let p = Self::product(self.value, other.value);
        if !p.value.is_finite() {
            return p;
        }
        let cross = self.value.mul_add(other.error, self.error * other.value);
        Self::quick_sum(p.value, p.error + cross)
    }
}

impl Div for DoubleDouble {
    type Output = Self;

    fn div(self, other: Self) -> Self {
        let q1 = self.value / other.value;
        if !q1.is_finite() {
            return Self::new(q1);
        }
        let r = self - other.mul_f64(q1);
        let q2 = r.value / other.value;
        let r = r - other.mul_f64(q2);
        let q3 = r.value / other.value;
        Self::quick_sum(q1, q2) + Self::new(q3)
    }
}

impl AddAssign for DoubleDouble {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl SubAssign for DoubleDouble {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl MulAssign for DoubleDouble {
    fn mul_assign(&mut self, other: Self) {
        *self = *self * other;
    }
}

impl fmt::Display for DoubleDouble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:+e})", self.value, self.error)
    }
}
