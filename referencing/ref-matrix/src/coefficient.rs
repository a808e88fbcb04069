//! Tagged view of matrix coefficients.
//!
//! Matrices store plain `f64`. A `NaN` coefficient means "not determined":
//! the transform that produced the matrix could not tell how an output
//! depends on an input. [`Coefficient`] makes that convention explicit for
//! code that reasons about dependencies between dimensions.

/// A matrix coefficient, either known or left unconstrained (stored as `NaN`).
///
/// # Example
///
/// ```
/// use ref_matrix::Coefficient;
///
/// assert_eq!(Coefficient::from(2.5), Coefficient::Known(2.5));
/// assert_eq!(Coefficient::from(f64::NAN), Coefficient::Unconstrained);
/// assert!(Coefficient::Unconstrained.is_ignorable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coefficient {
    /// A determined value.
    Known(f64),
    /// A value that is not determined; it neither proves nor rules out a
    /// dependency.
    Unconstrained,
}

impl Coefficient {
    /// The stored representation: the known value, or `NaN`.
    #[must_use]
    pub const fn value(self) -> f64 {
        match self {
            Self::Known(v) => v,
            Self::Unconstrained => f64::NAN,
        }
    }

    /// Returns `true` for a known zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        matches!(self, Self::Known(v) if v == 0.0)
    }

    /// Returns `true` if this coefficient does not establish a dependency:
    /// a known zero, or an unconstrained value.
    #[must_use]
    pub fn is_ignorable(self) -> bool {
        match self {
            Self::Known(v) => v == 0.0,
            Self::Unconstrained => true,
        }
    }
}

impl From<f64> for Coefficient {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Self::Unconstrained
        } else {
            Self::Known(value)
        }
    }
}

impl From<Coefficient> for f64 {
    fn from(c: Coefficient) -> Self {
        c.value()
    }
}
