//! Floating-point helpers.

use crate::DoubleDouble;

/// Returns the size of a unit in the last place of `x`: the distance from
/// `|x|` to the next representable value of larger magnitude.
///
/// `NaN` gives `NaN` and infinities give positive infinity.
///
/// # Example
///
/// ```
/// use ref_numeric::ulp;
///
/// assert_eq!(ulp(1.0), f64::EPSILON);
/// assert_eq!(ulp(-1.0), f64::EPSILON);
/// ```
#[must_use]
pub fn ulp(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    let a = x.abs();
    if a.is_infinite() {
        return f64::INFINITY;
    }
    if a == f64::MAX {
        return a - f64::from_bits(a.to_bits() - 1);
    }
    f64::from_bits(a.to_bits() + 1) - a
}

/// Returns the Euclidean norm of `values`, accumulated in double-double
/// precision before the final rounding.
///
/// # Example
///
/// ```
/// use ref_numeric::magnitude;
///
/// assert_eq!(magnitude(&[3.0, 4.0]), 5.0);
/// assert_eq!(magnitude(&[]), 0.0);
/// ```
#[must_use]
pub fn magnitude(values: &[f64]) -> f64 {
    values
        .iter()
        .fold(DoubleDouble::ZERO, |sum, &v| sum + DoubleDouble::product(v, v))
        .sqrt()
        .value()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ulp_of_powers_of_two() {
        assert_eq!(ulp(2.0), 2.0 * f64::EPSILON);
        assert_eq!(ulp(0.5), f64::EPSILON / 2.0);
    }

    #[test]
    fn ulp_special_values() {
        assert!(ulp(f64::NAN).is_nan());
        assert_eq!(ulp(f64::NEG_INFINITY), f64::INFINITY);
        assert_eq!(ulp(0.0), f64::from_bits(1));
        assert!(ulp(f64::MAX).is_finite());
    }

    #[test]
    fn magnitude_of_single_value() {
        assert_eq!(magnitude(&[-7.0]), 7.0);
    }

    #[test]
    fn magnitude_of_unit_vector() {
        let h = std::f64::consts::FRAC_1_SQRT_2;
        assert!((magnitude(&[h, h]) - 1.0).abs() <= f64::EPSILON);
    }
}
