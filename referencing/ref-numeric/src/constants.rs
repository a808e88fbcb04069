//! Decimal constants whose binary approximation error is known exactly.

/// Decimal values, sorted in strictly increasing order, paired with the
/// difference between the exact decimal and its nearest `f64`.
///
/// Every correction is nonzero: a value that is exactly representable in
/// binary has no reason to be listed.
pub const WELL_KNOWN_VALUES: [(f64, f64); 8] = [
    (0.000_001, 4.525_188_817_411_374e-23),
    (0.000_01, -8.180_305_391_403_131e-22),
    (0.000_1, -4.792_173_602_385_93e-21),
    (0.001, -2.081_668_171_172_168_6e-20),
    (0.01, -2.081_668_171_172_168_4e-19),
    (0.1, -5.551_115_123_125_783e-18),
    (0.3048, -1.536_548_666_081_216_6e-17),
    (0.9, -2.220_446_049_250_313_2e-17),
];

/// Returns the rounding error of `value` if it is the `f64` nearest to one
/// of the [`WELL_KNOWN_VALUES`], or `0.0` otherwise.
///
/// Negative values get the negated correction.
///
/// # Example
///
/// ```
/// use ref_numeric::error_for_well_known_value;
///
/// assert!(error_for_well_known_value(0.1) < 0.0);
/// assert_eq!(error_for_well_known_value(-0.1), -error_for_well_known_value(0.1));
/// assert_eq!(error_for_well_known_value(0.5), 0.0);
/// ```
#[must_use]
pub fn error_for_well_known_value(value: f64) -> f64 {
    let magnitude = value.abs();
    WELL_KNOWN_VALUES
        .binary_search_by(|(known, _)| known.total_cmp(&magnitude))
        .map_or(0.0, |i| {
            let error = WELL_KNOWN_VALUES[i].1;
            if value.is_sign_negative() { -error } else { error }
        })
}
