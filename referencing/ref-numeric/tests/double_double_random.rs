//! Randomized tests for double-double arithmetic.
//!
//! Every operation is checked on 1000 random operands. Exactness of sums is
//! checked against the alternative error-free transformation, exactness of
//! products against the fused multiply-add residual.
//!
//! Run with: cargo test -p ref-numeric --test double_double_random

#![allow(clippy::unwrap_used)]
#![allow(clippy::float_cmp)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ref_numeric::{DoubleDouble, ulp};

const NUM_ITERATIONS: usize = 1000;

/// Random values spanning a few binary orders of magnitude.
fn next_random(rng: &mut StdRng) -> f64 {
    rng.r#gen::<f64>() * 2048.0 - 1024.0
}

/// Returns `(a, b)` with `|a| >= |b|`.
fn ordered_pair(rng: &mut StdRng) -> (f64, f64) {
    let a = next_random(rng);
    let b = next_random(rng);
    if a.abs() < b.abs() { (b, a) } else { (a, b) }
}

fn assert_normalized_and_equals(expected: f64, actual: DoubleDouble) {
    assert!(
        actual.error().abs() <= ulp(actual.value()),
        "not normalized: {actual}"
    );
    assert_eq!(actual.value(), expected, "unexpected arithmetic result");
}

#[test]
fn quick_sum_is_exact_and_normalized() {
    let mut rng = StdRng::seed_from_u64(0x5EED_0001);
    for _ in 0..NUM_ITERATIONS {
        let (a, b) = ordered_pair(&mut rng);
        let dd = DoubleDouble::quick_sum(a, b).normalize();
        assert_normalized_and_equals(a + b, dd);
        assert_eq!(dd, DoubleDouble::sum(a, b));
    }
}

#[test]
fn normalize_of_raw_parts() {
    let mut rng = StdRng::seed_from_u64(0x5EED_0002);
    for _ in 0..NUM_ITERATIONS {
        let (a, b) = ordered_pair(&mut rng);
        let dd = DoubleDouble::from_parts(a, b).normalize();
        assert_normalized_and_equals(a + b, dd);
    }
}

#[test]
fn sum_is_exact_for_any_order() {
    let mut rng = StdRng::seed_from_u64(0x5EED_0003);
    for _ in 0..NUM_ITERATIONS {
        let a = next_random(&mut rng);
        let b = next_random(&mut rng);
        let dd = DoubleDouble::sum(a, b);
        assert_normalized_and_equals(a + b, dd);
        // Recovering either operand from the exact sum is itself exact.
        let back = dd - DoubleDouble::new(b);
        assert_eq!(back.value(), a);
    }
}

#[test]
fn product_is_exact() {
    let mut rng = StdRng::seed_from_u64(0x5EED_0004);
    for _ in 0..NUM_ITERATIONS {
        let a = next_random(&mut rng);
        let b = next_random(&mut rng);
        let dd = DoubleDouble::product(a, b);
        assert_normalized_and_equals(a * b, dd);
        assert_eq!(dd.error(), a.mul_add(b, -(a * b)));
    }
}

#[test]
fn add_then_subtract_round_trips() {
    let mut rng = StdRng::seed_from_u64(0x5EED_0005);
    for _ in 0..NUM_ITERATIONS {
        let x = DoubleDouble::sum(next_random(&mut rng), next_random(&mut rng));
        let y = DoubleDouble::sum(next_random(&mut rng), next_random(&mut rng));
        let back = (x + y) - y;
        let tolerance = (x.value().abs() + y.value().abs()) * 1e-29;
        assert!(
            (back - x).value().abs() <= tolerance,
            "{x} + {y} - {y} = {back}"
        );
    }
}

#[test]
fn multiply_then_divide_round_trips() {
    let mut rng = StdRng::seed_from_u64(0x5EED_0006);
    for _ in 0..NUM_ITERATIONS {
        let x = DoubleDouble::sum(next_random(&mut rng), next_random(&mut rng));
        let y = DoubleDouble::sum(next_random(&mut rng), next_random(&mut rng));
        if y.value() == 0.0 {
            continue;
        }
        let back = (x * y) / y;
        let tolerance = ulp(x.value()) * 1e-12;
        assert!(
            (back - x).value().abs() <= tolerance,
            "{x} * {y} / {y} = {back}"
        );
    }
}

#[test]
fn divide_matches_plain_division_after_rounding() {
    let mut rng = StdRng::seed_from_u64(0x5EED_0007);
    for _ in 0..NUM_ITERATIONS {
        let a = next_random(&mut rng);
        let b = next_random(&mut rng);
        if b == 0.0 {
            continue;
        }
        let q = DoubleDouble::new(a) / DoubleDouble::new(b);
        assert!(q.error().abs() <= ulp(q.value()));
        assert!((q.value() - a / b).abs() <= ulp(a / b));
    }
}
