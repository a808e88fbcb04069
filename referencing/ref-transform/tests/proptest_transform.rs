//! Property-based tests for transform trees.
//!
//! Run with: cargo test -p ref-transform -- proptest

#![allow(clippy::unwrap_used)]
#![allow(clippy::float_cmp)]

use proptest::prelude::*;
use ref_matrix::Matrix;
use ref_transform::{MathTransform, TransformSeparator, geodetic_conversion};

// =============================================================================
// Strategies
// =============================================================================

/// A well-conditioned invertible affine transform of dimension `dim`.
fn arb_affine(dim: usize) -> impl Strategy<Value = MathTransform> {
    let diagonal = prop::collection::vec(1.0..10.0f64, dim);
    let off = prop::collection::vec(-0.2..0.2f64, dim * dim);
    let translation = prop::collection::vec(-100.0..100.0f64, dim);
    (diagonal, off, translation).prop_map(move |(diagonal, off, translation)| {
        let mut m = Matrix::identity(dim + 1);
        for r in 0..dim {
            for c in 0..dim {
                let v = if r == c { diagonal[r] } else { off[r * dim + c] };
                m.set(r, c, v).unwrap();
            }
            m.set(r, dim, translation[r]).unwrap();
        }
        MathTransform::linear(m).unwrap()
    })
}

/// A tree mixing concatenations, pass-through wrappers and a non-linear
/// leaf, with 4 source and 4 target dimensions.
fn arb_tree() -> impl Strategy<Value = MathTransform> {
    (arb_affine(4), arb_affine(4), 0..=1usize).prop_map(|(before, after, offset)| {
        let leaf = geodetic_conversion(1.0, 0.996_647_189_335_253, true).unwrap();
        let middle = MathTransform::pass_through(offset, &leaf, 1 - offset).unwrap();
        let head = MathTransform::concatenate(&before, &middle).unwrap();
        MathTransform::concatenate(&head, &after).unwrap()
    })
}

/// A tree like [`arb_tree`] whose leading step is a pure scaling, so that
/// points from [`arb_point`] stay inside the geodetic leaf's domain. Also
/// yields the leaf's offset.
fn arb_invertible_tree() -> impl Strategy<Value = (MathTransform, usize)> {
    let scales = prop::collection::vec(0.5..1.5f64, 4);
    (scales, arb_affine(4), 0..=1usize).prop_map(|(scales, after, offset)| {
        let mut m = Matrix::identity(5);
        for (i, s) in scales.iter().enumerate() {
            m.set(i, i, *s).unwrap();
        }
        let before = MathTransform::linear(m).unwrap();
        let leaf = geodetic_conversion(1.0, 0.996_647_189_335_253, true).unwrap();
        let middle = MathTransform::pass_through(offset, &leaf, 1 - offset).unwrap();
        let head = MathTransform::concatenate(&before, &middle).unwrap();
        (MathTransform::concatenate(&head, &after).unwrap(), offset)
    })
}

/// Longitude and latitude in degrees, a small height, and one free
/// coordinate.
fn arb_point() -> impl Strategy<Value = Vec<f64>> {
    (-30.0..30.0f64, -30.0..30.0f64, -0.01..0.01f64, -5.0..5.0f64)
        .prop_map(|(a, b, c, d)| vec![a, b, c, d])
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn proptest_affine_inverse_round_trip(t in arb_affine(3), p in prop::collection::vec(-100.0..100.0f64, 3)) {
        let back = t.inverse().unwrap().transform(&t.transform(&p).unwrap()).unwrap();
        for (a, b) in back.iter().zip(&p) {
            prop_assert!((a - b).abs() <= 1e-9, "{} != {}", a, b);
        }
    }

    #[test]
    fn proptest_pass_through_inverse_round_trip(offset in 0..=1usize, p in arb_point()) {
        let leaf = geodetic_conversion(1.0, 0.996_647_189_335_253, true).unwrap();
        let t = MathTransform::pass_through(offset, &leaf, 1 - offset).unwrap();
        // Keep the geodetic coordinates in range wherever the leaf sits.
        let mut point = p;
        point.rotate_right(offset);
        let back = t.inverse().unwrap().transform(&t.transform(&point).unwrap()).unwrap();
        for (a, b) in back.iter().zip(&point) {
            prop_assert!((a - b).abs() <= 1e-8, "{} != {}", a, b);
        }
    }

    #[test]
    fn proptest_geodetic_inverse_round_trip(lon in -60.0..60.0f64, lat in -60.0..60.0f64, h in -1000.0..1000.0f64) {
        let t = geodetic_conversion(6_378_137.0, 6_356_752.314_245_179, true).unwrap();
        let p = [lon, lat, h];
        let back = t.inverse().unwrap().transform(&t.transform(&p).unwrap()).unwrap();
        prop_assert!((back[0] - lon).abs() <= 1e-9, "{} != {}", back[0], lon);
        prop_assert!((back[1] - lat).abs() <= 1e-9, "{} != {}", back[1], lat);
        prop_assert!((back[2] - h).abs() <= 1e-6, "{} != {}", back[2], h);
    }

    #[test]
    fn proptest_tree_inverse_round_trip((t, offset) in arb_invertible_tree(), p in arb_point()) {
        let mut point = p;
        point.rotate_right(offset);
        let inverse = t.inverse().unwrap();
        prop_assert_eq!(inverse.steps().len(), t.steps().len());
        let back = inverse.transform(&t.transform(&point).unwrap()).unwrap();
        for (a, b) in back.iter().zip(&point) {
            prop_assert!((a - b).abs() <= 1e-8, "{} != {}", a, b);
        }
    }

    #[test]
    fn proptest_empty_request_returns_same_transform(t in arb_tree()) {
        let mut s = TransformSeparator::new(t.clone());
        let result = s.separate().unwrap();
        prop_assert!(result.ptr_eq(&t));
        prop_assert_eq!(s.source_dimensions().unwrap(), &[0, 1, 2, 3]);
        prop_assert_eq!(s.target_dimensions().unwrap(), &[0, 1, 2, 3]);
    }

    #[test]
    fn proptest_affine_empty_request_returns_same_transform(t in arb_affine(3)) {
        let mut s = TransformSeparator::new(t.clone());
        prop_assert!(s.separate().unwrap().ptr_eq(&t));
    }

    #[test]
    fn proptest_linear_target_filter_keeps_rows(t in arb_affine(3), row in 0..3usize, p in prop::collection::vec(-100.0..100.0f64, 3)) {
        let mut s = TransformSeparator::new(t.clone());
        s.add_target_dimensions(&[row]).unwrap();
        let reduced = s.separate().unwrap();
        let full = t.transform(&p).unwrap();
        prop_assert_eq!(reduced.transform(&p).unwrap(), vec![full[row]]);
    }
}
