//! Extended-precision scalar arithmetic for coordinate transforms.
//!
//! This crate provides:
//! - [`DoubleDouble`], an unevaluated sum of two `f64` giving about 106 bits
//!   of significand, used wherever matrix coefficients are combined
//!   (products, inversions) and trailing bits must survive
//! - [`error_for_well_known_value`], the exact binary rounding error of a
//!   few decimal constants that appear in unit conversions (`0.3048`, `0.1`, …)
//! - [`ulp`] and [`magnitude`] floating-point helpers
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with zero dependencies.
//!
//! # Example
//!
//! ```
//! use ref_numeric::DoubleDouble;
//!
//! // 0.1 is not representable in binary; from_literal recovers the lost bits.
//! let tenth = DoubleDouble::from_literal(0.1);
//! let one = tenth * DoubleDouble::new(10.0);
//! assert_eq!(one.value(), 1.0);
//! assert!(one.error().abs() < 1e-30);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod constants;
mod double_double;
mod functions;

pub use constants::{WELL_KNOWN_VALUES, error_for_well_known_value};
pub use double_double::DoubleDouble;
pub use functions::{magnitude, ulp};
