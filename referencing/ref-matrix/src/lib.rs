//! Dense matrices for affine coordinate transforms.
//!
//! This crate provides:
//! - [`Matrix`], a `rows × cols` matrix of `f64` with products accumulated
//!   in double-double precision
//! - Inversion by Gauss-Jordan elimination in double-double precision, with
//!   an exact `[0, …, 0, 1]` last row for affine matrices
//! - Row and column selection for building sub-matrices
//! - [`Coefficient`], a tagged view of elements where `NaN` means
//!   "not determined"
//! - [`Matrix::force_uniform_scale`] for aspect-ratio preserving adjustments
//!
//! # Layer 0
//!
//! Depends only on `nalgebra` for storage and LU determinants.
//!
//! # Example
//!
//! ```
//! use ref_matrix::Matrix;
//!
//! // Swap axes, scale by 0.5 and translate.
//! let m = Matrix::new(3, 3, &[
//!     0.0, 0.5,  -90.0,
//!     0.5, 0.0, -180.0,
//!     0.0, 0.0,    1.0,
//! ])?;
//! let inverse = m.inverse()?;
//! assert_eq!(inverse.row(0), Some(vec![0.0, 2.0, 360.0]));
//! assert!(inverse.is_affine());
//! # Ok::<(), ref_matrix::MatrixError>(())
//! ```
//!
//! # Features
//!
//! - `serde`: `Serialize`/`Deserialize` for [`Matrix`]

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod coefficient;
mod error;
mod matrix;
mod scale;
mod solver;

pub use coefficient::Coefficient;
pub use error::{MatrixError, MatrixResult};
pub use matrix::Matrix;
