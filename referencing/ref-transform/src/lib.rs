//! Composition and dimension separation of coordinate transforms.
//!
//! This crate provides:
//! - [`MathTransform`], a tree of affine maps, concatenations, pass-through
//!   wrappers and opaque [`NonLinearTransform`] leaves
//! - [`TransformFactory`] and [`DefaultFactory`] for building trees with
//!   adjacent affine steps folded and identities elided
//! - [`TransformSeparator`] and [`separate`] for extracting the part of a
//!   transform that maps chosen input dimensions to chosen outputs
//! - [`TransformDescriptor`] for inspecting (and with `serde`, persisting)
//!   the structure of a tree
//! - [`geodetic_conversion`], an ellipsoidal to geocentric conversion used
//!   as a realistic non-linear leaf
//!
//! # Layer 1
//!
//! Depends on `ref-numeric` and `ref-matrix`. Thread-safe: every node is
//! immutable and shared through `Arc`.
//!
//! # Example
//!
//! ```
//! use ref_matrix::Matrix;
//! use ref_transform::{MathTransform, TransformSeparator};
//!
//! // (x, y, t) -> (2x, 3y, t + 10)
//! let t = MathTransform::linear(Matrix::new(4, 4, &[
//!     2.0, 0.0, 0.0,  0.0,
//!     0.0, 3.0, 0.0,  0.0,
//!     0.0, 0.0, 1.0, 10.0,
//!     0.0, 0.0, 0.0,  1.0,
//! ])?)?;
//!
//! let mut separator = TransformSeparator::new(t);
//! separator.add_source_dimensions(&[2])?;
//! let time = separator.separate()?;
//! assert_eq!(separator.target_dimensions()?, &[2]);
//! assert_eq!(time.transform(&[5.0])?, vec![15.0]);
//! # Ok::<(), ref_transform::TransformError>(())
//! ```
//!
//! # Features
//!
//! - `serde`: `Serialize`/`Deserialize` for [`TransformDescriptor`],
//!   [`FactoryParams`] and [`SeparatorParams`]

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod concatenated;
mod descriptor;
mod ellipsoid;
mod error;
mod factory;
mod linear;
mod nonlinear;
mod params;
mod pass_through;
mod separator;
mod transform;

pub use concatenated::ConcatenatedTransform;
pub use descriptor::TransformDescriptor;
pub use ellipsoid::{CartesianToEllipsoid, EllipsoidToCartesian, geodetic_conversion};
pub use error::{ErrorKind, TransformError, TransformResult};
pub use factory::{DefaultFactory, TransformFactory};
pub use linear::LinearTransform;
pub use nonlinear::NonLinearTransform;
pub use params::{FactoryParams, SeparatorParams};
pub use pass_through::PassThroughTransform;
pub use separator::{Separation, TransformSeparator, separate};
pub use transform::MathTransform;
