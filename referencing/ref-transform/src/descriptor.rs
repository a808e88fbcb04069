//! Plain-data description of transform trees.

use ref_matrix::Matrix;

use crate::transform::MathTransform;

/// The structure of a transform tree: variant tags, matrix contents,
/// pass-through offsets and children.
///
/// Two trees with equal descriptors compute the same function, except for
/// non-linear leaves which are identified by name and dimensions only.
/// With the `serde` feature the descriptor can be persisted.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum TransformDescriptor {
    /// Affine map.
    Linear {
        /// Homogeneous matrix.
        matrix: Matrix,
    },
    /// `second ∘ first`.
    Concatenated {
        /// Step applied first.
        first: Box<TransformDescriptor>,
        /// Step applied second.
        second: Box<TransformDescriptor>,
    },
    /// Sub-transform on a range of dimensions.
    PassThrough {
        /// Index of the first affected dimension.
        first_affected_ordinate: usize,
        /// Wrapped transform.
        sub_transform: Box<TransformDescriptor>,
        /// Number of trailing pass-through dimensions.
        num_trailing_ordinates: usize,
    },
    /// Opaque leaf.
    NonLinear {
        /// Name reported by the leaf.
        name: String,
        /// Number of input dimensions.
        source_dimensions: usize,
        /// Number of output dimensions.
        target_dimensions: usize,
    },
}

impl TransformDescriptor {
    /// Describes `transform`.
    #[must_use]
    pub fn of(transform: &MathTransform) -> Self {
        match transform {
            MathTransform::Linear(t) => Self::Linear {
                matrix: t.matrix().clone(),
            },
            MathTransform::Concatenated(t) => Self::Concatenated {
                first: Box::new(Self::of(t.first())),
                second: Box::new(Self::of(t.second())),
            },
            MathTransform::PassThrough(t) => Self::PassThrough {
                first_affected_ordinate: t.first_affected_ordinate(),
                sub_transform: Box::new(Self::of(t.sub_transform())),
                num_trailing_ordinates: t.num_trailing_ordinates(),
            },
            MathTransform::NonLinear(t) => Self::NonLinear {
                name: t.name().to_string(),
                source_dimensions: t.source_dimensions(),
                target_dimensions: t.target_dimensions(),
            },
        }
    }

    /// Number of leaves (linear or non-linear nodes) in the tree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Linear { .. } | Self::NonLinear { .. } => 1,
            Self::Concatenated { first, second } => first.leaf_count() + second.leaf_count(),
            Self::PassThrough { sub_transform, .. } => sub_transform.leaf_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DefaultFactory, FactoryParams, TransformFactory};

    #[test]
    fn describes_nested_tree() {
        let factory = DefaultFactory::new(FactoryParams::verbatim());
        let a = MathTransform::identity(2).unwrap();
        let b = MathTransform::linear(Matrix::new(3, 3, &[2.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0]).unwrap())
            .unwrap();
        let t = factory.create_concatenated(&a, &b).unwrap();
        let d = t.describe();
        assert_eq!(d.leaf_count(), 2);
        match d {
            TransformDescriptor::Concatenated { first, second } => {
                assert_eq!(
                    *first,
                    TransformDescriptor::Linear {
                        matrix: Matrix::identity(3)
                    }
                );
                assert!(matches!(*second, TransformDescriptor::Linear { .. }));
            }
            other => panic!("unexpected descriptor {other:?}"),
        }
    }

    #[test]
    fn equal_trees_have_equal_descriptors() {
        let a = MathTransform::identity(3).unwrap();
        let b = MathTransform::identity(3).unwrap();
        assert!(!a.ptr_eq(&b));
        assert_eq!(a.describe(), b.describe());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn descriptor_serialization() {
        let leaf = crate::geodetic_conversion(1.0, 0.996_647_189_335_253, true).unwrap();
        let factory = DefaultFactory::new(FactoryParams::verbatim());
        let wrapped = factory.create_pass_through(0, &leaf, 1).unwrap();
        let t = factory
            .create_concatenated(&MathTransform::identity(4).unwrap(), &wrapped)
            .unwrap();
        let d = t.describe();

        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"kind\":\"pass_through\""));
        let parsed: TransformDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, d);
        assert_eq!(parsed.leaf_count(), d.leaf_count());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn params_serialization() {
        let factory = FactoryParams::verbatim();
        let json = serde_json::to_string(&factory).unwrap();
        assert_eq!(serde_json::from_str::<FactoryParams>(&json).unwrap(), factory);

        let separator = crate::SeparatorParams::default();
        let json = serde_json::to_string(&separator).unwrap();
        assert_eq!(serde_json::from_str::<crate::SeparatorParams>(&json).unwrap(), separator);
    }
}
