//! Configuration for transform construction and separation.

/// Options of [`DefaultFactory`](crate::DefaultFactory).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FactoryParams {
    /// Multiply adjacent linear steps of a concatenation into one matrix.
    /// When `false`, each linear step stays its own node. Default: true
    pub fold_linear: bool,

    /// Drop identity linear steps from concatenations. Default: true
    pub elide_identity: bool,
}

impl Default for FactoryParams {
    fn default() -> Self {
        Self {
            fold_linear: true,
            elide_identity: true,
        }
    }
}

impl FactoryParams {
    /// Params that build every node as requested, without simplification.
    #[must_use]
    pub const fn verbatim() -> Self {
        Self {
            fold_linear: false,
            elide_identity: false,
        }
    }

    /// Set the linear folding option.
    #[must_use]
    pub const fn with_fold_linear(mut self, fold: bool) -> Self {
        self.fold_linear = fold;
        self
    }

    /// Set the identity elision option.
    #[must_use]
    pub const fn with_elide_identity(mut self, elide: bool) -> Self {
        self.elide_identity = elide;
        self
    }
}

/// Options of [`TransformSeparator`](crate::TransformSeparator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeparatorParams {
    /// When no source dimension is requested, drop the source dimensions
    /// that no kept output depends on. Default: false
    pub trim_source_dimensions: bool,
}

impl SeparatorParams {
    /// Set the source trimming option.
    #[must_use]
    pub const fn with_trim_source_dimensions(mut self, trim: bool) -> Self {
        self.trim_source_dimensions = trim;
        self
    }
}
