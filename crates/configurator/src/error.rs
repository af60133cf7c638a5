//! Error types for selection-state mutation.
//!
//! Incomplete selections are never errors - they surface as validation
//! results. Errors here are reserved for API misuse at mutation time:
//! referencing a variant, option, or addon that does not exist in the
//! product tree, or selecting a nested level before its parent.
//!
//! Resolution-time lookups are deliberately NOT error-producing: a stale
//! selection that no longer matches the tree (the product was edited after
//! page load) degrades to "not selected" instead of failing.

use thiserror::Error;

/// Errors that can occur when mutating a selection state against a product.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// No variant with this name exists at the referenced level.
    ///
    /// Nested levels report a path such as `"Size - Finish"`.
    #[error("unknown variant: {name}")]
    UnknownVariant {
        /// Variant name or ` - ` separated path.
        name: String,
    },

    /// The named variant exists but has no option with this value.
    #[error("unknown option '{option}' for variant '{variant}'")]
    UnknownOption {
        /// Variant name or ` - ` separated path.
        variant: String,
        /// The option value that failed to resolve.
        option: String,
    },

    /// A nested option was selected before its parent level.
    #[error("no selection for parent variant '{variant}'")]
    MissingParentSelection {
        /// Variant name or ` - ` separated path of the unselected parent.
        variant: String,
    },

    /// No addon with this name exists on the product.
    #[error("unknown addon: {name}")]
    UnknownAddon {
        /// The addon name that failed to resolve.
        name: String,
    },

    /// The named addon exists but has no option with this label.
    #[error("unknown option '{option}' for addon '{addon}'")]
    UnknownAddonOption {
        /// The addon name.
        addon: String,
        /// The option label that failed to resolve.
        option: String,
    },
}

/// Errors that block projecting a configuration into a cart line.
///
/// Produced by the add-to-cart gate in check order: required variants,
/// implicit sub-variant requirements, required addons, then stock. The
/// first failing check is the one reported.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddToCartError {
    /// One or more variants with `required = true` have no selection.
    #[error("required variants not selected: {}", .missing.join(", "))]
    MissingVariants {
        /// Missing variant names in declaration order.
        missing: Vec<String>,
    },

    /// One or more implicitly required sub-variant levels have no selection.
    #[error("required selections incomplete: {}", .missing.join(", "))]
    MissingSubSelections {
        /// ` - ` separated paths to the unselected levels.
        missing: Vec<String>,
    },

    /// One or more required addons have no selected option.
    #[error("required addons not selected: {}", .missing.join(", "))]
    MissingAddons {
        /// Missing addon names in declaration order.
        missing: Vec<String>,
    },

    /// The resolved configuration has no available stock.
    #[error("out of stock")]
    OutOfStock,
}
