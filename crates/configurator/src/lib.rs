//! Configurator Engine - Product variant configuration and resolution.
//!
//! The engine takes a product's variant/addon tree and a customer's
//! selection state, and produces four things: a resolved unit price, an
//! available-stock figure, required-selection validation results, and a
//! flattened cart line item. Nothing more: HTTP, persistence, rendering,
//! and payment are collaborators around it.
//!
//! # Data flow
//!
//! Product tree + addons → [`SelectionState`] (mutated by UI events) →
//! [`Configuration`] (price, stock, image) → validation (gates add-to-cart)
//! → [`CartLine`] (serializable line item) → order submission.
//!
//! # Modules
//!
//! - [`model`] - The immutable variant tree and addon data model
//! - [`selection`] - Selection state, mutation operations, auto-selection
//! - [`resolver`] - Pure price/stock/image resolution
//! - [`validator`] - Required-selection checks and the add-to-cart gate
//! - [`cart`] - Projection into a cart line item
//! - [`error`] - Selection and add-to-cart error types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod error;
pub mod model;
pub mod resolver;
pub mod selection;
pub mod validator;

pub use cart::{CartLine, CartLineAddon, CartLineSubSubVariant, CartLineSubVariant, CartLineVariant};
pub use error::{AddToCartError, SelectionError};
pub use model::{
    Addon, AddonOption, LeafNode, OptionBody, Product, SubOption, SubOptionBody, SubSubOption,
    SubSubVariant, SubVariant, Variant, VariantKind, VariantOption,
};
pub use resolver::Configuration;
pub use selection::{
    SelectedAddon, SelectedSubSubVariant, SelectedSubVariant, SelectedVariant, SelectionState,
};
pub use validator::{AddonValidation, CartQuantity, SubSelectionValidation, VariantValidation};
