//! Product variant tree and addon data model.
//!
//! A product carries an ordered list of [`Variant`]s, each offering a set of
//! options. An option either is a **leaf** (it carries the price modifier and
//! stock count that resolution actually uses) or nests another level of
//! variants. The tree has a fixed maximum depth of three variant levels:
//! variant → sub-variant → sub-sub-variant.
//!
//! The leaf/non-leaf distinction is a type-level invariant: option bodies are
//! sum types ([`OptionBody`], [`SubOptionBody`]), so a nested option simply
//! has no stock or price modifier to misuse. The JSON wire shape still
//! carries flat `priceModifier`/`stock`/`subVariants` fields (the catalog API
//! contract); raw conversion structs bridge the two representations, and a
//! nested option's own stock/modifier fields are dropped at parse time as
//! don't-care values.
//!
//! Everything in this module is immutable product master data. It is
//! created and edited by admin tooling, and read-only to the engine.

use configurator_core::{CurrencyCode, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Product
// =============================================================================

/// A product as the engine sees it: base price plus the variant/addon tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Undiscounted base price; sale percentages are applied by the cart
    /// projector, never baked into the tree.
    pub base_price: Decimal,
    #[serde(default)]
    pub currency_code: CurrencyCode,
    /// Product-level stock, consulted only when the product has no variants.
    #[serde(default)]
    pub stock: u32,
    /// Default image list, the fallback when no selected node carries one.
    #[serde(default)]
    pub images: Vec<String>,
    /// Display order is declaration order; names are unique per product.
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub addons: Vec<Addon>,
}

impl Product {
    /// Look up a variant by name.
    #[must_use]
    pub fn variant(&self, name: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Look up an addon by name.
    #[must_use]
    pub fn addon(&self, name: &str) -> Option<&Addon> {
        self.addons.iter().find(|a| a.name == name)
    }
}

// =============================================================================
// Variant levels
// =============================================================================

/// How a variant is presented to the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    Color,
    Text,
    Size,
    #[default]
    Dropdown,
}

/// A top-level variant: a named, mutually exclusive choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: VariantKind,
    /// Only top-level variants carry an explicit required flag; nested
    /// levels are implicitly required by existing at all.
    #[serde(default)]
    pub required: bool,
    pub options: Vec<VariantOption>,
}

impl Variant {
    /// Look up an option by its value.
    #[must_use]
    pub fn option(&self, value: &str) -> Option<&VariantOption> {
        self.options.iter().find(|o| o.value == value)
    }
}

/// Stock and price data carried by a leaf node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LeafNode {
    /// Signed delta applied to the base price. Negative modifiers are legal
    /// and are not clamped by the resolver.
    pub price_modifier: Decimal,
    pub stock: u32,
}

/// Body of a top-level option: either a leaf or another variant level.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionBody {
    Leaf(LeafNode),
    Nested(Vec<SubVariant>),
}

/// An option of a top-level variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawVariantOption", into = "RawVariantOption")]
pub struct VariantOption {
    pub label: String,
    pub value: String,
    pub image: Option<String>,
    pub body: OptionBody,
}

impl VariantOption {
    /// Leaf data, if this option is a leaf.
    #[must_use]
    pub const fn leaf(&self) -> Option<&LeafNode> {
        match &self.body {
            OptionBody::Leaf(leaf) => Some(leaf),
            OptionBody::Nested(_) => None,
        }
    }

    /// Nested sub-variants; empty for a leaf option.
    #[must_use]
    pub fn sub_variants(&self) -> &[SubVariant] {
        match &self.body {
            OptionBody::Leaf(_) => &[],
            OptionBody::Nested(subs) => subs,
        }
    }

    /// Look up a nested sub-variant by name.
    #[must_use]
    pub fn sub_variant(&self, name: &str) -> Option<&SubVariant> {
        self.sub_variants().iter().find(|sv| sv.name == name)
    }
}

/// A second-level variant nested under an option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubVariant {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: VariantKind,
    pub options: Vec<SubOption>,
}

impl SubVariant {
    /// Look up an option by its value.
    #[must_use]
    pub fn option(&self, value: &str) -> Option<&SubOption> {
        self.options.iter().find(|o| o.value == value)
    }
}

/// Body of a second-level option: leaf or the final variant level.
#[derive(Debug, Clone, PartialEq)]
pub enum SubOptionBody {
    Leaf(LeafNode),
    Nested(Vec<SubSubVariant>),
}

/// An option of a sub-variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSubOption", into = "RawSubOption")]
pub struct SubOption {
    pub label: String,
    pub value: String,
    pub image: Option<String>,
    pub body: SubOptionBody,
}

impl SubOption {
    /// Leaf data, if this option is a leaf.
    #[must_use]
    pub const fn leaf(&self) -> Option<&LeafNode> {
        match &self.body {
            SubOptionBody::Leaf(leaf) => Some(leaf),
            SubOptionBody::Nested(_) => None,
        }
    }

    /// Nested sub-sub-variants; empty for a leaf option.
    #[must_use]
    pub fn sub_sub_variants(&self) -> &[SubSubVariant] {
        match &self.body {
            SubOptionBody::Leaf(_) => &[],
            SubOptionBody::Nested(subs) => subs,
        }
    }

    /// Look up a nested sub-sub-variant by name.
    #[must_use]
    pub fn sub_sub_variant(&self, name: &str) -> Option<&SubSubVariant> {
        self.sub_sub_variants().iter().find(|sv| sv.name == name)
    }
}

/// The third and final variant level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubSubVariant {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: VariantKind,
    pub options: Vec<SubSubOption>,
}

impl SubSubVariant {
    /// Look up an option by its value.
    #[must_use]
    pub fn option(&self, value: &str) -> Option<&SubSubOption> {
        self.options.iter().find(|o| o.value == value)
    }
}

/// An option at the deepest level. Always a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubSubOption {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub price_modifier: Decimal,
    #[serde(default)]
    pub stock: u32,
}

impl SubSubOption {
    /// Leaf data. Deepest-level options are leaves by construction.
    #[must_use]
    pub const fn leaf(&self) -> LeafNode {
        LeafNode {
            price_modifier: self.price_modifier,
            stock: self.stock,
        }
    }
}

// =============================================================================
// Addons
// =============================================================================

/// A quantity-bearing extra, independent of the variant tree.
///
/// Addons are additive line items, not mutually exclusive choices: a
/// customer can take several options of the same addon at once, each with
/// its own quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Addon {
    pub name: String,
    pub options: Vec<AddonOption>,
}

impl Addon {
    /// Look up an option by its label.
    #[must_use]
    pub fn option(&self, label: &str) -> Option<&AddonOption> {
        self.options.iter().find(|o| o.label == label)
    }

    /// Whether any option of this addon is flagged required.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.options.iter().any(|o| o.required)
    }
}

/// One choice within an addon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonOption {
    pub label: String,
    /// Per-unit price, added to the final price multiplied by quantity.
    pub price: Decimal,
    #[serde(default)]
    pub required: bool,
}

// =============================================================================
// Wire-shape conversions
// =============================================================================

/// Flat wire shape for a top-level option, as the catalog API sends it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVariantOption {
    label: String,
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(default)]
    price_modifier: Decimal,
    #[serde(default)]
    stock: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    sub_variants: Vec<SubVariant>,
}

impl From<RawVariantOption> for VariantOption {
    fn from(raw: RawVariantOption) -> Self {
        // A nested option's own stock/priceModifier are don't-care values
        // and are dropped here rather than validated.
        let body = if raw.sub_variants.is_empty() {
            OptionBody::Leaf(LeafNode {
                price_modifier: raw.price_modifier,
                stock: raw.stock,
            })
        } else {
            OptionBody::Nested(raw.sub_variants)
        };
        Self {
            label: raw.label,
            value: raw.value,
            image: raw.image,
            body,
        }
    }
}

impl From<VariantOption> for RawVariantOption {
    fn from(option: VariantOption) -> Self {
        let (leaf, sub_variants) = match option.body {
            OptionBody::Leaf(leaf) => (leaf, Vec::new()),
            OptionBody::Nested(subs) => (LeafNode::default(), subs),
        };
        Self {
            label: option.label,
            value: option.value,
            image: option.image,
            price_modifier: leaf.price_modifier,
            stock: leaf.stock,
            sub_variants,
        }
    }
}

/// Flat wire shape for a second-level option.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSubOption {
    label: String,
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(default)]
    price_modifier: Decimal,
    #[serde(default)]
    stock: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    sub_sub_variants: Vec<SubSubVariant>,
}

impl From<RawSubOption> for SubOption {
    fn from(raw: RawSubOption) -> Self {
        let body = if raw.sub_sub_variants.is_empty() {
            SubOptionBody::Leaf(LeafNode {
                price_modifier: raw.price_modifier,
                stock: raw.stock,
            })
        } else {
            SubOptionBody::Nested(raw.sub_sub_variants)
        };
        Self {
            label: raw.label,
            value: raw.value,
            image: raw.image,
            body,
        }
    }
}

impl From<SubOption> for RawSubOption {
    fn from(option: SubOption) -> Self {
        let (leaf, sub_sub_variants) = match option.body {
            SubOptionBody::Leaf(leaf) => (leaf, Vec::new()),
            SubOptionBody::Nested(subs) => (LeafNode::default(), subs),
        };
        Self {
            label: option.label,
            value: option.value,
            image: option.image,
            price_modifier: leaf.price_modifier,
            stock: leaf.stock,
            sub_sub_variants,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_option_from_json() {
        let json = r#"{"label":"Red","value":"red","priceModifier":50,"stock":5}"#;
        let option: VariantOption = serde_json::from_str(json).unwrap();
        let leaf = option.leaf().unwrap();
        assert_eq!(leaf.price_modifier, Decimal::from(50));
        assert_eq!(leaf.stock, 5);
        assert!(option.sub_variants().is_empty());
    }

    #[test]
    fn test_nested_option_drops_own_leaf_fields() {
        // Garbage stock/priceModifier on a non-leaf node must be ignored.
        let json = r#"{
            "label": "Large", "value": "l",
            "priceModifier": -999, "stock": 12345,
            "subVariants": [{
                "name": "Finish", "type": "dropdown",
                "options": [
                    {"label": "Matte", "value": "matte", "stock": 10},
                    {"label": "Glossy", "value": "glossy", "priceModifier": 50, "stock": 4}
                ]
            }]
        }"#;
        let option: VariantOption = serde_json::from_str(json).unwrap();
        assert!(option.leaf().is_none());
        assert_eq!(option.sub_variants().len(), 1);

        let finish = option.sub_variant("Finish").unwrap();
        let glossy = finish.option("glossy").unwrap();
        assert_eq!(glossy.leaf().unwrap().price_modifier, Decimal::from(50));
    }

    #[test]
    fn test_option_missing_fields_default() {
        let json = r#"{"label":"Plain","value":"plain"}"#;
        let option: VariantOption = serde_json::from_str(json).unwrap();
        let leaf = option.leaf().unwrap();
        assert_eq!(leaf.price_modifier, Decimal::ZERO);
        assert_eq!(leaf.stock, 0);
    }

    #[test]
    fn test_variant_kind_wire_names() {
        let variant: Variant = serde_json::from_str(
            r#"{"name":"Color","type":"color","required":true,"options":[]}"#,
        )
        .unwrap();
        assert_eq!(variant.kind, VariantKind::Color);
        assert!(variant.required);
    }

    #[test]
    fn test_three_level_tree_roundtrip() {
        let json = r#"{
            "label": "Wood", "value": "wood",
            "subVariants": [{
                "name": "Grain",
                "options": [{
                    "label": "Oak", "value": "oak",
                    "subSubVariants": [{
                        "name": "Stain",
                        "options": [
                            {"label": "Dark", "value": "dark", "priceModifier": 25, "stock": 2}
                        ]
                    }]
                }]
            }]
        }"#;
        let option: VariantOption = serde_json::from_str(json).unwrap();
        let grain = option.sub_variant("Grain").unwrap();
        let oak = grain.option("oak").unwrap();
        assert!(oak.leaf().is_none());
        let stain = oak.sub_sub_variant("Stain").unwrap();
        let dark = stain.option("dark").unwrap();
        assert_eq!(dark.leaf().stock, 2);

        let serialized = serde_json::to_string(&option).unwrap();
        let reparsed: VariantOption = serde_json::from_str(&serialized).unwrap();
        assert_eq!(reparsed, option);
    }

    #[test]
    fn test_product_lookup_helpers() {
        let product: Product = serde_json::from_str(
            r#"{
                "id": 1, "name": "Desk", "basePrice": 1000,
                "variants": [
                    {"name": "Color", "options": [{"label":"Red","value":"red","stock":5}]}
                ],
                "addons": [
                    {"name": "Gift Wrap", "options": [{"label":"Yes","price":100}]}
                ]
            }"#,
        )
        .unwrap();
        assert!(product.variant("Color").is_some());
        assert!(product.variant("Size").is_none());
        assert!(product.addon("Gift Wrap").unwrap().option("Yes").is_some());
        assert!(!product.addon("Gift Wrap").unwrap().is_required());
    }
}
