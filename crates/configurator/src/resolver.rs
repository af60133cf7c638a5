//! Pure resolution of price, stock, and image from a configuration.
//!
//! A [`Configuration`] is the ephemeral, merged view of one product tree and
//! one selection state, rebuilt for every resolution pass. Resolution is
//! pure and re-entrant: it only reads its inputs and keeps no cache, so it
//! is safe to recompute on every selection change.
//!
//! Two rules drive everything here:
//!
//! - **Leaf-only counting.** Only leaf nodes contribute stock and price
//!   modifiers. A nested option's own fields never exist in the model (see
//!   [`crate::model`]), so the rule is structural.
//! - **Incomplete means not purchasable.** A selected chain whose deeper
//!   implicitly-required levels are not all leaf-resolved reports available
//!   stock 0, not "unknown". The product page must not imply purchasability
//!   before a leaf is chosen.
//!
//! Selections that no longer resolve against the tree (the product was
//! edited after page load) degrade to "not selected" with a warning.

use configurator_core::Price;
use rust_decimal::Decimal;
use tracing::warn;

use crate::model::{OptionBody, Product, SubOptionBody, Variant};
use crate::selection::{SelectedVariant, SelectionState};

/// The merged view of a product tree and a selection state for one
/// resolution pass. Cheap to construct; never persisted.
#[derive(Debug, Clone, Copy)]
pub struct Configuration<'a> {
    product: &'a Product,
    selection: &'a SelectionState,
}

/// Result of walking one selected variant chain.
#[derive(Debug, Clone, Default)]
struct ChainReport {
    /// The top-level selection resolved against the tree at all.
    resolved: bool,
    /// Every implicitly required deeper level is leaf-resolved.
    complete: bool,
    /// Deepest leaf-resolved level reached (1..=3).
    depth: u32,
    /// Minimum stock across all leaves reached. Meaningful only when
    /// `complete`.
    stock: u32,
    /// Sum of price modifiers of all leaves reached, complete or not.
    modifier_total: Decimal,
    /// Deepest non-empty image along the chain, with its level.
    image: Option<(u32, String)>,
}

impl ChainReport {
    fn record_leaf(&mut self, level: u32, stock: u32, modifier: Decimal) {
        self.depth = self.depth.max(level);
        self.stock = self.stock.min(stock);
        self.modifier_total += modifier;
    }

    fn record_image(&mut self, level: u32, image: Option<&String>) {
        if let Some(image) = image
            && !image.is_empty()
            && self.image.as_ref().is_none_or(|(depth, _)| level > *depth)
        {
            self.image = Some((level, image.clone()));
        }
    }
}

impl<'a> Configuration<'a> {
    /// Build a configuration view over a product and a selection state.
    #[must_use]
    pub const fn new(product: &'a Product, selection: &'a SelectionState) -> Self {
        Self { product, selection }
    }

    /// The product tree this configuration reads.
    #[must_use]
    pub const fn product(&self) -> &'a Product {
        self.product
    }

    /// The selection state this configuration reads.
    #[must_use]
    pub const fn selection(&self) -> &'a SelectionState {
        self.selection
    }

    /// Stock available for the current selections.
    ///
    /// A product without variants answers with its own stock. Otherwise the
    /// answer is the stock of the deepest fully leaf-resolved selected
    /// chain; chains of equal depth answer with the smaller stock. Any
    /// selected-but-incomplete chain, or no resolvable selection at all,
    /// answers 0: not fully specified means not purchasable yet.
    #[must_use]
    pub fn available_stock(&self) -> u32 {
        if self.product.variants.is_empty() {
            return self.product.stock;
        }

        let mut deepest: Option<(u32, u32)> = None;
        for variant in &self.product.variants {
            let Some(selected) = self.selection.variant(&variant.name) else {
                continue;
            };
            let report = walk_chain(variant, selected);
            if !report.resolved {
                continue;
            }
            if !report.complete {
                return 0;
            }
            deepest = match deepest {
                Some((depth, stock)) if report.depth == depth => {
                    Some((depth, stock.min(report.stock)))
                }
                Some((depth, stock)) if report.depth < depth => Some((depth, stock)),
                _ => Some((report.depth, report.stock)),
            };
        }
        deepest.map_or(0, |(_, stock)| stock)
    }

    /// Sum of price modifiers of every leaf reached along selected chains.
    ///
    /// Partially selected chains contribute the leaves they have reached;
    /// non-leaf levels contribute nothing. Negative modifiers pass through
    /// unclamped.
    #[must_use]
    pub fn variant_delta_total(&self) -> Decimal {
        self.product
            .variants
            .iter()
            .filter_map(|variant| {
                self.selection
                    .variant(&variant.name)
                    .map(|selected| walk_chain(variant, selected).modifier_total)
            })
            .sum()
    }

    /// Sum of addon option price times selected quantity.
    #[must_use]
    pub fn addon_total(&self) -> Decimal {
        self.selection
            .addons
            .iter()
            .filter_map(|selected| {
                let Some(option) = self
                    .product
                    .addon(&selected.addon_name)
                    .and_then(|a| a.option(&selected.option_label))
                else {
                    warn!(
                        addon = %selected.addon_name,
                        option = %selected.option_label,
                        "selected addon no longer exists on product; ignoring"
                    );
                    return None;
                };
                Some(option.price * Decimal::from(selected.quantity))
            })
            .sum()
    }

    /// The undiscounted base price as a [`Price`] in the product currency.
    #[must_use]
    pub const fn base_price(&self) -> Price {
        Price::new(self.product.base_price, self.product.currency_code)
    }

    /// The fully resolved unit price: base price plus every reached leaf
    /// modifier plus addon totals. Sale discounts are not applied here;
    /// they belong to the cart projector.
    #[must_use]
    pub fn final_price(&self) -> Price {
        self.base_price()
            .with_delta(self.variant_delta_total() + self.addon_total())
    }

    /// The image for the current selections: the most specific selected
    /// node's image, walking upward through parent selections, falling back
    /// to the product's default image list. First non-empty wins.
    #[must_use]
    pub fn image(&self) -> Option<String> {
        let mut best: Option<(u32, String)> = None;
        for variant in &self.product.variants {
            let Some(selected) = self.selection.variant(&variant.name) else {
                continue;
            };
            let report = walk_chain(variant, selected);
            if let Some((level, image)) = report.image
                && best.as_ref().is_none_or(|(depth, _)| level > *depth)
            {
                best = Some((level, image));
            }
        }
        best.map(|(_, image)| image).or_else(|| {
            self.product
                .images
                .iter()
                .find(|i| !i.is_empty())
                .cloned()
        })
    }
}

/// Walk one selected chain against its variant declaration.
///
/// Every declared sub-level under a selected option is implicitly required:
/// a missing or stale deeper selection marks the chain incomplete but the
/// walk keeps going, so reached leaves still contribute price modifiers.
fn walk_chain(variant: &Variant, selected: &SelectedVariant) -> ChainReport {
    let mut report = ChainReport {
        stock: u32::MAX,
        complete: true,
        ..ChainReport::default()
    };

    let Some(option) = variant.option(&selected.option_value) else {
        warn!(
            variant = %variant.name,
            option = %selected.option_value,
            "selection no longer resolves against product tree; treating as unselected"
        );
        report.complete = false;
        report.stock = 0;
        return report;
    };
    report.resolved = true;
    report.record_image(1, option.image.as_ref());

    match &option.body {
        OptionBody::Leaf(leaf) => report.record_leaf(1, leaf.stock, leaf.price_modifier),
        OptionBody::Nested(sub_variants) => {
            for sub_variant in sub_variants {
                let Some(sub_option) = selected
                    .sub_variant(&sub_variant.name)
                    .and_then(|s| sub_variant.option(&s.option_value))
                else {
                    report.complete = false;
                    continue;
                };
                report.record_image(2, sub_option.image.as_ref());

                match &sub_option.body {
                    SubOptionBody::Leaf(leaf) => {
                        report.record_leaf(2, leaf.stock, leaf.price_modifier);
                    }
                    SubOptionBody::Nested(sub_sub_variants) => {
                        let selected_sub = selected.sub_variant(&sub_variant.name);
                        for sub_sub in sub_sub_variants {
                            let Some(ss_option) = selected_sub
                                .and_then(|s| s.sub_sub_variant(&sub_sub.name))
                                .and_then(|s| sub_sub.option(&s.option_value))
                            else {
                                report.complete = false;
                                continue;
                            };
                            report.record_image(3, ss_option.image.as_ref());
                            let leaf = ss_option.leaf();
                            report.record_leaf(3, leaf.stock, leaf.price_modifier);
                        }
                    }
                }
            }
        }
    }

    if report.stock == u32::MAX {
        // No leaf reached at all.
        report.stock = 0;
    }
    report
}
