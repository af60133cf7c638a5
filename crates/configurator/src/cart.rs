//! Projection of a resolved configuration into a cart line item.
//!
//! The line item is the flattened, serializable record handed to order
//! submission: selection paths are resolved to display labels, the unit
//! price is fully composed, and the quantity has passed the add-to-cart
//! gate.
//!
//! Discount composition rule: a sale percentage applies strictly to the
//! undiscounted base price. Variant price deltas and addon totals pass
//! through undiscounted:
//!
//! ```text
//! unit_price = discounted_base + variant_deltas + addons_total
//! ```
//!
//! A 20% sale on a 1000 base with a +200 variant delta prices at
//! 800 + 200 = 1000, never 960. This is the one place discounting and
//! variant pricing interact; the decomposition must be preserved exactly.

use configurator_core::{Price, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::AddToCartError;
use crate::resolver::Configuration;

/// A flattened, cart-ready line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub line_id: Uuid,
    pub product_id: ProductId,
    pub name: String,
    /// Per-unit price including variant deltas and addon totals, with any
    /// sale discount applied to the base price component only.
    pub unit_price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub variants: Vec<CartLineVariant>,
    pub addons: Vec<CartLineAddon>,
    /// Requested quantity clamped to available stock.
    pub quantity: u32,
}

/// A selected variant flattened to display labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineVariant {
    pub variant_name: String,
    pub option_label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_variants: Vec<CartLineSubVariant>,
}

/// A selected sub-variant flattened to display labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineSubVariant {
    pub sub_variant_name: String,
    pub option_label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_sub_variants: Vec<CartLineSubSubVariant>,
}

/// A selected sub-sub-variant flattened to display labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineSubSubVariant {
    pub sub_sub_variant_name: String,
    pub option_label: String,
}

/// A selected addon carried onto the line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineAddon {
    pub addon_name: String,
    pub option_label: String,
    pub quantity: u32,
}

impl CartLine {
    /// Project a configuration and a requested quantity into a cart line.
    ///
    /// Runs the add-to-cart gate first; the projected quantity is
    /// `min(requested, available_stock)`. `sale_percent`, when present, is
    /// the sale percentage to apply to the base price component.
    ///
    /// # Errors
    ///
    /// Returns the first failing gate check as an [`AddToCartError`].
    pub fn project(
        config: &Configuration<'_>,
        requested: u32,
        sale_percent: Option<Decimal>,
    ) -> Result<Self, AddToCartError> {
        let admitted = config.check_add_to_cart(requested)?;
        let product = config.product();

        // The sale percentage discounts the base price component only;
        // variant deltas and addon totals pass through undiscounted.
        let base = config.base_price();
        let discounted_base = sale_percent.map_or(base, |p| base.discounted_by_percent(p));
        let unit_price =
            discounted_base.with_delta(config.variant_delta_total() + config.addon_total());

        Ok(Self {
            line_id: Uuid::new_v4(),
            product_id: product.id,
            name: product.name.clone(),
            unit_price,
            image: config.image(),
            variants: flatten_variants(config),
            addons: config
                .selection()
                .addons
                .iter()
                .filter(|a| {
                    let known = product
                        .addon(&a.addon_name)
                        .is_some_and(|addon| addon.option(&a.option_label).is_some());
                    if !known {
                        warn!(
                            addon = %a.addon_name,
                            option = %a.option_label,
                            "dropping stale addon selection from cart line"
                        );
                    }
                    known
                })
                .map(|a| CartLineAddon {
                    addon_name: a.addon_name.clone(),
                    option_label: a.option_label.clone(),
                    quantity: a.quantity,
                })
                .collect(),
            quantity: admitted.quantity,
        })
    }

    /// Total price of the line: unit price multiplied by quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Flatten selections to display labels by resolving values against the
/// tree. Stale entries are dropped with a warning; the gate has already
/// established that everything required resolves.
fn flatten_variants(config: &Configuration<'_>) -> Vec<CartLineVariant> {
    let mut lines = Vec::new();
    for variant in &config.product().variants {
        let Some(selected) = config.selection().variant(&variant.name) else {
            continue;
        };
        let Some(option) = variant.option(&selected.option_value) else {
            warn!(
                variant = %variant.name,
                option = %selected.option_value,
                "dropping stale selection from cart line"
            );
            continue;
        };

        let mut sub_lines = Vec::new();
        for selected_sub in &selected.sub_variants {
            let Some((sub_variant, sub_option)) = option
                .sub_variant(&selected_sub.sub_variant_name)
                .and_then(|sv| sv.option(&selected_sub.option_value).map(|o| (sv, o)))
            else {
                warn!(
                    variant = %variant.name,
                    sub_variant = %selected_sub.sub_variant_name,
                    "dropping stale sub-selection from cart line"
                );
                continue;
            };

            let sub_sub_lines = selected_sub
                .sub_sub_variants
                .iter()
                .filter_map(|selected_ss| {
                    let label = sub_option
                        .sub_sub_variant(&selected_ss.sub_sub_variant_name)
                        .and_then(|ssv| ssv.option(&selected_ss.option_value))
                        .map(|o| o.label.clone())?;
                    Some(CartLineSubSubVariant {
                        sub_sub_variant_name: selected_ss.sub_sub_variant_name.clone(),
                        option_label: label,
                    })
                })
                .collect();

            sub_lines.push(CartLineSubVariant {
                sub_variant_name: sub_variant.name.clone(),
                option_label: sub_option.label.clone(),
                sub_sub_variants: sub_sub_lines,
            });
        }

        lines.push(CartLineVariant {
            variant_name: variant.name.clone(),
            option_label: option.label.clone(),
            sub_variants: sub_lines,
        });
    }
    lines
}
