//! Required-selection validation and the add-to-cart gate.
//!
//! Two distinct requiredness rules coexist on purpose:
//!
//! - Top-level variants carry an explicit `required` flag.
//! - Sub-levels have no flag. Every sub-variant declared under a *selected*
//!   option is implicitly required, and likewise one level deeper. The
//!   sub-tree existing at all is what makes it mandatory.
//!
//! Collapsing the two rules would silently change which fields are
//! mandatory, so they stay separate here.
//!
//! Incomplete selections are validation results, never errors: callers
//! surface the missing-field lists as user-facing messages.

use serde::Serialize;
use tracing::warn;

use crate::error::AddToCartError;
use crate::model::{OptionBody, SubOptionBody};
use crate::resolver::Configuration;

/// Result of the required top-level variant check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantValidation {
    pub is_valid: bool,
    /// Missing variant names (not option values), in declaration order.
    pub missing_variants: Vec<String>,
}

/// Result of the implicit sub-level requiredness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubSelectionValidation {
    pub is_valid: bool,
    /// Missing levels as `"<Variant> - <SubVariant>[ - <SubSubVariant>]"`
    /// paths, in declaration order.
    pub missing_paths: Vec<String>,
}

/// Result of the required addon check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonValidation {
    pub is_valid: bool,
    /// Missing addon names, in declaration order.
    pub missing_addons: Vec<String>,
}

/// Quantity admitted by the add-to-cart gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartQuantity {
    pub quantity: u32,
    /// The requested quantity exceeded available stock and was reduced.
    pub clamped: bool,
}

impl Configuration<'_> {
    /// Check that every variant flagged `required` has a selection.
    ///
    /// A stale selection (one that no longer resolves to an option of the
    /// variant) counts as missing.
    #[must_use]
    pub fn validate_required_variants(&self) -> VariantValidation {
        let missing_variants: Vec<String> = self
            .product()
            .variants
            .iter()
            .filter(|variant| variant.required)
            .filter(|variant| {
                self.selection()
                    .variant(&variant.name)
                    .and_then(|s| variant.option(&s.option_value))
                    .is_none()
            })
            .map(|variant| variant.name.clone())
            .collect();
        VariantValidation {
            is_valid: missing_variants.is_empty(),
            missing_variants,
        }
    }

    /// Check the implicitly required sub-levels under selected options.
    ///
    /// Only selected options are inspected: an unselected variant has no
    /// reachable sub-tree and reports nothing here (the top-level check
    /// owns that case).
    #[must_use]
    pub fn validate_sub_selections(&self) -> SubSelectionValidation {
        let mut missing_paths = Vec::new();

        for variant in &self.product().variants {
            let Some(selected) = self.selection().variant(&variant.name) else {
                continue;
            };
            let Some(option) = variant.option(&selected.option_value) else {
                continue;
            };
            let OptionBody::Nested(sub_variants) = &option.body else {
                continue;
            };

            for sub_variant in sub_variants {
                let Some(selected_sub) = selected.sub_variant(&sub_variant.name) else {
                    missing_paths.push(format!("{} - {}", variant.name, sub_variant.name));
                    continue;
                };
                let Some(sub_option) = sub_variant.option(&selected_sub.option_value) else {
                    // Stale sub-selection degrades to missing.
                    missing_paths.push(format!("{} - {}", variant.name, sub_variant.name));
                    continue;
                };
                let SubOptionBody::Nested(sub_sub_variants) = &sub_option.body else {
                    continue;
                };

                for sub_sub in sub_sub_variants {
                    if selected_sub
                        .sub_sub_variant(&sub_sub.name)
                        .and_then(|s| sub_sub.option(&s.option_value))
                        .is_none()
                    {
                        missing_paths.push(format!(
                            "{} - {} - {}",
                            variant.name, sub_variant.name, sub_sub.name
                        ));
                    }
                }
            }
        }

        SubSelectionValidation {
            is_valid: missing_paths.is_empty(),
            missing_paths,
        }
    }

    /// Check that every addon with a required option has a selected option
    /// with quantity above zero.
    #[must_use]
    pub fn validate_required_addons(&self) -> AddonValidation {
        let missing_addons: Vec<String> = self
            .product()
            .addons
            .iter()
            .filter(|addon| addon.is_required())
            .filter(|addon| {
                !self
                    .selection()
                    .addons
                    .iter()
                    .any(|s| s.addon_name == addon.name && s.quantity > 0)
            })
            .map(|addon| addon.name.clone())
            .collect();
        AddonValidation {
            is_valid: missing_addons.is_empty(),
            missing_addons,
        }
    }

    /// Gate an add-to-cart action.
    ///
    /// Checks run in a fixed order so the caller can surface the first
    /// failure as the single user-facing message: required variants, then
    /// implicit sub-levels, then required addons, then stock. A requested
    /// quantity above available stock is clamped with a warning rather than
    /// rejected; zero available stock blocks entirely.
    ///
    /// # Errors
    ///
    /// Returns the first failing check as an [`AddToCartError`].
    pub fn check_add_to_cart(&self, requested: u32) -> Result<CartQuantity, AddToCartError> {
        let variants = self.validate_required_variants();
        if !variants.is_valid {
            return Err(AddToCartError::MissingVariants {
                missing: variants.missing_variants,
            });
        }

        let sub_selections = self.validate_sub_selections();
        if !sub_selections.is_valid {
            return Err(AddToCartError::MissingSubSelections {
                missing: sub_selections.missing_paths,
            });
        }

        let addons = self.validate_required_addons();
        if !addons.is_valid {
            return Err(AddToCartError::MissingAddons {
                missing: addons.missing_addons,
            });
        }

        let available = self.available_stock();
        if available == 0 {
            return Err(AddToCartError::OutOfStock);
        }
        if requested > available {
            warn!(
                product = %self.product().name,
                requested,
                available,
                "requested quantity exceeds available stock; clamping"
            );
            return Ok(CartQuantity {
                quantity: available,
                clamped: true,
            });
        }
        Ok(CartQuantity {
            quantity: requested,
            clamped: false,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Product;
    use crate::selection::SelectionState;
    use serde_json::json;

    fn product(value: serde_json::Value) -> Product {
        serde_json::from_value(value).unwrap()
    }

    fn desk() -> Product {
        product(json!({
            "id": 1, "name": "Desk", "basePrice": 1000,
            "variants": [
                {
                    "name": "Size", "type": "size", "required": true,
                    "options": [
                        {"label": "Small", "value": "s", "stock": 8},
                        {"label": "Large", "value": "l",
                         "subVariants": [{
                             "name": "Finish",
                             "options": [
                                 {"label": "Matte", "value": "matte", "stock": 10},
                                 {"label": "Glossy", "value": "glossy",
                                  "priceModifier": 50, "stock": 4}
                             ]
                         }]
                        }
                    ]
                },
                {
                    "name": "Legs", "required": false,
                    "options": [
                        {"label": "Steel", "value": "steel", "stock": 20},
                        {"label": "Oak", "value": "oak", "stock": 6}
                    ]
                }
            ],
            "addons": [
                {"name": "Gift Wrap",
                 "options": [{"label": "Yes", "price": 100, "required": true}]}
            ]
        }))
    }

    #[test]
    fn test_required_variants_reported_in_order() {
        let desk = desk();
        let selection = SelectionState::new();
        let config = Configuration::new(&desk, &selection);
        let result = config.validate_required_variants();
        assert!(!result.is_valid);
        assert_eq!(result.missing_variants, vec!["Size".to_owned()]);
    }

    #[test]
    fn test_optional_variant_never_missing() {
        let desk = desk();
        let mut selection = SelectionState::new();
        selection.select_option(&desk, "Size", "s").unwrap();
        let config = Configuration::new(&desk, &selection);
        assert!(config.validate_required_variants().is_valid);
    }

    #[test]
    fn test_stale_selection_counts_as_missing() {
        let desk = desk();
        let other = product(json!({
            "id": 1, "name": "Desk", "basePrice": 1000,
            "variants": [{
                "name": "Size", "required": true,
                "options": [{"label": "Huge", "value": "xxl", "stock": 1}]
            }]
        }));
        let mut selection = SelectionState::new();
        selection.select_option(&desk, "Size", "s").unwrap();
        let config = Configuration::new(&other, &selection);
        let result = config.validate_required_variants();
        assert_eq!(result.missing_variants, vec!["Size".to_owned()]);
    }

    #[test]
    fn test_implicit_sub_variant_missing_path() {
        let desk = desk();
        let mut selection = SelectionState::new();
        selection.select_option(&desk, "Size", "l").unwrap();
        let config = Configuration::new(&desk, &selection);
        let result = config.validate_sub_selections();
        assert!(!result.is_valid);
        assert_eq!(result.missing_paths, vec!["Size - Finish".to_owned()]);
    }

    #[test]
    fn test_sub_selection_valid_once_leaf_chosen() {
        let desk = desk();
        let mut selection = SelectionState::new();
        selection.select_option(&desk, "Size", "l").unwrap();
        selection
            .select_sub_option(&desk, "Size", "Finish", "glossy")
            .unwrap();
        let config = Configuration::new(&desk, &selection);
        assert!(config.validate_sub_selections().is_valid);
    }

    #[test]
    fn test_sub_sub_variant_missing_path() {
        let cabinet = product(json!({
            "id": 2, "name": "Cabinet", "basePrice": 500,
            "variants": [{
                "name": "Material",
                "options": [{
                    "label": "Wood", "value": "wood",
                    "subVariants": [{
                        "name": "Grain",
                        "options": [{
                            "label": "Oak", "value": "oak",
                            "subSubVariants": [{
                                "name": "Stain",
                                "options": [
                                    {"label": "Dark", "value": "dark", "stock": 2},
                                    {"label": "Light", "value": "light", "stock": 3}
                                ]
                            }]
                        }]
                    }]
                }]
            }]
        }));
        let mut selection = SelectionState::new();
        selection.select_option(&cabinet, "Material", "wood").unwrap();
        selection
            .select_sub_option(&cabinet, "Material", "Grain", "oak")
            .unwrap();
        let config = Configuration::new(&cabinet, &selection);
        let result = config.validate_sub_selections();
        assert_eq!(
            result.missing_paths,
            vec!["Material - Grain - Stain".to_owned()]
        );
    }

    #[test]
    fn test_required_addon_missing_then_satisfied() {
        let desk = desk();
        let mut selection = SelectionState::new();
        let config = Configuration::new(&desk, &selection);
        let result = config.validate_required_addons();
        assert!(!result.is_valid);
        assert_eq!(result.missing_addons, vec!["Gift Wrap".to_owned()]);

        selection
            .set_addon_quantity(&desk, "Gift Wrap", "Yes", 1)
            .unwrap();
        let config = Configuration::new(&desk, &selection);
        assert!(config.validate_required_addons().is_valid);
    }

    #[test]
    fn test_gate_order_variants_first() {
        let desk = desk();
        let selection = SelectionState::new();
        let config = Configuration::new(&desk, &selection);
        assert_eq!(
            config.check_add_to_cart(1),
            Err(AddToCartError::MissingVariants {
                missing: vec!["Size".to_owned()]
            })
        );
    }

    #[test]
    fn test_gate_sub_selections_before_addons() {
        let desk = desk();
        let mut selection = SelectionState::new();
        selection.select_option(&desk, "Size", "l").unwrap();
        let config = Configuration::new(&desk, &selection);
        assert_eq!(
            config.check_add_to_cart(1),
            Err(AddToCartError::MissingSubSelections {
                missing: vec!["Size - Finish".to_owned()]
            })
        );
    }

    #[test]
    fn test_gate_addons_before_stock() {
        let desk = desk();
        let mut selection = SelectionState::new();
        selection.select_option(&desk, "Size", "s").unwrap();
        let config = Configuration::new(&desk, &selection);
        assert_eq!(
            config.check_add_to_cart(1),
            Err(AddToCartError::MissingAddons {
                missing: vec!["Gift Wrap".to_owned()]
            })
        );
    }

    #[test]
    fn test_gate_clamps_quantity() {
        let desk = desk();
        let mut selection = SelectionState::new();
        selection.select_option(&desk, "Size", "s").unwrap();
        selection
            .set_addon_quantity(&desk, "Gift Wrap", "Yes", 1)
            .unwrap();
        let config = Configuration::new(&desk, &selection);
        assert_eq!(
            config.check_add_to_cart(20),
            Ok(CartQuantity {
                quantity: 8,
                clamped: true
            })
        );
        assert_eq!(
            config.check_add_to_cart(3),
            Ok(CartQuantity {
                quantity: 3,
                clamped: false
            })
        );
    }

    #[test]
    fn test_gate_blocks_on_zero_stock() {
        let ghost = product(json!({
            "id": 3, "name": "Ghost", "basePrice": 10,
            "variants": [{
                "name": "Shade",
                "options": [{"label": "Pale", "value": "pale", "stock": 0}]
            }]
        }));
        let mut selection = SelectionState::new();
        selection.select_option(&ghost, "Shade", "pale").unwrap();
        let config = Configuration::new(&ghost, &selection);
        assert_eq!(config.check_add_to_cart(1), Err(AddToCartError::OutOfStock));
    }
}
