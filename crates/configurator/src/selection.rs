//! Customer selection state and its mutation operations.
//!
//! A [`SelectionState`] mirrors the variant tree with up to three levels of
//! selections plus the chosen addon quantities. It is created empty when a
//! product page mounts, mutated by UI events, and discarded once projected
//! into a cart line.
//!
//! At most one selection exists per variant name at each level. Replacing a
//! parent selection discards child selections that are no longer reachable
//! from the new option. Mutation operations validate against the product
//! tree and fail with [`SelectionError`] on unknown names; the resolver side
//! never trusts these invariants and re-checks defensively.
//!
//! The state assumes a single writer per resolution pass. In a
//! multi-threaded host it must be externally synchronized.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SelectionError;
use crate::model::{Product, SubOption, VariantOption};

/// One selected option of a top-level variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedVariant {
    pub variant_name: String,
    pub option_value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_variants: Vec<SelectedSubVariant>,
}

impl SelectedVariant {
    fn new(variant_name: &str, option_value: &str) -> Self {
        Self {
            variant_name: variant_name.to_owned(),
            option_value: option_value.to_owned(),
            sub_variants: Vec::new(),
        }
    }

    /// Look up a nested selection by sub-variant name.
    #[must_use]
    pub fn sub_variant(&self, name: &str) -> Option<&SelectedSubVariant> {
        self.sub_variants.iter().find(|s| s.sub_variant_name == name)
    }
}

/// One selected option of a sub-variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedSubVariant {
    pub sub_variant_name: String,
    pub option_value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_sub_variants: Vec<SelectedSubSubVariant>,
}

impl SelectedSubVariant {
    fn new(sub_variant_name: &str, option_value: &str) -> Self {
        Self {
            sub_variant_name: sub_variant_name.to_owned(),
            option_value: option_value.to_owned(),
            sub_sub_variants: Vec::new(),
        }
    }

    /// Look up a nested selection by sub-sub-variant name.
    #[must_use]
    pub fn sub_sub_variant(&self, name: &str) -> Option<&SelectedSubSubVariant> {
        self.sub_sub_variants
            .iter()
            .find(|s| s.sub_sub_variant_name == name)
    }
}

/// One selected option at the deepest variant level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedSubSubVariant {
    pub sub_sub_variant_name: String,
    pub option_value: String,
}

/// A chosen addon option with its quantity.
///
/// Quantity is always at least 1: setting an addon to quantity 0 removes
/// the entry entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedAddon {
    pub addon_name: String,
    pub option_label: String,
    pub quantity: u32,
}

/// The customer's in-progress choices for one product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    #[serde(default)]
    pub variants: Vec<SelectedVariant>,
    #[serde(default)]
    pub addons: Vec<SelectedAddon>,
}

impl SelectionState {
    /// An empty selection state, as created on product page mount.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the selection for a top-level variant.
    #[must_use]
    pub fn variant(&self, name: &str) -> Option<&SelectedVariant> {
        self.variants.iter().find(|s| s.variant_name == name)
    }

    /// Look up the selected quantity for an addon option. Absent entries
    /// read as 0.
    #[must_use]
    pub fn addon_quantity(&self, addon_name: &str, option_label: &str) -> u32 {
        self.addons
            .iter()
            .find(|a| a.addon_name == addon_name && a.option_label == option_label)
            .map_or(0, |a| a.quantity)
    }

    /// Select an option of a top-level variant.
    ///
    /// Re-selecting the already-selected option is a no-op that keeps any
    /// nested selections. Selecting a different option replaces the entry
    /// and discards nested selections, which belong to the old sub-tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the variant or option does not exist in the tree.
    pub fn select_option(
        &mut self,
        product: &Product,
        variant_name: &str,
        option_value: &str,
    ) -> Result<(), SelectionError> {
        let variant = product
            .variant(variant_name)
            .ok_or_else(|| SelectionError::UnknownVariant {
                name: variant_name.to_owned(),
            })?;
        variant
            .option(option_value)
            .ok_or_else(|| SelectionError::UnknownOption {
                variant: variant_name.to_owned(),
                option: option_value.to_owned(),
            })?;

        match self
            .variants
            .iter_mut()
            .find(|s| s.variant_name == variant_name)
        {
            Some(entry) if entry.option_value == option_value => {}
            Some(entry) => {
                entry.option_value = option_value.to_owned();
                entry.sub_variants.clear();
            }
            None => self
                .variants
                .push(SelectedVariant::new(variant_name, option_value)),
        }
        Ok(())
    }

    /// Select an option of a sub-variant nested under an existing top-level
    /// selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent variant has no (resolvable) selection,
    /// or if the sub-variant or option does not exist under the selected
    /// parent option.
    pub fn select_sub_option(
        &mut self,
        product: &Product,
        variant_name: &str,
        sub_variant_name: &str,
        option_value: &str,
    ) -> Result<(), SelectionError> {
        let path = format!("{variant_name} - {sub_variant_name}");
        let parent_option = resolve_parent_option(product, self.variant(variant_name))
            .ok_or_else(|| SelectionError::MissingParentSelection {
                variant: variant_name.to_owned(),
            })?;
        let sub_variant = parent_option.sub_variant(sub_variant_name).ok_or_else(|| {
            SelectionError::UnknownVariant { name: path.clone() }
        })?;
        sub_variant
            .option(option_value)
            .ok_or_else(|| SelectionError::UnknownOption {
                variant: path,
                option: option_value.to_owned(),
            })?;

        // Checked above via self.variant(); the entry must exist.
        let Some(entry) = self
            .variants
            .iter_mut()
            .find(|s| s.variant_name == variant_name)
        else {
            return Err(SelectionError::MissingParentSelection {
                variant: variant_name.to_owned(),
            });
        };

        match entry
            .sub_variants
            .iter_mut()
            .find(|s| s.sub_variant_name == sub_variant_name)
        {
            Some(sub) if sub.option_value == option_value => {}
            Some(sub) => {
                sub.option_value = option_value.to_owned();
                sub.sub_sub_variants.clear();
            }
            None => entry
                .sub_variants
                .push(SelectedSubVariant::new(sub_variant_name, option_value)),
        }
        Ok(())
    }

    /// Select an option at the deepest variant level. Requires resolvable
    /// parent and grandparent selections.
    ///
    /// # Errors
    ///
    /// Returns an error if either ancestor level has no selection, or if the
    /// sub-sub-variant or option does not exist under the selected chain.
    pub fn select_sub_sub_option(
        &mut self,
        product: &Product,
        variant_name: &str,
        sub_variant_name: &str,
        sub_sub_variant_name: &str,
        option_value: &str,
    ) -> Result<(), SelectionError> {
        let parent_path = format!("{variant_name} - {sub_variant_name}");
        let path = format!("{parent_path} - {sub_sub_variant_name}");

        let parent_option = resolve_parent_option(product, self.variant(variant_name))
            .ok_or_else(|| SelectionError::MissingParentSelection {
                variant: variant_name.to_owned(),
            })?;
        let selected_sub = self
            .variant(variant_name)
            .and_then(|s| s.sub_variant(sub_variant_name));
        let sub_option = resolve_parent_sub_option(parent_option, selected_sub).ok_or_else(
            || SelectionError::MissingParentSelection {
                variant: parent_path,
            },
        )?;
        let sub_sub_variant = sub_option
            .sub_sub_variant(sub_sub_variant_name)
            .ok_or_else(|| SelectionError::UnknownVariant { name: path.clone() })?;
        sub_sub_variant
            .option(option_value)
            .ok_or_else(|| SelectionError::UnknownOption {
                variant: path,
                option: option_value.to_owned(),
            })?;

        let Some(sub_entry) = self
            .variants
            .iter_mut()
            .find(|s| s.variant_name == variant_name)
            .and_then(|e| {
                e.sub_variants
                    .iter_mut()
                    .find(|s| s.sub_variant_name == sub_variant_name)
            })
        else {
            return Err(SelectionError::MissingParentSelection {
                variant: format!("{variant_name} - {sub_variant_name}"),
            });
        };

        match sub_entry
            .sub_sub_variants
            .iter_mut()
            .find(|s| s.sub_sub_variant_name == sub_sub_variant_name)
        {
            Some(leaf) => leaf.option_value = option_value.to_owned(),
            None => sub_entry.sub_sub_variants.push(SelectedSubSubVariant {
                sub_sub_variant_name: sub_sub_variant_name.to_owned(),
                option_value: option_value.to_owned(),
            }),
        }
        Ok(())
    }

    /// Set the quantity for an addon option. A quantity of 0 removes the
    /// entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the addon or option does not exist on the product.
    pub fn set_addon_quantity(
        &mut self,
        product: &Product,
        addon_name: &str,
        option_label: &str,
        quantity: u32,
    ) -> Result<(), SelectionError> {
        let addon = product
            .addon(addon_name)
            .ok_or_else(|| SelectionError::UnknownAddon {
                name: addon_name.to_owned(),
            })?;
        addon
            .option(option_label)
            .ok_or_else(|| SelectionError::UnknownAddonOption {
                addon: addon_name.to_owned(),
                option: option_label.to_owned(),
            })?;

        if quantity == 0 {
            self.addons
                .retain(|a| !(a.addon_name == addon_name && a.option_label == option_label));
            return Ok(());
        }

        match self
            .addons
            .iter_mut()
            .find(|a| a.addon_name == addon_name && a.option_label == option_label)
        {
            Some(entry) => entry.quantity = quantity,
            None => self.addons.push(SelectedAddon {
                addon_name: addon_name.to_owned(),
                option_label: option_label.to_owned(),
                quantity,
            }),
        }
        Ok(())
    }

    /// Auto-select every level whose effective option count is exactly one.
    ///
    /// Runs on product load and again whenever the available option set
    /// changes. Top-level variants are grouped by name before counting (a
    /// name that appears twice with one option each has two effective
    /// options). Selection then cascades one level at a time down any
    /// reachable single-option sub-levels.
    ///
    /// Idempotent: existing selections, user-made or auto-made, are never
    /// overwritten, and re-running against the same tree changes nothing.
    pub fn auto_select(&mut self, product: &Product) {
        // Top level: group same-named variants before counting options.
        let mut groups: Vec<(&str, Vec<&VariantOption>)> = Vec::new();
        for variant in &product.variants {
            match groups.iter_mut().find(|(name, _)| *name == variant.name) {
                Some((_, options)) => options.extend(variant.options.iter()),
                None => groups.push((variant.name.as_str(), variant.options.iter().collect())),
            }
        }
        for (name, options) in groups {
            if let [only] = options.as_slice()
                && self.variant(name).is_none()
            {
                debug!(variant = name, option = %only.value, "auto-selecting singleton option");
                self.variants.push(SelectedVariant::new(name, &only.value));
            }
        }

        // Cascade into sub-levels reachable from current selections.
        for entry in &mut self.variants {
            let Some(option) = product
                .variant(&entry.variant_name)
                .and_then(|v| v.option(&entry.option_value))
            else {
                continue;
            };

            for sub_variant in option.sub_variants() {
                if let [only] = sub_variant.options.as_slice()
                    && !entry
                        .sub_variants
                        .iter()
                        .any(|s| s.sub_variant_name == sub_variant.name)
                {
                    debug!(
                        variant = %entry.variant_name,
                        sub_variant = %sub_variant.name,
                        option = %only.value,
                        "auto-selecting singleton sub-option"
                    );
                    entry
                        .sub_variants
                        .push(SelectedSubVariant::new(&sub_variant.name, &only.value));
                }
            }

            for sub_entry in &mut entry.sub_variants {
                let Some(sub_option) = option
                    .sub_variant(&sub_entry.sub_variant_name)
                    .and_then(|sv| sv.option(&sub_entry.option_value))
                else {
                    continue;
                };

                for sub_sub in sub_option.sub_sub_variants() {
                    if let [only] = sub_sub.options.as_slice()
                        && !sub_entry
                            .sub_sub_variants
                            .iter()
                            .any(|s| s.sub_sub_variant_name == sub_sub.name)
                    {
                        debug!(
                            sub_sub_variant = %sub_sub.name,
                            option = %only.value,
                            "auto-selecting singleton sub-sub-option"
                        );
                        sub_entry.sub_sub_variants.push(SelectedSubSubVariant {
                            sub_sub_variant_name: sub_sub.name.clone(),
                            option_value: only.value.clone(),
                        });
                    }
                }
            }
        }
    }
}

/// Resolve the tree option a top-level selection points at, or `None` if the
/// selection is absent or stale.
fn resolve_parent_option<'a>(
    product: &'a Product,
    selected: Option<&SelectedVariant>,
) -> Option<&'a VariantOption> {
    let selected = selected?;
    product
        .variant(&selected.variant_name)?
        .option(&selected.option_value)
}

/// Resolve the tree sub-option a nested selection points at, or `None` if
/// the selection is absent or stale.
fn resolve_parent_sub_option<'a>(
    parent_option: &'a VariantOption,
    selected: Option<&SelectedSubVariant>,
) -> Option<&'a SubOption> {
    let selected = selected?;
    parent_option
        .sub_variant(&selected.sub_variant_name)?
        .option(&selected.option_value)
}
