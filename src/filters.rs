//! Display filters and the visible-item predicate engine

use serde::{Deserialize, Serialize};

use crate::catalog::{ALL_CATEGORIES, Catalog, MenuItem};

/// Allergen tags counted as dairy for the `noCheese` filter
const DAIRY_ALLERGENS: &[&str] = &["dairy", "cheese", "lactose", "milk"];

/// The total set of named display filters
///
/// All flags default to false and compose via logical AND. A session always
/// carries a total `FilterSet`; partial updates exist only as [`FilterUpdate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSet {
    pub vegetarian: bool,
    pub vegan: bool,
    pub halal: bool,
    pub no_allergens: bool,
    pub popular: bool,
    pub no_cheese: bool,
}

impl FilterSet {
    /// Whether an item passes every active filter
    #[must_use]
    pub fn matches(&self, item: &MenuItem) -> bool {
        (!self.vegetarian || item.vegetarian)
            && (!self.vegan || item.vegan)
            && (!self.halal || item.halal)
            && (!self.no_allergens || item.allergens.is_empty())
            && (!self.popular || item.popular)
            && (!self.no_cheese || passes_no_cheese(item))
    }
}

/// A cheese dish that *can* be made without cheese still passes
fn passes_no_cheese(item: &MenuItem) -> bool {
    !has_dairy_allergen(item) || item.cheese_removable == Some(true)
}

fn has_dairy_allergen(item: &MenuItem) -> bool {
    item.allergens
        .iter()
        .any(|a| DAIRY_ALLERGENS.iter().any(|d| a.eq_ignore_ascii_case(d)))
}

/// Partial filter update extracted from a model action
///
/// Only keys present in the payload are meaningful: "unset" is distinct
/// from "false".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterUpdate {
    pub vegetarian: Option<bool>,
    pub vegan: Option<bool>,
    pub halal: Option<bool>,
    pub no_allergens: Option<bool>,
    pub popular: Option<bool>,
    pub no_cheese: Option<bool>,
}

impl FilterUpdate {
    /// Overlay this update onto a fully-reset baseline
    ///
    /// A new filter instruction replaces prior filter intent entirely: keys
    /// absent from the update stay false, never inherited from the previous
    /// `FilterSet`.
    #[must_use]
    pub fn onto_reset(&self) -> FilterSet {
        let base = FilterSet::default();
        FilterSet {
            vegetarian: self.vegetarian.unwrap_or(base.vegetarian),
            vegan: self.vegan.unwrap_or(base.vegan),
            halal: self.halal.unwrap_or(base.halal),
            no_allergens: self.no_allergens.unwrap_or(base.no_allergens),
            popular: self.popular.unwrap_or(base.popular),
            no_cheese: self.no_cheese.unwrap_or(base.no_cheese),
        }
    }
}

/// Evaluate the visible subset of the menu
///
/// Category `"all"` starts from every category's items in catalog iteration
/// order; an unknown key starts from nothing. Pure and deterministic — an
/// empty result is a valid outcome, not an error.
#[must_use]
pub fn visible_items<'a>(
    catalog: &'a Catalog,
    category: &str,
    filters: &FilterSet,
) -> Vec<&'a MenuItem> {
    let base: Vec<&MenuItem> = if category == ALL_CATEGORIES {
        catalog.all_items().collect()
    } else {
        catalog.items_in(category).iter().collect()
    };

    base.into_iter()
        .filter(|item| filters.matches(item))
        .collect()
}
