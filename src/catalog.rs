//! Menu catalog: the static dataset of categories and items
//!
//! Loaded once at startup from a JSON document (or the embedded default)
//! and read-only thereafter.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Category selector sentinel meaning "every category"
pub const ALL_CATEGORIES: &str = "all";

/// Default catalog compiled into the binary, used when no menu path is configured
const EMBEDDED_MENU: &str = include_str!("../menus/carte.json");

/// Restaurant identity shown to the presentation layer and the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "EUR".to_string()
}

/// Display metadata for a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
}

/// A single dish on the menu
///
/// Immutable once loaded; owned by the [`Catalog`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: u32,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub vegetarian: bool,
    #[serde(default)]
    pub vegan: bool,
    #[serde(default)]
    pub halal: bool,
    #[serde(default)]
    pub popular: bool,
    #[serde(default)]
    pub spicy: bool,
    /// Preparation-time label, e.g. "15 min"
    #[serde(default)]
    pub prep_time: String,
    /// Whether the kitchen can prepare this dish without cheese
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cheese_removable: Option<bool>,
}

/// The full menu dataset
///
/// Category iteration order follows the source document, which is why the
/// maps are `IndexMap` rather than `HashMap`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub restaurant: RestaurantInfo,
    pub categories: IndexMap<String, CategoryInfo>,
    pub menu: IndexMap<String, Vec<MenuItem>>,
}

impl Catalog {
    /// Parse a catalog from a JSON document
    ///
    /// # Errors
    ///
    /// Returns `Error::Catalog` if the document is malformed or contains
    /// duplicate item ids.
    pub fn from_json(content: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(content)
            .map_err(|e| Error::Catalog(format!("invalid menu document: {e}")))?;

        let mut seen = std::collections::HashSet::new();
        for item in catalog.all_items() {
            if !seen.insert(item.id) {
                return Err(Error::Catalog(format!(
                    "duplicate menu item id {} ({})",
                    item.id, item.name
                )));
            }
        }

        Ok(catalog)
    }

    /// Load a catalog from a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed. Catalog
    /// problems are a startup-level failure, never handled per-turn.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        tracing::info!(
            path = %path.display(),
            restaurant = %catalog.restaurant.name,
            items = catalog.item_count(),
            "loaded menu catalog"
        );
        Ok(catalog)
    }

    /// Load the default catalog compiled into the binary
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded document is malformed.
    pub fn embedded() -> Result<Self> {
        let catalog = Self::from_json(EMBEDDED_MENU)?;
        tracing::info!(
            restaurant = %catalog.restaurant.name,
            items = catalog.item_count(),
            "loaded embedded menu catalog"
        );
        Ok(catalog)
    }

    /// Items of one category, in menu order
    ///
    /// An unknown key yields an empty slice, never an error.
    #[must_use]
    pub fn items_in(&self, category: &str) -> &[MenuItem] {
        self.menu.get(category).map_or(&[], Vec::as_slice)
    }

    /// All items across categories, in catalog iteration order
    pub fn all_items(&self) -> impl Iterator<Item = &MenuItem> {
        self.menu.values().flatten()
    }

    /// Look up an item by id
    #[must_use]
    pub fn item(&self, id: u32) -> Option<&MenuItem> {
        self.all_items().find(|item| item.id == id)
    }

    /// Total number of items on the menu
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.menu.values().map(Vec::len).sum()
    }
}
