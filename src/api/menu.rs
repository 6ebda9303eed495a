//! Menu API endpoints: catalog snapshot and direct predicate evaluation

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::catalog::{ALL_CATEGORIES, Catalog, MenuItem};
use crate::filters::{FilterSet, visible_items};

/// Build menu router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(full_menu))
        .route("/visible", get(visible))
        .with_state(state)
}

/// Full catalog snapshot for the presentation layer
async fn full_menu(State(state): State<Arc<ApiState>>) -> Json<Catalog> {
    Json((*state.catalog).clone())
}

/// Query parameters for direct predicate evaluation
///
/// Used by the presentation layer for direct user toggles, without a
/// conversation turn. Spelled out field by field because flattened
/// structs do not round-trip booleans through the query-string decoder.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VisibleQuery {
    category: Option<String>,
    vegetarian: bool,
    vegan: bool,
    halal: bool,
    no_allergens: bool,
    popular: bool,
    no_cheese: bool,
}

impl VisibleQuery {
    const fn filters(&self) -> FilterSet {
        FilterSet {
            vegetarian: self.vegetarian,
            vegan: self.vegan,
            halal: self.halal,
            no_allergens: self.no_allergens,
            popular: self.popular,
            no_cheese: self.no_cheese,
        }
    }
}

/// Response for a predicate evaluation
#[derive(Serialize)]
struct VisibleResponse {
    category: String,
    filters: FilterSet,
    count: usize,
    items: Vec<MenuItem>,
}

/// Evaluate the visible subset for a category and filter combination
async fn visible(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<VisibleQuery>,
) -> Json<VisibleResponse> {
    let filters = query.filters();
    let category = query
        .category
        .unwrap_or_else(|| ALL_CATEGORIES.to_string());

    let items: Vec<MenuItem> = visible_items(&state.catalog, &category, &filters)
        .into_iter()
        .cloned()
        .collect();

    Json(VisibleResponse {
        category,
        filters,
        count: items.len(),
        items,
    })
}
