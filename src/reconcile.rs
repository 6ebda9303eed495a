//! Deterministic application of parsed actions to session state

use crate::catalog::ALL_CATEGORIES;
use crate::intent::ParsedAction;
use crate::session::SessionState;

/// Compute the next session state from a parsed action
///
/// Pure next-state function: the caller swaps the result in whole, so an
/// action is applied atomically. Steps run in a fixed priority order and
/// each is skipped when the corresponding field is absent:
///
/// 1. category, verbatim — category must land before filters because the
///    predicate engine reads both together, and a category change usually
///    accompanies a filter reset ("I want pasta" must not keep a stale
///    "popular" filter from three turns ago),
/// 2. filters, reset-then-merge over an all-false baseline; a filter
///    instruction without an explicit category applies to the whole menu,
///    so the category also resets to "all",
/// 3. custom filters (advisory; `withCheese` is the one wired case),
/// 4. recommendation / show-item lists, which never touch category or
///    filters.
#[must_use]
pub fn reconcile(state: &SessionState, action: &ParsedAction) -> SessionState {
    let mut next = state.clone();

    if let Some(category) = &action.category {
        // No validation against the catalog: an unknown key is accepted and
        // yields an empty visible set downstream instead of failing the turn.
        next.category = category.clone();
    }

    if let Some(update) = &action.filters {
        next.filters = update.onto_reset();
        if action.category.is_none() {
            next.category = ALL_CATEGORIES.to_string();
        }
    }

    for (key, value) in &action.custom_filters {
        if key == "withCheese" && *value {
            next.category = ALL_CATEGORIES.to_string();
        } else {
            tracing::debug!(filter = %key, value, "ignoring unwired custom filter");
        }
    }

    if let Some(ids) = &action.recommendations {
        next.recommendations = ids.clone();
    }
    if let Some(ids) = &action.show_items {
        next.show_items = ids.clone();
    }

    next
}
