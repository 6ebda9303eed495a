//! System prompt construction with a catalog snapshot
//!
//! The model only ever sees what this module puts in front of it: the
//! restaurant, the menu, the reply contract, and a bounded window of the
//! conversation so far.

use std::fmt::Write as _;

use crate::catalog::Catalog;
use crate::llm::ChatMessage;
use crate::session::{Role, Turn};

/// Dialogue turns forwarded to the model each call
pub const HISTORY_WINDOW: usize = 12;

/// Build the system prompt for a catalog
#[must_use]
pub fn build_system_prompt(catalog: &Catalog) -> String {
    let mut prompt = format!(
        "You are the menu assistant of \"{}\". {}\n\
         You help guests browse the menu by voice: answer briefly and warmly, \
         in the guest's own language.\n\nMENU\n",
        catalog.restaurant.name, catalog.restaurant.description
    );

    for (key, info) in &catalog.categories {
        let _ = writeln!(prompt, "\n[{key}] {}", info.name);
        for item in catalog.items_in(key) {
            let mut marks = Vec::new();
            if item.vegetarian {
                marks.push("vegetarian");
            }
            if item.vegan {
                marks.push("vegan");
            }
            if item.halal {
                marks.push("halal");
            }
            if item.popular {
                marks.push("popular");
            }
            if item.spicy {
                marks.push("spicy");
            }
            if item.cheese_removable == Some(true) {
                marks.push("cheese removable");
            }
            let _ = write!(
                prompt,
                "- {} {} — {:.2} {}",
                item.id, item.name, item.price, catalog.restaurant.currency
            );
            if !marks.is_empty() {
                let _ = write!(prompt, " [{}]", marks.join(", "));
            }
            if item.allergens.is_empty() {
                let _ = writeln!(prompt, " (no allergens)");
            } else {
                let _ = writeln!(prompt, " (allergens: {})", item.allergens.join(", "));
            }
        }
    }

    prompt.push_str(
        "\nREPLY FORMAT\n\
         Always answer with a single JSON object and nothing else:\n\
         {\"response\": \"<your reply to the guest>\", \"actions\": {...}}\n\
         Fields of \"actions\", all optional:\n\
         - \"category\": a category key above, or \"all\" for the whole menu\n\
         - \"filters\": object with any of \"vegetarian\", \"vegan\", \"halal\", \
           \"noAllergens\", \"popular\", \"noCheese\" as booleans. Include only \
           the keys you mean to assert; a \"filters\" object replaces every \
           previously active filter and applies to the whole menu unless you \
           also set a category.\n\
         - \"customFilters\": object with extra booleans such as \"withCheese\", \
           \"withMeat\", \"spicy\". Only \"withCheese\": true changes the display \
           (it shows the whole menu); the others are recorded but not applied.\n\
         - \"recommendations\": item ids you suggest\n\
         - \"showItems\": item ids to display exclusively\n\
         - \"reasoning\": one short sentence for the log\n\
         Omit \"actions\" entirely when nothing about the display should change.\n",
    );

    prompt
}

/// Assemble the message list for one completion
///
/// The history window keeps the request bounded regardless of how long the
/// conversation has been running; [`crate::session`] caps total retention
/// separately.
#[must_use]
pub fn build_messages(system_prompt: &str, history: &[Turn]) -> Vec<ChatMessage> {
    let recent = history
        .len()
        .saturating_sub(HISTORY_WINDOW);

    let mut messages = Vec::with_capacity(history.len() - recent + 1);
    messages.push(ChatMessage::system(system_prompt));
    for turn in &history[recent..] {
        messages.push(match turn.role {
            Role::User => ChatMessage::user(turn.text.clone()),
            Role::Assistant => ChatMessage::assistant(turn.text.clone()),
        });
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn turn(role: Role, text: &str) -> Turn {
        Turn {
            role,
            text: text.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn prompt_lists_categories_and_items() {
        let catalog = Catalog::embedded().unwrap();
        let prompt = build_system_prompt(&catalog);

        assert!(prompt.contains("[pizzas]"));
        assert!(prompt.contains("[pates]"));
        assert!(prompt.contains("Margherita"));
        assert!(prompt.contains("noCheese"));
        assert!(prompt.contains("withCheese"));
    }

    #[test]
    fn prompt_marks_item_attributes() {
        let catalog = Catalog::embedded().unwrap();
        let prompt = build_system_prompt(&catalog);

        assert!(prompt.contains("cheese removable"));
        assert!(prompt.contains("(no allergens)"));
    }

    #[test]
    fn messages_start_with_system_and_preserve_order() {
        let history = vec![
            turn(Role::User, "bonjour"),
            turn(Role::Assistant, "bienvenue"),
            turn(Role::User, "une pizza"),
        ];
        let messages = build_messages("sys", &history);

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].content, "bonjour");
        assert_eq!(messages[3].content, "une pizza");
    }

    #[test]
    fn history_window_is_bounded() {
        let history: Vec<Turn> = (0..40)
            .map(|i| turn(Role::User, &format!("turn {i}")))
            .collect();
        let messages = build_messages("sys", &history);

        assert_eq!(messages.len(), HISTORY_WINDOW + 1);
        assert_eq!(messages[1].content, "turn 28");
        assert_eq!(messages.last().unwrap().content, "turn 39");
    }
}
