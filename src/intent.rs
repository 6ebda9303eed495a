//! Intent payload parsing for raw language-model replies
//!
//! The model is asked to answer with a JSON object shaped
//! `{"response": "...", "actions": {...}}`, but its output routinely arrives
//! wrapped in code fences, prefixed with prose, or cut off mid-object. The
//! parser recovers what it can and falls back to a text-only reply rather
//! than failing the turn.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::filters::FilterUpdate;

/// Structured intent extracted from one assistant turn
///
/// Every field is optional; absent fields are skipped by the reconciler.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParsedAction {
    /// Category key to select, taken verbatim (unknown keys are accepted)
    pub category: Option<String>,
    /// Partial filter update; present keys overlay a fully-reset baseline
    pub filters: Option<FilterUpdate>,
    /// Free-form boolean flags outside the fixed `FilterSet` (advisory)
    pub custom_filters: BTreeMap<String, bool>,
    /// Item ids the assistant recommends
    pub recommendations: Option<Vec<u32>>,
    /// Item ids to exclusively display
    pub show_items: Option<Vec<u32>>,
    /// Free-text reasoning, diagnostic only
    pub reasoning: Option<String>,
}

impl ParsedAction {
    /// Whether the action carries nothing at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.filters.is_none()
            && self.custom_filters.is_empty()
            && self.recommendations.is_none()
            && self.show_items.is_none()
    }
}

/// A model reply after noise-tolerant decoding
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    /// User-facing reply text
    pub reply: String,
    /// Structured action, absent when none was recovered
    pub action: Option<ParsedAction>,
}

impl ParsedResponse {
    fn text_only(raw: &str) -> Self {
        Self {
            reply: raw.to_string(),
            action: None,
        }
    }
}

/// Recognized payload shape
#[derive(Deserialize)]
struct RawPayload {
    /// Kept as a raw value so a missing or non-string field can be detected
    /// without failing the whole decode
    #[serde(default)]
    response: Option<Value>,
    #[serde(default)]
    actions: Option<ParsedAction>,
}

/// Extract a reply and an optional action from raw model output
///
/// Any decode failure is recovered locally: the conversation continues with
/// the whole raw text as the reply and no structured action this turn.
#[must_use]
pub fn parse(raw: &str) -> ParsedResponse {
    let mut text = raw.trim();

    // Leading code-fence marker, with optional "json" language tag
    if let Some(rest) = text.strip_prefix("```") {
        text = rest.strip_prefix("json").unwrap_or(rest).trim_start();
    }
    // Trailing code-fence marker
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }
    // The model sometimes emits a bare "json" token without fences
    if let Some(rest) = text.strip_prefix("json") {
        if rest.starts_with(|c: char| c.is_whitespace() || c == '{') {
            text = rest.trim_start();
        }
    }

    // Slice to the first-open/last-close brace span. A greedy or naive regex
    // would truncate nested structures; unbalanced braces take the fallback.
    let Some(start) = text.find('{') else {
        tracing::debug!("no JSON object in model reply, using text fallback");
        return ParsedResponse::text_only(raw);
    };
    let Some(end) = text.rfind('}') else {
        tracing::debug!("unbalanced braces in model reply, using text fallback");
        return ParsedResponse::text_only(raw);
    };
    if start >= end {
        tracing::debug!("unbalanced braces in model reply, using text fallback");
        return ParsedResponse::text_only(raw);
    }

    let payload: RawPayload = match serde_json::from_str(&text[start..=end]) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!(error = %e, "model reply failed structured decode, using text fallback");
            return ParsedResponse::text_only(raw);
        }
    };

    match payload.response {
        Some(Value::String(reply)) => ParsedResponse {
            reply,
            action: payload.actions,
        },
        _ => {
            tracing::debug!("model reply missing string response field, using text fallback");
            ParsedResponse::text_only(raw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_payload_parses() {
        let parsed = parse(r#"{"response":"hi"}"#);
        assert_eq!(parsed.reply, "hi");
        assert!(parsed.action.is_none());
    }

    #[test]
    fn fenced_payload_parses() {
        let parsed = parse("```json\n{\"response\":\"hi\"}\n```");
        assert_eq!(parsed.reply, "hi");
        assert!(parsed.action.is_none());
    }

    #[test]
    fn fence_without_language_tag_parses() {
        let parsed = parse("```\n{\"response\":\"bonjour\"}\n```");
        assert_eq!(parsed.reply, "bonjour");
    }

    #[test]
    fn bare_json_token_is_stripped() {
        let parsed = parse("json\n{\"response\":\"ok\"}");
        assert_eq!(parsed.reply, "ok");
    }

    #[test]
    fn surrounding_prose_is_ignored() {
        let raw = r#"Here you go: {"response":"ok","actions":{"category":"pizzas"}} Enjoy!"#;
        let parsed = parse(raw);
        assert_eq!(parsed.reply, "ok");
        assert_eq!(
            parsed.action.unwrap().category.as_deref(),
            Some("pizzas")
        );
    }

    #[test]
    fn nested_braces_survive_span_extraction() {
        let raw = r#"{"response":"voila","actions":{"filters":{"vegan":true},"customFilters":{"withMeat":false}}}"#;
        let parsed = parse(raw);
        assert_eq!(parsed.reply, "voila");
        let action = parsed.action.unwrap();
        assert_eq!(action.filters.unwrap().vegan, Some(true));
        assert_eq!(action.custom_filters.get("withMeat"), Some(&false));
    }

    #[test]
    fn unbalanced_braces_fall_back_to_full_text() {
        let raw = r#"{"response": "oops"#;
        let parsed = parse(raw);
        assert_eq!(parsed.reply, raw);
        assert!(parsed.action.is_none());
    }

    #[test]
    fn prose_without_json_falls_back() {
        let raw = "Je vous recommande la Margherita.";
        let parsed = parse(raw);
        assert_eq!(parsed.reply, raw);
        assert!(parsed.action.is_none());
    }

    #[test]
    fn missing_response_field_falls_back() {
        let raw = r#"{"actions":{"category":"pizzas"}}"#;
        let parsed = parse(raw);
        assert_eq!(parsed.reply, raw);
        assert!(parsed.action.is_none());
    }

    #[test]
    fn non_string_response_field_falls_back() {
        let raw = r#"{"response": 42}"#;
        let parsed = parse(raw);
        assert_eq!(parsed.reply, raw);
        assert!(parsed.action.is_none());
    }

    #[test]
    fn malformed_actions_fall_back() {
        let raw = r#"{"response":"ok","actions":{"category":7}}"#;
        let parsed = parse(raw);
        assert_eq!(parsed.reply, raw);
        assert!(parsed.action.is_none());
    }

    #[test]
    fn reply_starting_with_json_word_is_not_mangled() {
        let raw = "jsonette is not a word";
        let parsed = parse(raw);
        assert_eq!(parsed.reply, raw);
    }

    #[test]
    fn partial_filters_distinguish_unset_from_false() {
        let parsed = parse(r#"{"response":"ok","actions":{"filters":{"vegetarian":false}}}"#);
        let filters = parsed.action.unwrap().filters.unwrap();
        assert_eq!(filters.vegetarian, Some(false));
        assert_eq!(filters.vegan, None);
    }

    #[test]
    fn show_items_and_recommendations_decode() {
        let raw = r#"{"response":"ok","actions":{"recommendations":[1,3],"showItems":[2]}}"#;
        let action = parse(raw).action.unwrap();
        assert_eq!(action.recommendations, Some(vec![1, 3]));
        assert_eq!(action.show_items, Some(vec![2]));
    }
}
