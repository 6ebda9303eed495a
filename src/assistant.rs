//! Per-turn orchestration: utterance → model → intent → reconciled state
//!
//! Failures here never corrupt session state: an upstream error leaves the
//! category and filters exactly as they were, and a malformed model payload
//! degrades to a text-only reply.

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{Catalog, MenuItem};
use crate::filters::visible_items;
use crate::intent;
use crate::llm::ChatClient;
use crate::prompt;
use crate::session::{Role, Session, SessionState};

/// Outcome of one conversational turn
#[derive(Debug)]
pub enum TurnOutcome {
    /// A normal assistant reply, with the state patch after reconciliation
    Reply {
        text: String,
        /// Whether a non-empty structured action was extracted and applied
        action_applied: bool,
        state: SessionState,
        visible: Vec<MenuItem>,
    },
    /// Empty or whitespace-only utterance; the session is untouched
    NoSpeech,
    /// The model call failed or timed out; prior state intact
    UpstreamError { message: String },
}

/// The conversational assistant bound to one catalog
pub struct Assistant {
    catalog: Arc<Catalog>,
    chat: Arc<dyn ChatClient>,
    system_prompt: String,
    call_timeout: Duration,
}

impl Assistant {
    /// Create an assistant; the system prompt is built once per catalog
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, chat: Arc<dyn ChatClient>, call_timeout: Duration) -> Self {
        let system_prompt = prompt::build_system_prompt(&catalog);
        Self {
            catalog,
            chat,
            system_prompt,
            call_timeout,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run one conversational turn against a session
    ///
    /// The user turn is appended before the model call, so a failed call
    /// still leaves the utterance in history; no assistant turn is
    /// fabricated for upstream errors.
    pub async fn run_turn(&self, session: &mut Session, utterance: &str) -> TurnOutcome {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            tracing::debug!(session_id = %session.id(), "empty utterance, skipping turn");
            return TurnOutcome::NoSpeech;
        }

        session.append_turn(Role::User, utterance);
        let messages = prompt::build_messages(&self.system_prompt, session.history());

        let raw = match tokio::time::timeout(self.call_timeout, self.chat.chat(&messages)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                tracing::warn!(session_id = %session.id(), error = %e, "model call failed");
                return TurnOutcome::UpstreamError {
                    message: format!("assistant unavailable: {e}"),
                };
            }
            Err(_) => {
                tracing::warn!(
                    session_id = %session.id(),
                    timeout_secs = self.call_timeout.as_secs(),
                    "model call timed out"
                );
                return TurnOutcome::UpstreamError {
                    message: "assistant unavailable: request timed out".to_string(),
                };
            }
        };

        let parsed = intent::parse(&raw);
        session.append_turn(Role::Assistant, parsed.reply.clone());

        let action_applied = match &parsed.action {
            Some(action) if !action.is_empty() => {
                tracing::info!(
                    session_id = %session.id(),
                    category = ?action.category,
                    has_filters = action.filters.is_some(),
                    "applying parsed action"
                );
                session.apply(action);
                true
            }
            _ => false,
        };

        let state = session.state().clone();
        let visible = visible_items(&self.catalog, &state.category, &state.filters)
            .into_iter()
            .cloned()
            .collect();

        TurnOutcome::Reply {
            text: parsed.reply,
            action_applied,
            state,
            visible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Chat collaborator answering from a fixed script
    struct ScriptedChat {
        replies: Mutex<Vec<Result<String>>>,
    }

    impl ScriptedChat {
        fn replying(raw: &str) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(vec![Ok(raw.to_string())]),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(vec![Err(crate::Error::Llm(message.to_string()))]),
            })
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedChat {
        async fn chat(&self, _messages: &[crate::llm::ChatMessage]) -> Result<String> {
            self.replies.lock().unwrap().remove(0)
        }
    }

    fn assistant(chat: Arc<dyn ChatClient>) -> Assistant {
        Assistant::new(
            Arc::new(Catalog::embedded().unwrap()),
            chat,
            Duration::from_secs(5),
        )
    }

    #[test]
    fn empty_utterance_is_no_speech() {
        tokio_test::block_on(async {
            let assistant = assistant(ScriptedChat::replying("unused"));
            let mut session = Session::new();

            let outcome = assistant.run_turn(&mut session, "   ").await;
            assert!(matches!(outcome, TurnOutcome::NoSpeech));
            assert!(session.history().is_empty());
        });
    }

    #[test]
    fn structured_reply_updates_state_and_visible_set() {
        tokio_test::block_on(async {
            let raw = r#"{"response":"Voici nos plats végétariens","actions":{"filters":{"vegetarian":true}}}"#;
            let assistant = assistant(ScriptedChat::replying(raw));
            let mut session = Session::new();

            let outcome = assistant.run_turn(&mut session, "je suis végétarien").await;
            let TurnOutcome::Reply {
                text,
                action_applied,
                state,
                visible,
            } = outcome
            else {
                panic!("expected a reply outcome");
            };

            assert_eq!(text, "Voici nos plats végétariens");
            assert!(action_applied);
            assert!(state.filters.vegetarian);
            assert!(!visible.is_empty());
            assert!(visible.iter().all(|item| item.vegetarian));
            assert_eq!(session.history().len(), 2);
        });
    }

    #[test]
    fn prose_reply_degrades_to_text_only() {
        tokio_test::block_on(async {
            let assistant = assistant(ScriptedChat::replying("La Margherita est excellente."));
            let mut session = Session::new();

            let outcome = assistant.run_turn(&mut session, "un conseil ?").await;
            let TurnOutcome::Reply {
                text,
                action_applied,
                state,
                ..
            } = outcome
            else {
                panic!("expected a reply outcome");
            };

            assert_eq!(text, "La Margherita est excellente.");
            assert!(!action_applied);
            assert_eq!(state, SessionState::default());
            assert_eq!(session.last_reply(), Some("La Margherita est excellente."));
        });
    }

    #[test]
    fn upstream_failure_leaves_state_intact() {
        tokio_test::block_on(async {
            let assistant = assistant(ScriptedChat::failing("rate limited"));
            let mut session = Session::new();
            session.set_category("pizzas");

            let outcome = assistant.run_turn(&mut session, "et les pâtes ?").await;
            let TurnOutcome::UpstreamError { message } = outcome else {
                panic!("expected an upstream error outcome");
            };

            assert!(message.contains("rate limited"));
            assert_eq!(session.state().category, "pizzas");
            // The user turn stays; no assistant turn is fabricated.
            assert_eq!(session.history().len(), 1);
            assert_eq!(session.history()[0].role, Role::User);
        });
    }
}
