//! Shared test helpers

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use carte_gateway::api::ApiState;
use carte_gateway::llm::{ChatClient, ChatMessage};
use carte_gateway::{Assistant, Catalog, Result, SessionStore};

/// A small catalog: two pizzas (one popular) and two pastas (none popular)
pub fn test_catalog() -> Catalog {
    Catalog::from_json(
        r#"{
        "restaurant": {"name": "Test Bistro", "currency": "EUR"},
        "categories": {
            "pizzas": {"name": "Pizzas"},
            "pates": {"name": "Pâtes"}
        },
        "menu": {
            "pizzas": [
                {
                    "id": 1, "name": "Margherita", "price": 9.5,
                    "allergens": ["gluten", "lactose"],
                    "vegetarian": true, "popular": true,
                    "cheeseRemovable": true
                },
                {
                    "id": 2, "name": "Regina", "price": 11.0,
                    "allergens": ["gluten", "lactose"]
                }
            ],
            "pates": [
                {
                    "id": 3, "name": "Pesto", "price": 12.0,
                    "allergens": ["gluten", "fruits à coque", "lactose"],
                    "vegetarian": true
                },
                {
                    "id": 4, "name": "Bolognaise", "price": 13.0,
                    "allergens": ["gluten"]
                }
            ]
        }
    }"#,
    )
    .unwrap()
}

/// Chat collaborator answering from a fixed script, one reply per call
pub struct ScriptedChat {
    replies: Mutex<Vec<Result<String>>>,
}

impl ScriptedChat {
    pub fn replying(raw: &str) -> Arc<Self> {
        Self::sequence(vec![Ok(raw.to_string())])
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Self::sequence(vec![Err(carte_gateway::Error::Llm(message.to_string()))])
    }

    pub fn sequence(replies: Vec<Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies),
        })
    }
}

#[async_trait]
impl ChatClient for ScriptedChat {
    async fn chat(&self, _messages: &[ChatMessage]) -> Result<String> {
        self.replies.lock().unwrap().remove(0)
    }
}

/// Assistant over the test catalog and a scripted collaborator
pub fn test_assistant(chat: Arc<dyn ChatClient>) -> Arc<Assistant> {
    Arc::new(Assistant::new(
        Arc::new(test_catalog()),
        chat,
        Duration::from_secs(5),
    ))
}

/// API state over the test catalog, without STT
pub fn test_state(assistant: Option<Arc<Assistant>>) -> Arc<ApiState> {
    Arc::new(ApiState {
        catalog: Arc::new(test_catalog()),
        assistant,
        stt: None,
        sessions: SessionStore::new(),
        model_info: None,
        default_language: Some("fr".to_string()),
    })
}

/// The real application router over a test state
pub fn test_router(state: Arc<ApiState>) -> axum::Router {
    carte_gateway::api::build_router(state, None)
}
