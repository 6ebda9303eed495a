//! Carte Gateway - Voice-driven menu assistant gateway for restaurants
//!
//! This library provides the core functionality for the Carte gateway:
//! - Menu catalog loading and filter predicate evaluation
//! - Intent payload parsing of raw language-model replies
//! - Deterministic reconciliation of parsed actions onto session state
//! - Speech-to-text processing for voice utterances
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 Presentation layer                   │
//! │        menu UI  │  audio capture  │  toggles        │
//! └────────────────────┬────────────────────────────────┘
//!                      │ HTTP
//! ┌────────────────────▼────────────────────────────────┐
//! │                  Carte Gateway                       │
//! │   STT  │  Session  │  Intent Parser  │  Reconciler  │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │            External collaborators                    │
//! │   Whisper / Deepgram (STT)  │  Chat completions     │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod assistant;
pub mod catalog;
pub mod config;
pub mod daemon;
pub mod error;
pub mod filters;
pub mod intent;
pub mod llm;
pub mod prompt;
pub mod reconcile;
pub mod session;
pub mod voice;

pub use assistant::{Assistant, TurnOutcome};
pub use catalog::{ALL_CATEGORIES, Catalog, CategoryInfo, MenuItem, RestaurantInfo};
pub use config::Config;
pub use daemon::Daemon;
pub use error::{Error, Result};
pub use filters::{FilterSet, FilterUpdate, visible_items};
pub use intent::{ParsedAction, ParsedResponse, parse};
pub use llm::{ChatClient, ChatMessage, OpenAiChat};
pub use reconcile::reconcile;
pub use session::{Role, Session, SessionState, SessionStore, Turn};
pub use voice::{MAX_AUDIO_BYTES, SpeechToText, Transcription};
