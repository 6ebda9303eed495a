//! Conversation sessions: dialogue history plus the menu state patch
//!
//! A session is an in-memory value owned by one controller. Only the
//! reconciler (via [`Session::apply`]) and direct user toggles change its
//! state; the parser never touches it.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::catalog::ALL_CATEGORIES;
use crate::filters::FilterSet;
use crate::intent::ParsedAction;
use crate::reconcile::reconcile;

/// Retention cap for the dialogue history; the oldest turn is dropped first
pub const MAX_HISTORY_TURNS: usize = 64;

/// Speaker role of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One dialogue turn
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// The menu state the reconciler owns, serialized to the presentation layer
///
/// Invariant: `filters` is always a total [`FilterSet`] and `category` is
/// always a defined string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub category: String,
    pub filters: FilterSet,
    pub recommendations: Vec<u32>,
    pub show_items: Vec<u32>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            category: ALL_CATEGORIES.to_string(),
            filters: FilterSet::default(),
            recommendations: Vec::new(),
            show_items: Vec::new(),
        }
    }
}

/// A running conversation
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    state: SessionState,
    history: Vec<Turn>,
    last_reply: Option<String>,
    created_at: DateTime<Utc>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a fresh session: category "all", every filter false
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::default(),
            history: Vec::new(),
            last_reply: None,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Current state (read-only)
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Dialogue history, oldest first
    #[must_use]
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Last assistant reply, if any
    #[must_use]
    pub fn last_reply(&self) -> Option<&str> {
        self.last_reply.as_deref()
    }

    /// Append a dialogue turn, dropping the oldest beyond the retention cap
    pub fn append_turn(&mut self, role: Role, text: impl Into<String>) {
        let text = text.into();
        if role == Role::Assistant {
            self.last_reply = Some(text.clone());
        }
        self.history.push(Turn {
            role,
            text,
            created_at: Utc::now(),
        });
        if self.history.len() > MAX_HISTORY_TURNS {
            let excess = self.history.len() - MAX_HISTORY_TURNS;
            self.history.drain(..excess);
        }
    }

    /// Apply a parsed action through the reconciler
    ///
    /// The next state is computed as a whole and swapped in, so a single
    /// action is never partially applied.
    pub fn apply(&mut self, action: &ParsedAction) {
        self.state = reconcile(&self.state, action);
    }

    /// Direct user toggle of the category selector, bypassing the model
    pub fn set_category(&mut self, category: impl Into<String>) {
        self.state.category = category.into();
    }

    /// Direct user replacement of the filter set, bypassing the model
    pub fn set_filters(&mut self, filters: FilterSet) {
        self.state.filters = filters;
    }
}

/// Shared in-memory session store keyed by session id
///
/// The per-session `Mutex` serializes turns: no two reconciliations can run
/// concurrently against the same session.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a new session
    pub async fn create(&self) -> (Uuid, Arc<Mutex<Session>>) {
        let session = Session::new();
        let id = session.id();
        let handle = Arc::new(Mutex::new(session));
        self.inner.write().await.insert(id, Arc::clone(&handle));
        tracing::debug!(session_id = %id, "created session");
        (id, handle)
    }

    /// Look up a session by id
    pub async fn get(&self, id: Uuid) -> Option<Arc<Mutex<Session>>> {
        self.inner.read().await.get(&id).cloned()
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether the store holds no sessions
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
