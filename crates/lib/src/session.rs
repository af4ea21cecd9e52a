//! Conversation sessions and their bounded turn history.
//!
//! Sessions are keyed by connection identity. Each session sits behind its own async mutex,
//! so turns of one conversation are serialized while other connections proceed independently.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::llm::ChatMessage;

/// Unique session identifier (opaque string).
pub type SessionId = String;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One message exchanged in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }

    pub fn to_chat_message(&self) -> ChatMessage {
        ChatMessage {
            role: self.role.as_str().to_string(),
            content: self.text.clone(),
        }
    }
}

/// Ordered turns, holding at most `2 * window` entries. Oldest entries are evicted first.
#[derive(Debug, Clone)]
pub struct History {
    window: usize,
    turns: VecDeque<Turn>,
}

impl History {
    /// `window` is the number of exchanges (user + assistant pairs) retained.
    pub fn new(window: usize) -> Self {
        Self {
            window,
            turns: VecDeque::with_capacity(window.saturating_mul(2)),
        }
    }

    /// Maximum number of turns kept.
    pub fn capacity(&self) -> usize {
        self.window.saturating_mul(2)
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        self.trim();
    }

    fn trim(&mut self) {
        let cap = self.capacity();
        while self.turns.len() > cap {
            self.turns.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.back()
    }
}

/// A session: id and its bounded history.
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub history: History,
}

/// Handle to one session; lock it for the duration of a turn.
pub type SessionHandle = Arc<Mutex<Session>>;

/// In-memory store for sessions (create, get, remove).
pub struct SessionStore {
    window: usize,
    inner: Arc<RwLock<HashMap<SessionId, SessionHandle>>>,
}

impl SessionStore {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a new session with a generated id; returns the session id.
    pub async fn create(&self) -> SessionId {
        let id = format!("sess-{}", uuid::Uuid::new_v4());
        let session = Session {
            id: id.clone(),
            history: History::new(self.window),
        };
        self.inner
            .write()
            .await
            .insert(id.clone(), Arc::new(Mutex::new(session)));
        id
    }

    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.inner.read().await.get(id).cloned()
    }

    pub async fn remove(&self, id: &str) {
        self.inner.write().await.remove(id);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_never_exceeds_two_k() {
        let mut h = History::new(3);
        for i in 0..20 {
            h.push(Turn::user(format!("q{}", i)));
            h.push(Turn::assistant(format!("a{}", i)));
            assert!(h.len() <= 6);
        }
        assert_eq!(h.len(), 6);
    }

    #[test]
    fn oldest_turns_are_evicted_first() {
        let mut h = History::new(2);
        for i in 0..5 {
            h.push(Turn::user(format!("q{}", i)));
            h.push(Turn::assistant(format!("a{}", i)));
        }
        let texts: Vec<&str> = h.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["q3", "a3", "q4", "a4"]);
    }

    #[test]
    fn odd_pushes_keep_insertion_order() {
        let mut h = History::new(1);
        h.push(Turn::user("one"));
        h.push(Turn::assistant("two"));
        h.push(Turn::assistant("three"));
        let texts: Vec<&str> = h.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "three"]);
        assert_eq!(h.last().map(|t| t.role), Some(Role::Assistant));
    }

    #[test]
    fn zero_window_keeps_nothing() {
        let mut h = History::new(0);
        h.push(Turn::user("x"));
        assert!(h.is_empty());
    }

    #[tokio::test]
    async fn sessions_are_isolated_and_removable() {
        let store = SessionStore::new(10);
        let a = store.create().await;
        let b = store.create().await;
        assert_ne!(a, b);
        store
            .get(&a)
            .await
            .unwrap()
            .lock()
            .await
            .history
            .push(Turn::user("hello"));
        assert_eq!(store.get(&a).await.unwrap().lock().await.history.len(), 1);
        assert!(store.get(&b).await.unwrap().lock().await.history.is_empty());
        store.remove(&a).await;
        assert!(store.get(&a).await.is_none());
        assert_eq!(store.len().await, 1);
    }
}
