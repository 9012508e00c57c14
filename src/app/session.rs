use crate::domain::model::{Category, Level};
use serde::Serialize;
use std::collections::HashMap;

/// What the assistant remembers between messages of one conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub last_budget: Option<u32>,
    pub last_level: Option<Level>,
    pub last_owned_categories: Vec<Category>,
}

/// Per-session states. An empty id gets a fresh state every time.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, SessionState>,
    scratch: SessionState,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&mut self, id: &str) -> &mut SessionState {
        let id = id.trim();
        if id.is_empty() {
            self.scratch = SessionState::default();
            return &mut self.scratch;
        }
        self.sessions.entry(id.to_string()).or_default()
    }

    pub fn get(&self, id: &str) -> Option<&SessionState> {
        self.sessions.get(id.trim())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_sessions_persist() {
        let mut store = SessionStore::new();
        store.session("alice").last_budget = Some(1200);

        assert_eq!(store.session(" alice ").last_budget, Some(1200));
        assert_eq!(store.session("bob").last_budget, None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_anonymous_session_is_not_kept() {
        let mut store = SessionStore::new();
        store.session("").last_budget = Some(900);

        assert_eq!(store.session("").last_budget, None);
        assert!(store.is_empty());
    }
}
