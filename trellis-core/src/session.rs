//! Session State
//!
//! Auth-aware routing reads the requester's session through the
//! [`SessionStore`] trait. The crate does not manage authentication
//! itself: something outside logs users in and writes the user value
//! under an agreed key, and the auth router only ever reads it.
//!
//! [`MemorySession`] is the in-process implementation used by tests and
//! single-process embeddings.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

/// Key-value session state scoped to one requester.
pub trait SessionStore: Send + Sync {
    /// Current value under `key`, if present.
    fn get(&self, key: &str) -> Option<Value>;

    /// Insert or replace the value under `key`.
    fn set(&self, key: &str, value: Value);

    /// Remove `key`, returning the previous value if any.
    fn remove(&self, key: &str) -> Option<Value>;
}

/// In-memory session store. Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct MemorySession {
    values: Arc<DashMap<String, Value>>,
}

impl MemorySession {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) -> Option<Value> {
        self.values.remove(key).map(|(_, value)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_get_remove() {
        let session = MemorySession::new();
        assert_eq!(session.get("user"), None);

        session.set("user", json!({"name": "ada"}));
        assert_eq!(session.get("user"), Some(json!({"name": "ada"})));

        assert_eq!(session.remove("user"), Some(json!({"name": "ada"})));
        assert_eq!(session.get("user"), None);
    }

    #[test]
    fn clones_share_state() {
        let session = MemorySession::new();
        let alias = session.clone();

        session.set("user", json!("ada"));
        assert_eq!(alias.get("user"), Some(json!("ada")));
    }
}
