//! Shared Tree Context
//!
//! A [`Context`] is a small key-value bag handed to the tree builder and
//! propagated to every node during assembly. All nodes of one tree see the
//! *same* underlying map, so a write made by one component is visible to
//! every other component of that tree.
//!
//! Typical keys are deployment facts the tree cannot derive on its own,
//! such as the `prefix` a mounted application is served under.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

/// Shared key-value state for one component tree.
///
/// Cloning a `Context` clones the *handle*, not the map: clones observe
/// each other's writes. A genuinely independent context requires
/// [`Context::new`].
#[derive(Clone, Default)]
pub struct Context {
    values: Arc<RwLock<HashMap<String, Value>>>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, for assembling a context inline.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let ctx = Context::new().with_value("prefix", "/app");
    /// ```
    pub fn with_value(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value under `key`.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.write().insert(key.into(), value.into());
    }

    /// Look up `key`, cloning the stored value out of the shared map.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.read().get(key).cloned()
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.read().contains_key(key)
    }

    /// Remove `key`, returning the previous value if any.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.values.write().remove(key)
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Whether the context holds no keys.
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// Whether two handles point at the same underlying map.
    ///
    /// This is the identity the tree builder establishes: every node of a
    /// built tree reports `true` against every other node's context.
    pub fn ptr_eq(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.values.read();
        f.debug_struct("Context").field("values", &*values).finish()
    }
}
