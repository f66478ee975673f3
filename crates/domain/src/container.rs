//! Per-delivery scratch space shared by the handlers of one event.

use std::any::Any;
use std::collections::HashMap;

/// Mutable key/value scratch map with a lifetime of one delivery: one
/// event, all its handlers. A higher-priority handler stores a value under
/// an agreed key and a later handler reads it back.
///
/// Not persisted and never shared across deliveries. Handlers run
/// sequentially, so plain exclusive access is all that is needed.
#[derive(Default)]
pub struct HandlerContainer {
    entries: HashMap<String, Box<dyn Any + Send>>,
}

impl HandlerContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value under `key`, replacing any previous value.
    pub fn set<T: Any + Send>(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(key.into(), Box::new(value));
    }

    /// Returns a clone of the value stored under `key`, or `None` when the
    /// key is absent or the stored value is not a `T`.
    pub fn get<T: Any + Clone>(&self, key: &str) -> Option<T> {
        self.entries
            .get(key)
            .and_then(|v| v.downcast_ref::<T>())
            .cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for HandlerContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerContainer")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_returns_value() {
        let mut container = HandlerContainer::new();
        container.set("count", 42_i64);

        assert_eq!(container.get::<i64>("count"), Some(42));
    }

    #[test]
    fn get_missing_key_returns_none() {
        let container = HandlerContainer::new();
        assert_eq!(container.get::<i64>("missing"), None);
    }

    #[test]
    fn get_with_wrong_type_returns_none() {
        let mut container = HandlerContainer::new();
        container.set("count", 42_i64);

        assert_eq!(container.get::<String>("count"), None);
    }

    #[test]
    fn set_upserts() {
        let mut container = HandlerContainer::new();
        container.set("k", "first".to_string());
        container.set("k", "second".to_string());

        assert_eq!(container.get::<String>("k"), Some("second".to_string()));
        assert_eq!(container.len(), 1);
    }
}
