//! Handler registry: event tag to ordered handler list.

use std::collections::HashMap;
use std::sync::Arc;

use crate::handler::EventHandler;

/// Registry mapping an event tag to its handlers.
///
/// Built once at startup; lookups at dispatch time are a plain map read.
/// The handler list for a tag is kept sorted by descending priority, with
/// registration order as the tie-break, so resolution returns handlers in
/// exactly the order they must run.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Vec<Arc<dyn EventHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under its declared event tag.
    pub fn register(&mut self, handler: Arc<dyn EventHandler>) {
        let entry = self
            .handlers
            .entry(handler.event_name().to_string())
            .or_default();
        entry.push(handler);
        // Stable sort keeps registration order among equal priorities.
        entry.sort_by_key(|h| std::cmp::Reverse(h.priority()));
    }

    /// Returns the handlers for an event tag in execution order, empty
    /// when none are registered.
    pub fn handlers_for(&self, event_name: &str) -> &[Arc<dyn EventHandler>] {
        self.handlers.get(event_name).map_or(&[], Vec::as_slice)
    }

    /// Total number of registered handlers across all tags.
    pub fn len(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut counts: Vec<(&str, usize)> = self
            .handlers
            .iter()
            .map(|(name, list)| (name.as_str(), list.len()))
            .collect();
        counts.sort();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &counts)
            .finish()
    }
}
