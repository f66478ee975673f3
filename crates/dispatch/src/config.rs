//! Dispatch configuration loaded from environment variables.

use std::sync::Arc;

use domain::HandlerRegistry;
use outbox::OutboxStore;

use crate::async_dispatcher::AsyncDispatcher;
use crate::dispatcher::EventDispatcher;
use crate::sync_dispatcher::SyncDispatcher;

/// Which dispatcher implementation handles post-commit delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Queue events onto a background worker (the default).
    Async,
    /// Run handlers inline on the caller's task.
    Sync,
}

/// Dispatch configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `DISPATCH_MODE` — `"async"` or `"sync"` (default: `"async"`)
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub mode: DispatchMode,
}

impl DispatchConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mode = match std::env::var("DISPATCH_MODE").as_deref() {
            Ok("sync") => DispatchMode::Sync,
            _ => DispatchMode::Async,
        };
        Self { mode }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            mode: DispatchMode::Async,
        }
    }
}

/// Builds the dispatcher selected by `config`.
///
/// The asynchronous mode spawns its worker task immediately, so this must
/// run inside a tokio runtime.
pub fn build_dispatcher(
    config: &DispatchConfig,
    store: Arc<dyn OutboxStore>,
    registry: Arc<HandlerRegistry>,
) -> Arc<dyn EventDispatcher> {
    match config.mode {
        DispatchMode::Async => Arc::new(AsyncDispatcher::start(store, registry)),
        DispatchMode::Sync => Arc::new(SyncDispatcher::new(registry)),
    }
}
