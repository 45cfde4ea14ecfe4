use std::sync::Arc;

use tempo_core::{Engine, MemoryStore, WakeConfig};

/// Shared application state.
///
/// The store is the only mutable piece; engines are constructed per
/// request over a borrow of it.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub wake: WakeConfig,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            store: Arc::new(MemoryStore::new()),
            wake: WakeConfig::default(),
        }
    }

    pub fn engine(&self) -> Engine<'_, MemoryStore> {
        Engine::new(&self.store)
    }
}
