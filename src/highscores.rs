//! Best distance bookkeeping
//!
//! A single scalar, persisted to sessionStorage on the web so it survives
//! reloads but not the browser session.

/// Persistence for the best distance
pub trait ScoreStore {
    fn get_high_score(&self) -> u32;
    fn set_high_score(&mut self, meters: u32);
}

/// In-memory store (native builds, tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: u32,
}

impl MemoryStore {
    pub fn new(value: u32) -> Self {
        Self { value }
    }
}

impl ScoreStore for MemoryStore {
    fn get_high_score(&self) -> u32 {
        self.value
    }

    fn set_high_score(&mut self, meters: u32) {
        self.value = meters;
    }
}

/// Best distance of the browser session, backed by a [`ScoreStore`]
#[derive(Debug, Clone)]
pub struct BestDistance<S: ScoreStore> {
    store: S,
    best: u32,
}

impl<S: ScoreStore> BestDistance<S> {
    pub fn new(store: S) -> Self {
        let best = store.get_high_score();
        Self { store, best }
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Record a finished run; returns true on a new best
    pub fn submit(&mut self, meters: u32) -> bool {
        if meters <= self.best {
            return false;
        }
        self.best = meters;
        self.store.set_high_score(meters);
        log::info!("New best distance: {}m", meters);
        true
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// sessionStorage-backed store
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct SessionStore;

#[cfg(target_arch = "wasm32")]
impl SessionStore {
    const STORAGE_KEY: &'static str = "zombrush_high_score";

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.session_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl ScoreStore for SessionStore {
    fn get_high_score(&self) -> u32 {
        Self::storage()
            .and_then(|s| s.get_item(Self::STORAGE_KEY).ok().flatten())
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    fn set_high_score(&mut self, meters: u32) {
        if let Some(storage) = Self::storage() {
            let _ = storage.set_item(Self::STORAGE_KEY, &meters.to_string());
        }
    }
}
