//! In-memory store for tests and demos.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::StreakStore;
use crate::error::StoreError;
use crate::state::StreakState;

/// [`StreakStore`] held in process memory, with switchable write failures
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<Option<StreakState>>,
    fail_writes: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing record
    pub fn with_state(state: StreakState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
            ..Self::default()
        }
    }

    /// Make subsequent saves fail with `StoreError::Unavailable`
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Replace the stored record directly, bypassing the engine
    pub fn overwrite(&self, state: Option<StreakState>) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }
}

impl StreakStore for MemoryStore {
    fn load(&self) -> Result<Option<StreakState>, StoreError> {
        Ok(self.state.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, state: &StreakState) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store write disabled".into()));
        }
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = Some(state.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
