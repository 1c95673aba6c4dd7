//! Lazily constructed, process-wide engine holder.
//!
//! Construction is attempted exactly once. While it runs, other callers get
//! [`Error::EngineInitializing`] instead of blocking or starting a second
//! build; a failed build is remembered and reported as
//! [`Error::EngineUnavailable`]. Reloads swap in a complete new engine, so a
//! query that already holds an `Arc` finishes against the engine it started
//! with.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{error, info};

use kbase_core::types::HealthStatus;
use kbase_core::{Error, Result};

use crate::engine::RetrievalEngine;

enum CellState {
    NotStarted,
    Initializing,
    Ready(Arc<RetrievalEngine>),
    Failed(String),
}

pub struct EngineCell {
    state: Mutex<CellState>,
}

impl Default for EngineCell {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineCell {
    pub const fn new() -> Self {
        Self { state: Mutex::new(CellState::NotStarted) }
    }

    fn lock(&self) -> MutexGuard<'_, CellState> {
        // The state is always left consistent, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the engine without ever starting construction.
    pub fn get(&self) -> Result<Arc<RetrievalEngine>> {
        match &*self.lock() {
            CellState::Ready(engine) => Ok(Arc::clone(engine)),
            CellState::Initializing => Err(Error::EngineInitializing),
            CellState::Failed(reason) => Err(Error::EngineUnavailable(reason.clone())),
            CellState::NotStarted => Err(Error::EngineUnavailable("engine has not been initialized".to_string())),
        }
    }

    /// Returns the engine, running `build` if nobody has tried yet.
    ///
    /// `build` runs outside the lock, at most once per cell.
    pub fn get_or_init<F>(&self, build: F) -> Result<Arc<RetrievalEngine>>
    where
        F: FnOnce() -> Result<RetrievalEngine>,
    {
        {
            let mut state = self.lock();
            match &*state {
                CellState::NotStarted => {}
                CellState::Ready(engine) => return Ok(Arc::clone(engine)),
                CellState::Initializing => return Err(Error::EngineInitializing),
                CellState::Failed(reason) => return Err(Error::EngineUnavailable(reason.clone())),
            }
            *state = CellState::Initializing;
        }

        let guard = InitGuard { cell: self, armed: true };
        let outcome = build();
        guard.finish(outcome)
    }

    /// Installs a freshly built engine, returning the one it replaces.
    /// Refused while the first build is still running.
    pub fn replace(&self, engine: RetrievalEngine) -> Result<Option<Arc<RetrievalEngine>>> {
        let mut state = self.lock();
        if matches!(*state, CellState::Initializing) {
            return Err(Error::EngineInitializing);
        }
        let previous = std::mem::replace(&mut *state, CellState::Ready(Arc::new(engine)));
        info!("Engine replaced");
        Ok(match previous {
            CellState::Ready(old) => Some(old),
            _ => None,
        })
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.lock(), CellState::Ready(_))
    }

    pub fn health(&self) -> HealthStatus {
        match &*self.lock() {
            CellState::Ready(engine) => engine.health(),
            _ => HealthStatus { engine_initialized: false, generation_configured: false },
        }
    }
}

/// Moves the cell out of `Initializing` even if the build closure panics.
struct InitGuard<'a> {
    cell: &'a EngineCell,
    armed: bool,
}

impl InitGuard<'_> {
    fn finish(mut self, outcome: Result<RetrievalEngine>) -> Result<Arc<RetrievalEngine>> {
        self.armed = false;
        let mut state = self.cell.lock();
        match outcome {
            Ok(engine) => {
                let engine = Arc::new(engine);
                *state = CellState::Ready(Arc::clone(&engine));
                info!("Engine ready");
                Ok(engine)
            }
            Err(e) => {
                error!("Engine initialization failed: {}", e);
                *state = CellState::Failed(e.to_string());
                Err(e)
            }
        }
    }
}

impl Drop for InitGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            *self.cell.lock() = CellState::Failed("engine initialization panicked".to_string());
        }
    }
}
