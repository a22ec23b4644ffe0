//! Shared application state.

use std::sync::{Arc, RwLock};

use storymoot_governance::application::engine::GovernanceEngine;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The engine behind its single-writer lock.
    pub engine: Arc<RwLock<GovernanceEngine>>,
}

impl AppState {
    /// Create new application state owning `engine`.
    #[must_use]
    pub fn new(engine: GovernanceEngine) -> Self {
        Self {
            engine: Arc::new(RwLock::new(engine)),
        }
    }
}
