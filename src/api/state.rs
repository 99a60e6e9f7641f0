//! Application state for the API server

use crate::{Config, PipelineOrchestrator};
use std::sync::Arc;

/// Shared state handed to every route handler (cheap Arc clone per request)
#[derive(Clone)]
pub struct AppState {
    /// Pipeline driving submitted URLs
    pub orchestrator: Arc<PipelineOrchestrator>,

    /// Startup configuration; never mutated afterwards
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(orchestrator: Arc<PipelineOrchestrator>, config: Arc<Config>) -> Self {
        Self {
            orchestrator,
            config,
        }
    }
}
