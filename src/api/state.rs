use std::sync::Arc;

use crate::engine::RecommendationEngine;

/// Shared application state
///
/// One engine instance for the whole process; handlers clone the `Arc`,
/// never the engine.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
    /// Attach similarity diagnostics to responses (development only)
    pub debug_responses: bool,
}

impl AppState {
    pub fn new(engine: Arc<RecommendationEngine>, debug_responses: bool) -> Self {
        Self {
            engine,
            debug_responses,
        }
    }
}
