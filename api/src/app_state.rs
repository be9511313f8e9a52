use std::sync::Arc;

use qabot::Bot;

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The orchestrator; stateless, so one instance serves every request.
    pub bot: Arc<Bot>,
}

impl AppState {
    pub fn new(bot: Arc<Bot>) -> Self {
        Self { bot }
    }
}
