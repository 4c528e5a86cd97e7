use std::sync::Arc;

use crate::catalog::store::CardStore;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Read-only after the startup seed pass.
    pub cards: Arc<dyn CardStore>,
    pub llm: LlmClient,
}
