use std::sync::Arc;

use crate::config::Config;
use crate::extraction::DocumentExtractor;
use crate::llm_client::ChatCompletion;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once at startup and read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Completion client. `None` when no API key was configured.
    pub llm: Option<Arc<dyn ChatCompletion>>,
    pub extractor: Arc<dyn DocumentExtractor>,
}

impl AppState {
    pub fn llm_configured(&self) -> bool {
        self.llm.is_some()
    }
}
