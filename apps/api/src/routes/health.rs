use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub openai_status: &'static str,
    pub docstrange_status: &'static str,
}

/// GET /api/health
/// Reports configuration only; no dependency is contacted.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let openai_status = if state.llm_configured() {
        "konfiguriran"
    } else {
        "nije konfiguriran"
    };

    Json(HealthResponse {
        status: "zdrav",
        openai_status,
        docstrange_status: "dostupan",
    })
}
