use crate::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub catalog_size: usize,
    pub persona_count: usize,
    /// "gemini", "fake" or "none"
    pub llm_provider: String,
}

/// Liveness and configuration summary
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        catalog_size: state.data.catalog.len(),
        persona_count: state.data.personas.len(),
        llm_provider: state.llm_provider_name().to_string(),
    })
}
