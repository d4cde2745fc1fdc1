pub mod health;
pub mod persona;
pub mod recipes;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::AppState;

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn response(status: StatusCode, error: impl Into<String>) -> Response {
        (
            status,
            Json(ErrorResponse {
                error: error.into(),
            }),
        )
            .into_response()
    }
}

/// All API routes, mounted at their full `/api/...` paths.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(recipes::router())
        .route("/api/persona", get(persona::get_persona))
        .route("/api/health", get(health::health))
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(
        info(title = "SpookyChef API", description = "Horror-persona recipe matching and generation"),
        paths(persona::get_persona, health::health),
        components(schemas(
            ErrorResponse,
            spookychef_core::Persona,
            health::HealthResponse,
        ))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    let modules: Vec<utoipa::openapi::OpenApi> = vec![recipes::ApiDoc::openapi()];

    for module_spec in modules {
        // Merge paths
        spec.paths.paths.extend(module_spec.paths.paths);

        // Merge components (schemas)
        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}
