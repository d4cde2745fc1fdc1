pub mod generate;
pub mod search;

use crate::AppState;
use axum::routing::post;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for the recipe endpoints
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/search", post(search::search_recipes))
        .route("/api/generate", post(generate::generate_recipe))
}

#[derive(OpenApi)]
#[openapi(
    paths(search::search_recipes, generate::generate_recipe),
    components(schemas(
        search::SearchRequest,
        search::SearchResponse,
        search::ScoredRecipe,
        generate::GenerateRequest,
        spookychef_core::Recipe,
        spookychef_core::Nutrition,
        spookychef_core::Difficulty,
        spookychef_core::GeneratedResponse,
        spookychef_core::GeneratedRecipe,
        spookychef_core::generate::GeneratedIngredient,
        spookychef_core::generate::Quantity,
        spookychef_core::generate::PersonaSummary,
    ))
)]
pub struct ApiDoc;
