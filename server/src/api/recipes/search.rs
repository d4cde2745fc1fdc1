use crate::api::ErrorResponse;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use spookychef_core::{Candidate, Constraints, MatchError, MatchOutcome, Recipe};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Free-text ingredient names the user has on hand
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub diet: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
}

/// A catalog recipe with its similarity score
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScoredRecipe {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub score: f64,
}

impl From<Candidate<'_>> for ScoredRecipe {
    fn from(candidate: Candidate<'_>) -> Self {
        Self {
            recipe: candidate.recipe.clone(),
            score: candidate.score,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub candidate: ScoredRecipe,
    /// Ids of the top three candidates
    pub candidates_tried: Vec<String>,
    /// Top ten candidates, for regeneration
    pub all_candidates: Vec<ScoredRecipe>,
}

impl From<MatchOutcome<'_>> for SearchResponse {
    fn from(outcome: MatchOutcome<'_>) -> Self {
        Self {
            candidate: outcome.candidate.into(),
            candidates_tried: outcome
                .candidates_tried
                .into_iter()
                .map(str::to_string)
                .collect(),
            all_candidates: outcome.all_candidates.into_iter().map(Into::into).collect(),
        }
    }
}

/// Rank the catalog against the user's ingredients
///
/// Recipes that violate a requested diet or contain a listed allergen are
/// excluded before ranking.
#[utoipa::path(
    post,
    path = "/api/search",
    tag = "recipes",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Best match and alternates", body = SearchResponse),
        (status = 400, description = "No ingredients given", body = ErrorResponse),
        (status = 404, description = "No recipe satisfies the constraints", body = ErrorResponse)
    )
)]
pub async fn search_recipes(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> impl IntoResponse {
    let ingredients: Vec<&str> = request
        .ingredients
        .iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty())
        .collect();

    if ingredients.is_empty() {
        return ErrorResponse::response(
            StatusCode::BAD_REQUEST,
            "At least one ingredient is required",
        );
    }

    let constraints = Constraints::new(request.diet, request.allergies);

    match state
        .matcher
        .search(&ingredients, &constraints, state.data.catalog.recipes())
    {
        Ok(outcome) => {
            tracing::debug!(
                candidate_id = %outcome.candidate.recipe.id,
                score = outcome.candidate.score,
                "Search matched"
            );
            (StatusCode::OK, Json(SearchResponse::from(outcome))).into_response()
        }
        Err(e @ MatchError::NotFound) => {
            tracing::info!(
                diet = ?constraints.diet,
                allergies = ?constraints.allergies,
                "Search found nothing"
            );
            ErrorResponse::response(StatusCode::NOT_FOUND, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ServerConfig;
    use crate::state::test_support::{app, post_json, send, state};
    use crate::state::AppContext;
    use serde_json::json;
    use spookychef_core::{Catalog, DataSet};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_search_returns_best_match_and_pools() {
        let (status, body) = send(
            app(state(None)),
            post_json("/api/search", json!({"ingredients": ["Spaghetti", "tomater", "vitlök"]})),
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(body["candidate"]["id"], "pasta-pomodoro");
        assert!((body["candidate"]["score"].as_f64().unwrap() - 0.6).abs() < 1e-9);
        assert_eq!(body["candidate"]["timeMinutes"], 25);
        assert_eq!(body["candidatesTried"].as_array().unwrap().len(), 3);
        assert_eq!(body["allCandidates"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_search_applies_constraints() {
        let (status, body) = send(
            app(state(None)),
            post_json(
                "/api/search",
                json!({"ingredients": ["kyckling", "grädde", "ris"], "diet": ["vegetarian"]}),
            ),
        )
        .await;

        assert_eq!(status, 200);
        let ids: Vec<&str> = body["allCandidates"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_str().unwrap())
            .collect();
        assert!(!ids.contains(&"kycklinggryta"));
        assert_ne!(body["candidate"]["id"], "kycklinggryta");
    }

    #[tokio::test]
    async fn test_empty_ingredients_is_bad_request() {
        for ingredients in [json!([]), json!(["", "   "])] {
            let (status, body) = send(
                app(state(None)),
                post_json("/api/search", json!({ "ingredients": ingredients })),
            )
            .await;
            assert_eq!(status, 400);
            assert_eq!(body["error"], "At least one ingredient is required");
        }
    }

    #[tokio::test]
    async fn test_everything_excluded_is_not_found() {
        let catalog = Catalog::from_json_str(
            r#"[{"id": "r1", "title": "Kyckling", "ingredients": ["kyckling", "ris"], "timeMinutes": 30, "difficulty": "lätt", "baseNutrition": {"kcal": 600, "protein_g": 40}}]"#,
        )
        .unwrap();
        let data = DataSet {
            catalog: Arc::new(catalog),
            ..DataSet::embedded()
        };
        let state = Arc::new(AppContext::new(data, None, &ServerConfig::default()));

        let (status, body) = send(
            app(state),
            post_json("/api/search", json!({"ingredients": ["ris"], "diet": ["veg"]})),
        )
        .await;
        assert_eq!(status, 404);
        assert_eq!(body["error"], "No recipes found matching your criteria");
    }
}
