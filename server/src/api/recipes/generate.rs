use crate::api::ErrorResponse;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use spookychef_core::{Constraints, GenerateError, GeneratedResponse, Recipe};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// The catalog recipe to adapt, as returned by search
    pub candidate: Recipe,
    #[serde(default)]
    pub user_ingredients: Vec<String>,
    /// Session id; the persona is bound to it on first use
    pub chat_id: String,
    #[serde(default)]
    pub diet: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
}

/// Generate a persona-styled recipe from a search candidate
///
/// The candidate and the output are both checked against the same diet and
/// allergen rules as search. A candidate that breaks them is rejected with 422.
/// If the model fails twice the baseline candidate is returned with
/// `fallback: true`.
#[utoipa::path(
    post,
    path = "/api/generate",
    tag = "recipes",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generated recipe", body = GeneratedResponse),
        (status = 400, description = "Missing chatId", body = ErrorResponse),
        (status = 422, description = "Candidate breaks the diet or allergy constraints", body = ErrorResponse),
        (status = 500, description = "No persona available", body = ErrorResponse),
        (status = 503, description = "No LLM provider configured", body = ErrorResponse)
    )
)]
pub async fn generate_recipe(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> impl IntoResponse {
    let chat_id = request.chat_id.trim();
    if chat_id.is_empty() {
        return ErrorResponse::response(StatusCode::BAD_REQUEST, "chatId is required");
    }

    let Some(generator) = state.generator.as_ref() else {
        return ErrorResponse::response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Recipe generation is not configured",
        );
    };

    tracing::debug!(
        candidate_id = %request.candidate.id,
        user_ingredients = ?request.user_ingredients,
        "Generating recipe"
    );

    let constraints = Constraints::new(request.diet.clone(), request.allergies.clone());
    match generator
        .generate(&request.candidate, chat_id, &constraints)
        .await
    {
        Ok(response) => (StatusCode::OK, Json(response.as_ref())).into_response(),
        Err(e @ GenerateError::UnsafeCandidate { .. }) => {
            ErrorResponse::response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
        Err(GenerateError::Persona(e)) => {
            tracing::error!("Persona resolution failed: {}", e);
            ErrorResponse::response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => {
            tracing::error!("Recipe generation failed: {}", e);
            ErrorResponse::response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate recipe",
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::state::test_support::{app, post_json, send, state};
    use serde_json::{json, Value};
    use spookychef_core::llm::FakeProvider;
    use spookychef_core::Catalog;
    use std::sync::Arc;

    fn candidate(id: &str) -> Value {
        serde_json::to_value(Catalog::embedded().get(id).unwrap()).unwrap()
    }

    fn model_output(ingredient: &str) -> String {
        json!({
            "personaId": "whoever",
            "title": "Midnattens tomatpasta",
            "timeMinutes": 30,
            "difficulty": "medel",
            "dietTags": ["vegetarian"],
            "nutrition": {"kcal": 540, "protein_g": 17},
            "ingredients": [
                {"name": "pasta", "qty": 400, "unit": "g"},
                {"name": ingredient, "qty": "en skvätt", "unit": ""}
            ],
            "steps": ["För vattnet till kokning vid midnatt.", "Servera."],
            "personaLines": []
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_generate_returns_recipe_with_bound_persona() {
        let provider = Arc::new(FakeProvider::new().with_default_response(&model_output("basilika")));
        let state = state(Some(provider));

        let (status, body) = send(
            app(state.clone()),
            post_json(
                "/api/generate",
                json!({"candidate": candidate("pasta-pomodoro"), "chatId": "chat-42"}),
            ),
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(body["title"], "Midnattens tomatpasta");
        assert_eq!(body["fallback"], false);
        assert_eq!(body["ingredients"][1]["qty"], "en skvätt");

        let bound = state.sessions.get("chat-42").unwrap();
        assert_eq!(body["persona"]["id"], bound.id.as_str());
        assert_eq!(body["personaId"], bound.id.as_str());
    }

    #[tokio::test]
    async fn test_unsafe_generation_falls_back() {
        let provider = Arc::new(FakeProvider::new().with_default_response(&model_output("bacon")));
        let (status, body) = send(
            app(state(Some(provider.clone()))),
            post_json(
                "/api/generate",
                json!({
                    "candidate": candidate("pasta-pomodoro"),
                    "chatId": "chat-1",
                    "diet": ["vegetarian"]
                }),
            ),
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(body["fallback"], true);
        assert_eq!(body["title"], "Pasta pomodoro");
        assert_eq!(body["ingredients"][0]["qty"], 250.0);
        assert_eq!(body["personaLines"], json!([]));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_unsafe_candidate_is_unprocessable() {
        let provider = Arc::new(FakeProvider::new().with_default_response(&model_output("bacon")));
        let (status, body) = send(
            app(state(Some(provider.clone()))),
            post_json(
                "/api/generate",
                json!({
                    "candidate": candidate("kycklinggryta"),
                    "chatId": "chat-1",
                    "diet": ["vegetarian"]
                }),
            ),
        )
        .await;

        assert_eq!(status, 422);
        let error = body["error"].as_str().unwrap();
        assert!(error.contains("kycklinggryta"), "{}", error);
        assert!(error.contains("kyckling"), "{}", error);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_chat_id_is_bad_request() {
        let (status, body) = send(
            app(state(Some(Arc::new(FakeProvider::default())))),
            post_json(
                "/api/generate",
                json!({"candidate": candidate("linssoppa"), "chatId": "  "}),
            ),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "chatId is required");
    }

    #[tokio::test]
    async fn test_without_provider_is_unavailable() {
        let (status, _) = send(
            app(state(None)),
            post_json(
                "/api/generate",
                json!({"candidate": candidate("linssoppa"), "chatId": "chat-1"}),
            ),
        )
        .await;
        assert_eq!(status, 503);
    }
}
