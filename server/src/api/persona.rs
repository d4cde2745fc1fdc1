use crate::api::ErrorResponse;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use spookychef_core::{Persona, PersonaError};
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct PersonaQuery {
    /// Session id; omit for a random persona
    pub chat_id: Option<String>,
}

/// Get the persona for a session
///
/// With `chatId`, returns the persona bound to that session, binding one at
/// random on first use. Without it, returns a random persona.
#[utoipa::path(
    get,
    path = "/api/persona",
    tag = "persona",
    params(PersonaQuery),
    responses(
        (status = 200, description = "Persona", body = Persona),
        (status = 500, description = "Persona pool is empty", body = ErrorResponse)
    )
)]
pub async fn get_persona(
    State(state): State<AppState>,
    Query(query): Query<PersonaQuery>,
) -> impl IntoResponse {
    let chat_id = query
        .chat_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());

    let persona = match chat_id {
        Some(chat_id) => state.sessions.get_or_assign(chat_id, &state.data.personas),
        None => state
            .data
            .personas
            .choose_random()
            .ok_or(PersonaError::EmptyPool),
    };

    match persona {
        Ok(persona) => (StatusCode::OK, Json(persona.as_ref())).into_response(),
        Err(e) => {
            tracing::error!("Persona lookup failed: {}", e);
            ErrorResponse::response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::state::test_support::{app, get, send, state};

    #[tokio::test]
    async fn test_session_persona_is_sticky() {
        let state = state(None);
        let (status, first) = send(app(state.clone()), get("/api/persona?chatId=abc")).await;
        assert_eq!(status, 200);

        for _ in 0..5 {
            let (_, again) = send(app(state.clone()), get("/api/persona?chatId=abc")).await;
            assert_eq!(again["id"], first["id"]);
        }
        assert_eq!(
            state.sessions.get("abc").unwrap().id,
            first["id"].as_str().unwrap()
        );
    }

    #[tokio::test]
    async fn test_random_persona_without_chat_id() {
        let state = state(None);
        let (status, body) = send(app(state.clone()), get("/api/persona")).await;
        assert_eq!(status, 200);
        assert!(state.data.personas.get(body["id"].as_str().unwrap()).is_ok());
        assert!(body["movieImdbUrl"].as_str().unwrap().starts_with("https://"));
        assert!(state.sessions.get("").is_none());
    }
}
