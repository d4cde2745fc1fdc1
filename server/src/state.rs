//! Shared application context.

use std::sync::Arc;

use spookychef_core::{
    DataSet, InMemoryPersonaStore, LlmProvider, Matcher, PersonaStore, RecipeGenerator,
};

use crate::config::ServerConfig;

/// Everything the handlers read, built once at startup.
#[derive(Debug)]
pub struct AppContext {
    pub data: DataSet,
    pub matcher: Matcher,
    pub sessions: Arc<dyn PersonaStore>,
    /// `None` when no LLM provider is configured.
    pub generator: Option<RecipeGenerator>,
}

impl AppContext {
    pub fn new(
        data: DataSet,
        provider: Option<Arc<dyn LlmProvider>>,
        config: &ServerConfig,
    ) -> Self {
        let rules = data.rule_engine();
        let sessions: Arc<dyn PersonaStore> = Arc::new(InMemoryPersonaStore::new(
            config.session_capacity,
            config.session_ttl,
        ));
        let generator = provider.map(|provider| {
            RecipeGenerator::new(
                provider,
                data.personas.clone(),
                sessions.clone(),
                rules.clone(),
                config.recipe_cache_capacity,
            )
        });

        Self {
            matcher: Matcher::new(rules),
            sessions,
            generator,
            data,
        }
    }

    /// Name of the configured LLM provider, or "none".
    pub fn llm_provider_name(&self) -> &'static str {
        self.generator
            .as_ref()
            .map(|g| g.provider().provider_name())
            .unwrap_or("none")
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, Response};
    use axum::Router;
    use spookychef_core::llm::FakeProvider;
    use tower::ServiceExt;

    use crate::AppState;

    pub fn state(provider: Option<Arc<FakeProvider>>) -> AppState {
        let provider = provider.map(|p| p as Arc<dyn LlmProvider>);
        Arc::new(AppContext::new(
            DataSet::embedded(),
            provider,
            &ServerConfig::default(),
        ))
    }

    pub fn app(state: AppState) -> Router {
        crate::api::router().with_state(state)
    }

    pub async fn send(app: Router, request: Request<Body>) -> (u16, serde_json::Value) {
        let response: Response<Body> = app.oneshot(request).await.unwrap();
        let status = response.status().as_u16();
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }
}
