mod api;
mod config;
mod state;
mod telemetry;

use anyhow::Context;
use axum::extract::MatchedPath;
use axum::http::Request;
use axum::middleware;
use spookychef_core::llm::create_provider_from_env;
use spookychef_core::DataSet;
use std::env;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::Span;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::ServerConfig;
use crate::state::AppContext;

/// Application state shared across all handlers
pub type AppState = Arc<AppContext>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Check for --openapi flag to dump spec and exit
    if env::args().any(|arg| arg == "--openapi") {
        let spec = api::openapi().to_pretty_json()?;
        println!("{}", spec);
        return Ok(());
    }

    telemetry::init_telemetry()?;

    let config = ServerConfig::from_env()?;

    let data = match &config.data_dir {
        Some(dir) => DataSet::load_dir(dir)
            .with_context(|| format!("Failed to load data from {}", dir.display()))?,
        None => DataSet::embedded(),
    };

    let provider = create_provider_from_env().context("Failed to configure LLM provider")?;
    match &provider {
        Some(p) => tracing::info!(
            provider = p.provider_name(),
            model = p.model_name(),
            "Recipe generation enabled"
        ),
        None => tracing::warn!("No LLM provider configured, /api/generate will return 503"),
    }

    let state: AppState = Arc::new(AppContext::new(data, provider, &config));

    tracing::info!(
        recipes = state.data.catalog.len(),
        personas = state.data.personas.len(),
        session_capacity = config.session_capacity,
        session_ttl_secs = config.session_ttl.as_secs(),
        "Application state ready"
    );

    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::openapi());

    let app = api::router()
        .merge(swagger_ui)
        .with_state(state)
        .layer(middleware::from_fn(
            telemetry::llm_call_count_header_middleware,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or(request.uri().path());

                    // Health checks are polled; keep them out of the logs
                    if matched_path == "/api/health" {
                        tracing::trace_span!("http_request")
                    } else {
                        tracing::info_span!(
                            "http_request",
                            method = %request.method(),
                            path = %matched_path,
                        )
                    }
                })
                .on_request(|_request: &Request<_>, _span: &Span| {})
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        // Skip logging for noisy endpoints (trace-level spans)
                        if span.metadata().map(|m| m.level()) == Some(&tracing::Level::TRACE) {
                            return;
                        }
                        let status = response.status().as_u16();
                        if status >= 500 {
                            tracing::error!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request failed with server error"
                            );
                        } else {
                            tracing::info!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request completed"
                            );
                        }
                    },
                )
                .on_failure(
                    |error: tower_http::classify::ServerErrorsFailureClass,
                     latency: std::time::Duration,
                     _span: &Span| {
                        tracing::error!(
                            error = %error,
                            latency_ms = %latency.as_millis(),
                            "request failed"
                        );
                    },
                ),
        )
        .layer(middleware::from_fn(telemetry::llm_call_counting_middleware));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);
    tracing::info!("OpenAPI spec available at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
