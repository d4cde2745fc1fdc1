//! Logging, optional OpenTelemetry export and per-request LLM call counting.

use anyhow::Context as _;
use axum::{body::Body, http::Request, middleware::Next, response::Response};
use opentelemetry::trace::TracerProvider;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::env;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};
use std::time::Duration;
use tracing::{span::Id, Subscriber};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::Context, registry::LookupSpan, Layer};

const SERVICE_NAME: &str = "spookychef-server";

/// Span name the recipe generator opens around each model call.
const LLM_SPAN_NAME: &str = "llm.request";

/// Initialize telemetry with optional OpenTelemetry export.
/// If OTEL_EXPORTER_OTLP_ENDPOINT is set and reachable, traces and logs are
/// sent to the collector. Otherwise, only console logging is used.
pub fn init_telemetry() -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let Some(endpoint) = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok() else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(LlmCallCountingLayer)
            .init();
        tracing::debug!("OTEL_EXPORTER_OTLP_ENDPOINT not set, using console logging only");
        return Ok(());
    };

    if !is_reachable(&endpoint) {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(LlmCallCountingLayer)
            .init();
        tracing::info!(
            "OpenTelemetry endpoint {} not reachable, using console logging only",
            endpoint
        );
        return Ok(());
    }

    let service_name = env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| SERVICE_NAME.to_string());
    let resource = opentelemetry_sdk::Resource::builder()
        .with_service_name(service_name.clone())
        .build();

    let trace_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&endpoint)
        .build()
        .context("Failed to create OTLP trace exporter")?;

    let trace_provider = SdkTracerProvider::builder()
        .with_batch_exporter(trace_exporter)
        .with_resource(resource.clone())
        .build();

    let tracer = trace_provider.tracer(SERVICE_NAME);
    opentelemetry::global::set_tracer_provider(trace_provider);

    let otel_trace_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    let log_exporter = opentelemetry_otlp::LogExporter::builder()
        .with_tonic()
        .with_endpoint(&endpoint)
        .build()
        .context("Failed to create OTLP log exporter")?;

    let log_provider = SdkLoggerProvider::builder()
        .with_batch_exporter(log_exporter)
        .with_resource(resource)
        .build();

    let otel_log_layer = OpenTelemetryTracingBridge::new(&log_provider);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(LlmCallCountingLayer)
        .with(otel_trace_layer)
        .with(otel_log_layer)
        .init();

    tracing::info!(
        "OpenTelemetry enabled, exporting traces and logs to {} as {}",
        endpoint,
        service_name
    );
    Ok(())
}

/// Quick TCP check to see if the collector is up (resolves the hostname first).
fn is_reachable(endpoint: &str) -> bool {
    let host_port = endpoint
        .trim_start_matches("http://")
        .trim_start_matches("https://");

    host_port
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .map(|addr| TcpStream::connect_timeout(&addr, Duration::from_millis(100)).is_ok())
        .unwrap_or(false)
}

tokio::task_local! {
    /// Task-local counter for LLM calls made while serving the current request.
    static LLM_CALL_COUNTER: Arc<AtomicU32>;
}

/// Number of LLM calls made so far for this request, if counting is active.
pub fn get_llm_call_count() -> Option<u32> {
    LLM_CALL_COUNTER
        .try_with(|counter| counter.load(Ordering::Relaxed))
        .ok()
}

/// A tracing Layer that counts `llm.request` spans per HTTP request.
///
/// The counter is installed by [`llm_call_counting_middleware`]; the generator
/// awaits the model inside the request task, so the task-local is visible.
pub struct LlmCallCountingLayer;

impl<S> Layer<S> for LlmCallCountingLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, _attrs: &tracing::span::Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        if span.name() == LLM_SPAN_NAME {
            let _ = LLM_CALL_COUNTER.try_with(|counter| {
                counter.fetch_add(1, Ordering::Relaxed);
            });
        }
    }
}

/// Middleware that initializes the per-request LLM call counter.
///
/// This must be added to the router AFTER the TraceLayer (so it runs BEFORE
/// the trace span is created, wrapping the entire request lifecycle).
pub async fn llm_call_counting_middleware(request: Request<Body>, next: Next) -> Response {
    let counter = Arc::new(AtomicU32::new(0));
    LLM_CALL_COUNTER.scope(counter, next.run(request)).await
}

/// Middleware that adds an X-LLM-Call-Count header to responses.
/// Only enabled when SPOOKYCHEF_TRACK_LLM_CALLS=1.
pub async fn llm_call_count_header_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    if env::var("SPOOKYCHEF_TRACK_LLM_CALLS")
        .map(|v| v == "1")
        .unwrap_or(false)
    {
        if let Some(count) = get_llm_call_count() {
            if let Ok(value) = axum::http::header::HeaderValue::from_str(&count.to_string()) {
                response.headers_mut().insert("X-LLM-Call-Count", value);
            }
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_only_llm_spans_inside_scope() {
        let subscriber = tracing_subscriber::registry().with(LlmCallCountingLayer);
        let _guard = tracing::subscriber::set_default(subscriber);

        // Outside a request scope there is nothing to count into
        drop(tracing::info_span!("llm.request"));
        assert_eq!(get_llm_call_count(), None);

        let counter = Arc::new(AtomicU32::new(0));
        let count = LLM_CALL_COUNTER
            .scope(counter.clone(), async {
                drop(tracing::info_span!("llm.request"));
                drop(tracing::info_span!("http_request"));
                drop(tracing::info_span!("llm.request"));
                get_llm_call_count()
            })
            .await;

        assert_eq!(count, Some(2));
        assert_eq!(counter.load(Ordering::Relaxed), 2);
    }
}
