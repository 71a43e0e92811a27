//! Observability wiring for the API server.
//!
//! # Purpose
//! Sets up the tracing subscriber with an optional OTLP span exporter,
//! extracts W3C trace context from inbound requests, and owns the Prometheus
//! recorder plus the names of every metric the server emits.
//!
//! # Key invariants
//! - Subscriber and recorder are installed at most once per process; repeated
//!   calls return the existing handle.
//! - Metric label values are fixed `&'static str` codes, never caller input.
use anyhow::Context;
use axum::Router;
use axum::http::HeaderMap;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry::propagation::Extractor;
use opentelemetry::trace::TracerProvider;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::net::SocketAddr;
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const AUTHZ_DECISIONS_TOTAL: &str = "checkvault_authz_decisions_total";
pub const AUTH_FAILURES_TOTAL: &str = "checkvault_auth_failures_total";
pub const ACCOUNTS_TOTAL: &str = "checkvault_accounts_total";
pub const CHECKS_TOTAL: &str = "checkvault_checks_total";

static TRACING_INIT: OnceLock<()> = OnceLock::new();
static PROPAGATOR_INIT: OnceLock<()> = OnceLock::new();
static RECORDER: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install tracing and the metrics recorder, returning the handle that
/// renders `/metrics`.
pub fn init_observability(service_name: &str) -> anyhow::Result<PrometheusHandle> {
    TRACING_INIT.get_or_init(|| init_tracing(service_name));
    let handle = metrics_recorder()?;
    describe_metrics();
    Ok(handle)
}

fn init_tracing(service_name: &str) {
    install_propagator();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer());
    match span_exporter(service_name) {
        Some(provider) => {
            let tracer = provider.tracer(service_name.to_string());
            global::set_tracer_provider(provider);
            let _ = registry
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .try_init();
        }
        None => {
            let _ = registry.try_init();
        }
    }
}

/// OTLP exporter over tonic; `None` leaves the server on plain fmt logging.
fn span_exporter(service_name: &str) -> Option<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()
        .ok()?;
    let resource = Resource::builder_empty()
        .with_attributes(DeploymentLabels::from_env().attributes(service_name))
        .build();
    Some(
        SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_resource(resource)
            .build(),
    )
}

/// Deployment identity attached to exported spans.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct DeploymentLabels {
    instance_id: Option<String>,
    environment: Option<String>,
}

impl DeploymentLabels {
    fn from_env() -> Self {
        Self {
            instance_id: std::env::var("CHECKVAULT_INSTANCE_ID")
                .or_else(|_| std::env::var("HOSTNAME"))
                .ok(),
            environment: std::env::var("DEPLOYMENT_ENVIRONMENT").ok(),
        }
    }

    fn attributes(&self, service_name: &str) -> Vec<KeyValue> {
        let mut attrs = vec![KeyValue::new("service.name", service_name.to_string())];
        if let Some(instance) = &self.instance_id {
            attrs.push(KeyValue::new("service.instance.id", instance.clone()));
        }
        if let Some(environment) = &self.environment {
            attrs.push(KeyValue::new("deployment.environment", environment.clone()));
        }
        attrs
    }
}

fn install_propagator() {
    PROPAGATOR_INIT.get_or_init(|| {
        global::set_text_map_propagator(TraceContextPropagator::new());
    });
}

/// Parent context from `traceparent`/`tracestate`, or an empty context.
pub fn trace_context_from_headers(headers: &HeaderMap) -> opentelemetry::Context {
    install_propagator();
    global::get_text_map_propagator(|propagator| propagator.extract(&HeaderCarrier(headers)))
}

struct HeaderCarrier<'a>(&'a HeaderMap);

impl Extractor for HeaderCarrier<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|name| name.as_str()).collect()
    }
}

fn metrics_recorder() -> anyhow::Result<PrometheusHandle> {
    if let Some(handle) = RECORDER.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("install prometheus recorder")?;
    Ok(RECORDER.get_or_init(|| handle).clone())
}

fn describe_metrics() {
    metrics::describe_counter!(
        AUTHZ_DECISIONS_TOTAL,
        "Authorization decisions by outcome (allowed or error code)"
    );
    metrics::describe_counter!(
        AUTH_FAILURES_TOTAL,
        "Rejected credentials and logins by reason"
    );
    metrics::describe_gauge!(ACCOUNTS_TOTAL, "Accounts currently stored");
    metrics::describe_gauge!(CHECKS_TOTAL, "Check records currently stored");
}

/// Count one authorization outcome: `allowed` or an error code such as
/// `forbidden` or `account_disabled`.
pub fn record_authz_outcome(outcome: &'static str) {
    metrics::counter!(AUTHZ_DECISIONS_TOTAL, "outcome" => outcome).increment(1);
}

pub fn record_auth_failure(reason: &'static str) {
    metrics::counter!(AUTH_FAILURES_TOTAL, "reason" => reason).increment(1);
}

pub fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new().route(
        "/metrics",
        axum::routing::get(move || async move { handle.render() }),
    )
}

/// Serve `/metrics` on its own listener until the task is aborted.
pub async fn serve_metrics(handle: PrometheusHandle, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "metrics listener ready");
    axum::serve(listener, metrics_router(handle).into_make_service()).await
}
