//! Process-wide tracing: an env-filtered fmt layer, plus OTLP span export
//! when a collector endpoint is configured.

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{Protocol, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_SERVICE: &str = "employee-directory";
const DEFAULT_FILTER: &str = "info,tower_http=warn,sqlx=warn";

static INSTALLED: OnceCell<()> = OnceCell::new();

#[derive(Clone, Debug)]
pub struct ObsConfig {
    pub service_name: &'static str,
    /// Filter directives; `RUST_LOG` is consulted when unset.
    pub env_filter: Option<String>,
    /// OTLP/HTTP collector; `OTLP_ENDPOINT` is consulted when unset.
    pub otlp_endpoint: Option<String>,
}

impl Default for ObsConfig {
    fn default() -> Self {
        Self::for_service(DEFAULT_SERVICE)
    }
}

impl ObsConfig {
    pub fn for_service(service_name: &'static str) -> Self {
        Self {
            service_name,
            env_filter: None,
            otlp_endpoint: None,
        }
    }

    fn filter_directives(&self, from_env: Option<String>) -> String {
        self.env_filter
            .clone()
            .or(from_env)
            .filter(|directives| !directives.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_owned())
    }

    fn exporter_endpoint(&self, from_env: Option<String>) -> Option<String> {
        self.otlp_endpoint
            .clone()
            .or(from_env)
            .map(|endpoint| endpoint.trim().to_owned())
            .filter(|endpoint| !endpoint.is_empty())
    }
}

/// Keeps the span exporter alive; dropping it flushes pending spans.
#[must_use = "dropping the guard stops span export"]
pub struct TracingGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(err) = provider.shutdown() {
                tracing::warn!(error = %err, "span exporter did not shut down cleanly");
            }
        }
    }
}

/// Installs the global subscriber. Calls after the first return an inert guard.
pub fn init_tracing(config: ObsConfig) -> Result<TracingGuard> {
    if INSTALLED.get().is_some() {
        return Ok(TracingGuard { provider: None });
    }

    let directives = config.filter_directives(std::env::var("RUST_LOG").ok());
    let env_filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("invalid log filter `{directives}`"))?;

    let provider = config
        .exporter_endpoint(std::env::var("OTLP_ENDPOINT").ok())
        .map(|endpoint| otlp_provider(&endpoint, config.service_name))
        .transpose()?;
    let otel_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(config.service_name))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(otel_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    let _ = INSTALLED.set(());
    Ok(TracingGuard { provider })
}

fn otlp_provider(endpoint: &str, service_name: &'static str) -> Result<SdkTracerProvider> {
    let exporter = SpanExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpBinary)
        .with_endpoint(endpoint)
        .build()
        .with_context(|| format!("failed to build OTLP exporter for {endpoint}"))?;
    let resource = Resource::builder().with_service_name(service_name).build();
    Ok(SdkTracerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build())
}
