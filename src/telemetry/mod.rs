//! Logging and OpenTelemetry initialization.
//!
//! Always logs to stderr through a fmt layer. When an OTLP endpoint is
//! configured, spans, metrics and log records are exported there too.

pub mod metrics;
pub mod work;

use opentelemetry_sdk::Resource;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;

use crate::error::{Error, Result};

/// Configuration for telemetry initialization.
pub struct TelemetryConfig {
    /// Optional OTLP/gRPC endpoint (e.g. "http://localhost:4317").
    pub endpoint: Option<String>,
    /// The service name reported in telemetry signals.
    pub service_name: String,
    /// Filter used when `RUST_LOG` is not set (e.g. "info", "sitewatch=debug").
    pub log_level: String,
}

/// Keeps the OTLP pipelines alive. Dropping it flushes and shuts them down.
#[derive(Default)]
pub struct TelemetryGuard {
    exporters: Option<Exporters>,
}

struct Exporters {
    tracer: SdkTracerProvider,
    meter: SdkMeterProvider,
    logger: SdkLoggerProvider,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(exporters) = self.exporters.take() {
            let _ = exporters.logger.shutdown();
            let _ = exporters.meter.shutdown();
            let _ = exporters.tracer.shutdown();
        }
    }
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the log filter is invalid, an OTLP exporter fails
/// to build, or a global subscriber is already installed.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard> {
    use opentelemetry::trace::TracerProvider as _;
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| Error::Config(format!("bad log filter {:?}: {e}", config.log_level)))?;

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().compact());

    let Some(endpoint) = config.endpoint else {
        registry
            .try_init()
            .map_err(|e| Error::Other(format!("failed to init tracing subscriber: {e}")))?;
        return Ok(TelemetryGuard::default());
    };

    let exporters = build_exporters(&endpoint, config.service_name)?;
    opentelemetry::global::set_meter_provider(exporters.meter.clone());

    let trace_layer =
        tracing_opentelemetry::layer().with_tracer(exporters.tracer.tracer("sitewatch"));
    let log_layer = opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge::new(
        &exporters.logger,
    );

    registry
        .with(trace_layer)
        .with(log_layer)
        .try_init()
        .map_err(|e| Error::Other(format!("failed to init tracing subscriber: {e}")))?;

    Ok(TelemetryGuard {
        exporters: Some(exporters),
    })
}

fn build_exporters(endpoint: &str, service_name: String) -> Result<Exporters> {
    use opentelemetry_otlp::WithExportConfig as _;

    let resource = Resource::builder()
        .with_service_name(service_name)
        .with_attribute(opentelemetry::KeyValue::new(
            opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
            env!("CARGO_PKG_VERSION"),
        ))
        .build();

    let spans = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| exporter_error("span", e))?;
    let metrics = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| exporter_error("metric", e))?;
    let logs = opentelemetry_otlp::LogExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| exporter_error("log", e))?;

    Ok(Exporters {
        tracer: SdkTracerProvider::builder()
            .with_batch_exporter(spans)
            .with_resource(resource.clone())
            .build(),
        meter: SdkMeterProvider::builder()
            .with_periodic_exporter(metrics)
            .with_resource(resource.clone())
            .build(),
        logger: SdkLoggerProvider::builder()
            .with_batch_exporter(logs)
            .with_resource(resource)
            .build(),
    })
}

fn exporter_error(signal: &str, e: impl std::fmt::Display) -> Error {
    Error::Config(format!("failed to create OTLP {signal} exporter: {e}"))
}
