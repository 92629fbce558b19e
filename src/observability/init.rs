use super::tracer;
use crate::infrastructure::paths;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::resource::Resource;
use std::path::PathBuf;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SERVICE_NAME: &str = "dashflow";

/// File name of the trace log inside the data directory.
pub const TRACE_FILE: &str = "dashflow-otlp.json";

/// Installs the global subscriber: env filter plus an OpenTelemetry layer that
/// exports spans to `<data_dir>/dashflow-otlp.json`.
///
/// The filter comes from `RUST_LOG` if set, otherwise from
/// `config.trace_level`, otherwise `info`.
///
/// Returns the trace file path, or `None` if the data directory could not be
/// created. Calling it again after a subscriber is installed is a no-op.
///
/// ```no_run
/// use dashflow::{observability::init_tracing, Config};
///
/// let config = Config {
///     trace_level: Some("debug".to_string()),
///     ..Config::default()
/// };
/// init_tracing(&config);
/// tracing::debug!("tracing is active");
/// ```
pub fn init_tracing(config: &Config) -> Option<PathBuf> {
    let data_dir = paths::data_dir(config);
    std::fs::create_dir_all(&data_dir).ok()?;

    let level = config.trace_level.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let trace_file = data_dir.join(TRACE_FILE);
    let resource = Resource::new([opentelemetry::KeyValue::new("service.name", SERVICE_NAME)]);
    let provider = tracer::create_tracer_provider(trace_file.clone(), resource, SERVICE_NAME);
    let otel_layer = OpenTelemetryLayer::new(provider.tracer(SERVICE_NAME));

    let installed = tracing_subscriber::registry().with(filter).with(otel_layer).try_init();
    if installed.is_err() {
        return None;
    }
    opentelemetry::global::set_tracer_provider(provider);
    Some(trace_file)
}
