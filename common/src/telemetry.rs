// Telemetry module for structured logging and query metrics

use anyhow::Result;
use metrics::{counter, describe_counter};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize structured logging with JSON formatting
///
/// `RUST_LOG` wins over `log_level` when it is set.
pub fn init_logging(log_level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {}", e))?;

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(json_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;

    describe_metrics();

    tracing::info!(log_level = log_level, "Structured logging initialized");
    Ok(())
}

fn describe_metrics() {
    describe_counter!(
        "db_queries_total",
        "Number of repository queries, by entity and operation"
    );
    describe_counter!(
        "query_build_errors_total",
        "Payloads rejected while building SQL fragments"
    );
}

/// Count one repository query
#[inline]
pub fn record_query(entity: &'static str, operation: &'static str) {
    counter!("db_queries_total", "entity" => entity, "operation" => operation).increment(1);
}

/// Count a payload rejected by the fragment builder
#[inline]
pub fn record_query_build_error(kind: &'static str) {
    counter!("query_build_errors_total", "kind" => kind).increment(1);
}
