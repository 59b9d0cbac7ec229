//! # Observability
//!
//! Tracing initialization and Prometheus metrics for the odometry front-end.
//!
//! ## Features
//!
//! - Tracing initialization (JSON/Pretty/Compact formats)
//! - Prometheus metrics export
//! - Frame metrics aggregation for run summaries
//!
//! ## Usage
//!
//! ```ignore
//! use observability::{metrics, LogFormat, ObservabilityConfig};
//!
//! observability::init_with_config(ObservabilityConfig {
//!     log_format: LogFormat::Compact,
//!     ..Default::default()
//! })?;
//! observability::init_metrics_only(9000)?;
//!
//! metrics::record_frame_dispatched("logging", true);
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

// Re-exports
pub use crate::metrics::{
    record_assembly_latency_ms, record_buffer_depth, record_frame_dispatched,
    record_group_dropped, record_group_synced, record_messages_evicted, FrameMetricsAggregator,
    MetricsSummary, RunningStats, StatsSummary,
};

/// Logging setup
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,
    /// Filter directive used when `RUST_LOG` is unset or ignored
    pub default_log_level: String,
    /// Let `RUST_LOG` replace `default_log_level`
    pub env_override: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            default_log_level: "info".to_string(),
            env_override: true,
        }
    }
}

impl ObservabilityConfig {
    /// Effective filter directive given the current `RUST_LOG` value.
    fn filter_directive(&self, rust_log: Option<&str>) -> String {
        match rust_log {
            Some(directive) if self.env_override && !directive.trim().is_empty() => {
                directive.to_string()
            }
            _ => self.default_log_level.clone(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Structured JSON with source locations
    Json,
    #[default]
    Pretty,
    Compact,
}

/// Install the global tracing subscriber.
///
/// Fails when a subscriber is already set or the filter does not parse.
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = config.filter_directive(rust_log.as_deref());
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("Invalid log filter '{directive}'"))?;

    let fmt_layer = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::debug!(
        log_format = ?config.log_format,
        filter = %directive,
        "Logging initialized"
    );
    Ok(())
}

/// Install the Prometheus recorder with an HTTP listener on `port`
pub fn init_metrics_only(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;

    tracing::info!(port = port, "Prometheus metrics endpoint initialized");
    Ok(())
}
