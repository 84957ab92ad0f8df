//! Metrics for the tabular pipeline
//!
//! Stage code records through the small per-stage modules below so metric names
//! stay in one catalog. Without an installed recorder every call is a no-op.

use std::fmt;
use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// All metric names used by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    PipelineRuns,
    PipelineDuration,
    RecordsLoaded,
    LoadFailures,
    LoadPartial,
    DuplicatesRemoved,
    ValuesFilled,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::PipelineRuns => "tabular_pipeline_runs_total",
            MetricName::PipelineDuration => "tabular_pipeline_duration_seconds",
            MetricName::RecordsLoaded => "tabular_records_loaded_total",
            MetricName::LoadFailures => "tabular_load_failures_total",
            MetricName::LoadPartial => "tabular_load_partial_total",
            MetricName::DuplicatesRemoved => "tabular_duplicates_removed_total",
            MetricName::ValuesFilled => "tabular_values_filled_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Safe to call more than once; later calls are ignored.
pub fn init() -> anyhow::Result<()> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {e}"))?;
    let _ = METRICS_HANDLE.set(handle);
    info!("Metrics recorder installed");
    Ok(())
}

/// Render the current metric values in Prometheus text format, if a recorder is installed.
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

pub mod pipeline {
    use super::MetricName;

    pub fn run_started(format: &'static str) {
        ::metrics::counter!(MetricName::PipelineRuns.as_str(), "format" => format).increment(1);
    }

    pub fn duration(format: &'static str, secs: f64) {
        ::metrics::histogram!(MetricName::PipelineDuration.as_str(), "format" => format)
            .record(secs);
    }
}

pub mod ingest {
    use super::MetricName;

    pub fn records_loaded(format: &'static str, count: usize) {
        ::metrics::counter!(MetricName::RecordsLoaded.as_str(), "format" => format)
            .increment(count as u64);
    }

    pub fn load_failed(format: &'static str) {
        ::metrics::counter!(MetricName::LoadFailures.as_str(), "format" => format).increment(1);
    }

    pub fn load_partial(format: &'static str) {
        ::metrics::counter!(MetricName::LoadPartial.as_str(), "format" => format).increment(1);
    }
}

pub mod clean {
    use super::MetricName;

    pub fn duplicates_removed(count: usize) {
        ::metrics::counter!(MetricName::DuplicatesRemoved.as_str()).increment(count as u64);
    }

    pub fn values_filled(count: usize) {
        ::metrics::counter!(MetricName::ValuesFilled.as_str()).increment(count as u64);
    }
}
