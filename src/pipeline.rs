use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::analysis::{self, Description, ValueCounts};
use crate::app::ports::ReportSink;
use crate::cleaning;
use crate::constants;
use crate::error::Result;
use crate::ingestion::{LoadOutcome, LoadStatus, SourceFormat, SourceLoader};
use crate::observability::metrics;

/// Caller-supplied parameters of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Substitution value for empty fields
    pub fill_default: String,
    /// Column for the value-counts report
    pub column: String,
}

impl PipelineOptions {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            fill_default: constants::DEFAULT_FILL_VALUE.to_string(),
            column: column.into(),
        }
    }

    pub fn with_fill_default(mut self, fill_default: impl Into<String>) -> Self {
        self.fill_default = fill_default.into();
        self
    }
}

/// Result of a complete pipeline run
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub source: PathBuf,
    pub format: SourceFormat,
    pub load_status: LoadStatus,
    /// Cause of a partial or failed load
    pub load_error: Option<String>,
    pub records_loaded: usize,
    pub records_kept: usize,
    pub duplicates_removed: usize,
    pub values_filled: usize,
    pub description: Option<Description>,
    pub value_counts: Option<ValueCounts>,
}

impl PipelineResult {
    /// Whether cleaning and analysis ran
    pub fn analyzed(&self) -> bool {
        self.value_counts.is_some()
    }
}

pub struct Pipeline;

impl Pipeline {
    /// Load `path` and write the load confirmation or diagnostic to `sink`.
    ///
    /// A fatal ingestion error is returned as `Err` after being logged.
    pub fn load_and_report(
        loader: &dyn SourceLoader,
        path: &Path,
        sink: &mut dyn ReportSink,
    ) -> Result<LoadOutcome> {
        let format = loader.format().as_str();
        let outcome = match loader.load(path) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Fatal ingestion error for {}: {}", path.display(), e);
                metrics::ingest::load_failed(format);
                return Err(e);
            }
        };

        match &outcome {
            LoadOutcome::Success(dataset) => {
                metrics::ingest::records_loaded(format, dataset.len());
                sink.status(&constants::load_success_line(loader.label()));
            }
            LoadOutcome::Partial { dataset, cause } => {
                warn!("Partial load, kept {} records: {}", dataset.len(), cause);
                metrics::ingest::load_partial(format);
                metrics::ingest::records_loaded(format, dataset.len());
                sink.diagnostic(&constants::load_error_line(loader.label(), cause));
            }
            LoadOutcome::Failure(cause) => {
                warn!("Load failed: {}", cause);
                metrics::ingest::load_failed(format);
                sink.diagnostic(&constants::load_error_line(loader.label(), cause));
            }
        }
        Ok(outcome)
    }

    /// Run load, deduplicate, fill, describe and value counts over one source.
    ///
    /// A failed load (no dataset at all) skips every later stage. A successful
    /// or partial load runs them all, even over an empty dataset.
    #[instrument(skip(loader, path, options, sink), fields(format = %loader.format(), path = %path.display()))]
    pub fn run(
        loader: &dyn SourceLoader,
        path: &Path,
        options: &PipelineOptions,
        sink: &mut dyn ReportSink,
    ) -> Result<PipelineResult> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let format = loader.format();
        let timer = std::time::Instant::now();
        info!(%run_id, "Starting pipeline run");
        metrics::pipeline::run_started(format.as_str());

        // Step 1: Load
        let outcome = match Self::load_and_report(loader, path, sink) {
            Ok(outcome) => outcome,
            Err(e) => {
                metrics::pipeline::duration(format.as_str(), timer.elapsed().as_secs_f64());
                return Err(e);
            }
        };
        let load_status = outcome.status();
        let (dataset, cause) = outcome.into_parts();

        let mut result = PipelineResult {
            run_id,
            started_at,
            source: path.to_path_buf(),
            format,
            load_status,
            load_error: cause.map(|c| c.to_string()),
            records_loaded: 0,
            records_kept: 0,
            duplicates_removed: 0,
            values_filled: 0,
            description: None,
            value_counts: None,
        };

        let Some(dataset) = dataset else {
            info!("Nothing loaded, skipping cleaning and analysis");
            metrics::pipeline::duration(format.as_str(), timer.elapsed().as_secs_f64());
            return Ok(result);
        };
        result.records_loaded = dataset.len();

        // Step 2: Clean
        let (mut dataset, dedup) = cleaning::deduplicate(&dataset);
        metrics::clean::duplicates_removed(dedup.removed);
        sink.status(constants::DUPLICATES_REMOVED);

        let fill = cleaning::fill_missing_values(&mut dataset, &options.fill_default);
        metrics::clean::values_filled(fill.values_filled);
        sink.status(constants::MISSING_VALUES_FILLED);

        result.records_kept = dedup.kept;
        result.duplicates_removed = dedup.removed;
        result.values_filled = fill.values_filled;

        // Step 3: Analyze
        result.description = analysis::report_description(&dataset, sink);
        result.value_counts = Some(analysis::report_value_counts(
            &dataset,
            &options.column,
            sink,
        ));

        info!(
            "✅ Run finished: {} loaded, {} duplicates removed, {} values filled",
            result.records_loaded, result.duplicates_removed, result.values_filled
        );
        metrics::pipeline::duration(format.as_str(), timer.elapsed().as_secs_f64());
        Ok(result)
    }

    /// Run over `path`, detecting the format from its extension unless `format` is given.
    pub fn run_path(
        path: &Path,
        format: Option<SourceFormat>,
        options: &PipelineOptions,
        sink: &mut dyn ReportSink,
    ) -> Result<PipelineResult> {
        let format = match format {
            Some(format) => format,
            None => SourceFormat::from_path(path)?,
        };
        let loader = format.loader();
        Self::run(loader.as_ref(), path, options, sink)
    }
}
