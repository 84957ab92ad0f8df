//! Batch pipeline over tabular sources: load a CSV, spreadsheet or JSON
//! record file, drop duplicate rows, fill empty values, then report
//! per-column non-empty counts and the value frequencies of one column.

pub mod analysis;
pub mod app;
pub mod cleaning;
pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod ingestion;
pub mod observability;
pub mod pipeline;

pub use domain::{Dataset, Record};
pub use error::{IngestError, PipelineError, Result};
pub use ingestion::{LoadOutcome, LoadStatus, SourceFormat, SourceLoader};
pub use pipeline::{Pipeline, PipelineOptions, PipelineResult};
