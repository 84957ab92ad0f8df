//! Source loaders.
//!
//! Each loader turns one source into a [`Dataset`] and reports how the load
//! went through a [`LoadOutcome`]. The three formats fail differently on
//! purpose:
//!
//! - delimited text aborts on a row shorter than the header (hard `Err`),
//!   and otherwise degrades read failures to an empty dataset;
//! - spreadsheets fill sparse cells with `""` and keep the rows read before
//!   any failure;
//! - structured documents load atomically: a decode failure leaves an empty
//!   dataset, and only a `null` document yields no dataset at all.
//!
//! Only [`LoadOutcome::Failure`] stops the pipeline before cleaning.

pub mod delimited;
pub mod spreadsheet;
pub mod structured;

use serde::Deserialize;
use std::fmt;
use std::path::Path;

use crate::domain::Dataset;
use crate::error::{IngestError, PipelineError, Result};

pub use delimited::DelimitedLoader;
pub use spreadsheet::SpreadsheetLoader;
pub use structured::StructuredLoader;

/// Tagged result of a load.
#[derive(Debug)]
pub enum LoadOutcome {
    Success(Dataset),
    /// Rows kept after `cause` interrupted the load, possibly none.
    Partial { dataset: Dataset, cause: IngestError },
    /// The source produced no dataset at all.
    Failure(IngestError),
}

/// Load status without the payload, for run summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Success,
    Partial,
    Failed,
}

impl LoadOutcome {
    /// A recovered failure that leaves an empty, still usable dataset.
    pub fn empty(cause: IngestError) -> Self {
        LoadOutcome::Partial {
            dataset: Dataset::new(),
            cause,
        }
    }

    pub fn status(&self) -> LoadStatus {
        match self {
            LoadOutcome::Success(_) => LoadStatus::Success,
            LoadOutcome::Partial { .. } => LoadStatus::Partial,
            LoadOutcome::Failure(_) => LoadStatus::Failed,
        }
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        match self {
            LoadOutcome::Success(dataset) | LoadOutcome::Partial { dataset, .. } => Some(dataset),
            LoadOutcome::Failure(_) => None,
        }
    }

    pub fn cause(&self) -> Option<&IngestError> {
        match self {
            LoadOutcome::Success(_) => None,
            LoadOutcome::Partial { cause, .. } | LoadOutcome::Failure(cause) => Some(cause),
        }
    }

    /// Split into the usable dataset (if any) and the failure cause (if any).
    pub fn into_parts(self) -> (Option<Dataset>, Option<IngestError>) {
        match self {
            LoadOutcome::Success(dataset) => (Some(dataset), None),
            LoadOutcome::Partial { dataset, cause } => (Some(dataset), Some(cause)),
            LoadOutcome::Failure(cause) => (None, Some(cause)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Comma-delimited text with a header line
    #[serde(alias = "csv")]
    #[value(alias = "csv")]
    Delimited,
    /// First worksheet of an xlsx/xls/ods workbook
    #[serde(alias = "xlsx", alias = "excel")]
    #[value(alias = "xlsx", alias = "excel")]
    Spreadsheet,
    /// JSON array of flat objects
    #[serde(alias = "json")]
    #[value(alias = "json")]
    Structured,
}

impl SourceFormat {
    /// Detect the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" | "txt" => Ok(SourceFormat::Delimited),
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(SourceFormat::Spreadsheet),
            "json" => Ok(SourceFormat::Structured),
            _ => Err(PipelineError::UnsupportedFormat(format!(
                "cannot detect format of '{}' from extension '{ext}'",
                path.display()
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Delimited => "delimited",
            SourceFormat::Spreadsheet => "spreadsheet",
            SourceFormat::Structured => "structured",
        }
    }

    pub fn loader(&self) -> Box<dyn SourceLoader> {
        match self {
            SourceFormat::Delimited => Box::new(DelimitedLoader::new()),
            SourceFormat::Spreadsheet => Box::new(SpreadsheetLoader::new()),
            SourceFormat::Structured => Box::new(StructuredLoader::new()),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A loader for one source format.
pub trait SourceLoader {
    fn format(&self) -> SourceFormat;

    /// Label used in load confirmation and failure lines ("CSV", "Excel", "JSON").
    fn label(&self) -> &'static str;

    /// Load `path`. Recoverable failures are reported inside the outcome; an
    /// `Err` means the load must not be continued past.
    fn load(&self, path: &Path) -> Result<LoadOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record_of;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            SourceFormat::from_path(Path::new("data/people.CSV")).unwrap(),
            SourceFormat::Delimited
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("book.xlsx")).unwrap(),
            SourceFormat::Spreadsheet
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("records.json")).unwrap(),
            SourceFormat::Structured
        );
    }

    #[test]
    fn test_format_detection_rejects_unknown_extension() {
        let err = SourceFormat::from_path(Path::new("data.parquet")).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat(_)));
        assert!(SourceFormat::from_path(Path::new("no_extension")).is_err());
    }

    #[test]
    fn test_loader_matches_format() {
        for format in [
            SourceFormat::Delimited,
            SourceFormat::Spreadsheet,
            SourceFormat::Structured,
        ] {
            assert_eq!(format.loader().format(), format);
        }
    }

    #[test]
    fn test_outcome_parts() {
        let partial = LoadOutcome::Partial {
            dataset: vec![record_of([("a", "1")])],
            cause: IngestError::NoWorksheet,
        };
        assert_eq!(partial.status(), LoadStatus::Partial);
        assert_eq!(partial.dataset().map(Vec::len), Some(1));
        assert!(partial.cause().is_some());

        let empty = LoadOutcome::empty(IngestError::MissingHeader);
        assert_eq!(empty.status(), LoadStatus::Partial);
        assert_eq!(empty.dataset().map(Vec::len), Some(0));

        let failure = LoadOutcome::Failure(IngestError::NullDocument);
        assert_eq!(failure.status(), LoadStatus::Failed);
        let (dataset, cause) = failure.into_parts();
        assert!(dataset.is_none());
        assert!(matches!(cause, Some(IngestError::NullDocument)));
    }
}
