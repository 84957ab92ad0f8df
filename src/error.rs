use thiserror::Error;

/// Errors raised while decoding a source into records.
///
/// Most of these never leave a loader: they are wrapped into a
/// [`LoadOutcome`](crate::ingestion::LoadOutcome) as the cause of a partial or
/// failed load. Only [`IngestError::ShortRow`] is returned as a hard error.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("source has no header row")]
    MissingHeader,

    #[error("workbook has no worksheet")]
    NoWorksheet,

    #[error("document is null")]
    NullDocument,

    #[error("document is not an array of records")]
    NotARecordArray,

    #[error("element {index} is not a key/value object")]
    NotAnObject { index: usize },

    #[error("line {line} has {found} fields, header has {expected}")]
    ShortRow {
        line: usize,
        expected: usize,
        found: usize,
    },
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported source format: {0}")]
    UnsupportedFormat(String),

    #[error("Ingestion failed: {0}")]
    Ingest(#[from] IngestError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
