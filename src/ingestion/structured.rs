use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{info, instrument, warn};

use super::{LoadOutcome, SourceFormat, SourceLoader};
use crate::constants::JSON_LABEL;
use crate::domain::{Dataset, FieldValue, Record};
use crate::error::{IngestError, Result};

/// Loads a JSON document holding an array of flat key/value objects.
///
/// The document is decoded in one pass and either loads completely or leaves
/// an empty dataset. A top-level `null` document yields no dataset at all.
#[derive(Debug, Default, Clone)]
pub struct StructuredLoader;

impl StructuredLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn load_from_reader<R: Read>(&self, reader: R) -> LoadOutcome {
        let document: Value = match serde_json::from_reader(reader) {
            Ok(document) => document,
            Err(e) => return LoadOutcome::empty(e.into()),
        };
        match records_from_document(document) {
            Ok(dataset) => LoadOutcome::Success(dataset),
            Err(IngestError::NullDocument) => LoadOutcome::Failure(IngestError::NullDocument),
            Err(cause) => LoadOutcome::empty(cause),
        }
    }
}

impl SourceLoader for StructuredLoader {
    fn format(&self) -> SourceFormat {
        SourceFormat::Structured
    }

    fn label(&self) -> &'static str {
        JSON_LABEL
    }

    #[instrument(skip(self, path), fields(path = %path.display()))]
    fn load(&self, path: &Path) -> Result<LoadOutcome> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                warn!("Failed to open structured source: {}", e);
                return Ok(LoadOutcome::empty(e.into()));
            }
        };

        let outcome = self.load_from_reader(BufReader::new(file));
        match &outcome {
            LoadOutcome::Success(dataset) => info!("Loaded {} records", dataset.len()),
            LoadOutcome::Partial { cause, .. } | LoadOutcome::Failure(cause) => {
                warn!("Failed to decode document: {}", cause)
            }
        }
        Ok(outcome)
    }
}

fn records_from_document(document: Value) -> std::result::Result<Dataset, IngestError> {
    let items = match document {
        Value::Array(items) => items,
        Value::Null => return Err(IngestError::NullDocument),
        _ => return Err(IngestError::NotARecordArray),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(map
                .into_iter()
                .map(|(k, v)| (k, field_value(v)))
                .collect::<Record>()),
            _ => Err(IngestError::NotAnObject { index }),
        })
        .collect()
}

/// Scalars become their JSON text; nested values stay as compact JSON.
fn field_value(value: Value) -> FieldValue {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
