use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use super::{LoadOutcome, SourceFormat, SourceLoader};
use crate::constants::{CSV_LABEL, DELIMITER};
use crate::domain::{Dataset, Record};
use crate::error::{IngestError, Result};

/// Loads comma-delimited text whose first line is the header.
///
/// Fields are split on every comma; quoting is not understood, so a value
/// containing a comma shifts the rest of its row. Rows with more fields than
/// the header lose the extras. A row with fewer fields than the header aborts
/// the whole load with [`IngestError::ShortRow`]. Any other failure discards
/// the rows read so far and leaves an empty dataset.
#[derive(Debug, Default, Clone)]
pub struct DelimitedLoader;

impl DelimitedLoader {
    pub fn new() -> Self {
        Self
    }

    /// Same as [`SourceLoader::load`] over an already open reader.
    pub fn load_from_reader<R: BufRead>(&self, reader: R) -> Result<LoadOutcome> {
        let mut lines = reader.lines();

        let header: Vec<String> = match lines.next() {
            Some(Ok(line)) => split_fields(&line).map(str::to_string).collect(),
            Some(Err(e)) => return Ok(LoadOutcome::empty(e.into())),
            None => return Ok(LoadOutcome::empty(IngestError::MissingHeader)),
        };
        debug!("Header has {} fields", header.len());

        let mut dataset = Dataset::new();
        // Data lines start on line 2
        for (line_no, line) in (2..).zip(lines) {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Read failed at line {}: {}", line_no, e);
                    return Ok(LoadOutcome::empty(e.into()));
                }
            };

            let values: Vec<&str> = split_fields(&line).collect();
            if values.len() < header.len() {
                return Err(IngestError::ShortRow {
                    line: line_no,
                    expected: header.len(),
                    found: values.len(),
                }
                .into());
            }

            let record: Record = header
                .iter()
                .zip(values)
                .map(|(name, value)| (name.as_str(), Some(value.to_string())))
                .collect();
            dataset.push(record);
        }

        Ok(LoadOutcome::Success(dataset))
    }
}

impl SourceLoader for DelimitedLoader {
    fn format(&self) -> SourceFormat {
        SourceFormat::Delimited
    }

    fn label(&self) -> &'static str {
        CSV_LABEL
    }

    #[instrument(skip(self, path), fields(path = %path.display()))]
    fn load(&self, path: &Path) -> Result<LoadOutcome> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                warn!("Failed to open delimited source: {}", e);
                return Ok(LoadOutcome::empty(e.into()));
            }
        };

        let outcome = self.load_from_reader(BufReader::new(file))?;
        if let Some(dataset) = outcome.dataset() {
            info!("Loaded {} records", dataset.len());
        }
        Ok(outcome)
    }
}

fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    line.split(DELIMITER)
}
