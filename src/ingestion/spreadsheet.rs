use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use super::{LoadOutcome, SourceFormat, SourceLoader};
use crate::constants::EXCEL_LABEL;
use crate::domain::{Dataset, Record};
use crate::error::{IngestError, Result};

/// One decoded sheet row; `None` marks an empty cell.
pub type SheetRow = Vec<Option<String>>;

/// Loads the first worksheet of a workbook (xlsx, xlsm, xls, ods).
///
/// The first row is the header. Cells missing from a shorter row become empty
/// strings. Failures never abort the run: whatever rows were read before the
/// failure come back as [`LoadOutcome::Partial`].
#[derive(Debug, Default, Clone)]
pub struct SpreadsheetLoader;

impl SpreadsheetLoader {
    pub fn new() -> Self {
        Self
    }
}

impl SourceLoader for SpreadsheetLoader {
    fn format(&self) -> SourceFormat {
        SourceFormat::Spreadsheet
    }

    fn label(&self) -> &'static str {
        EXCEL_LABEL
    }

    #[instrument(skip(self, path), fields(path = %path.display()))]
    fn load(&self, path: &Path) -> Result<LoadOutcome> {
        let range = match first_sheet(path) {
            Ok(range) => range,
            Err(cause) => {
                warn!("Failed to read workbook: {}", cause);
                return Ok(LoadOutcome::Partial {
                    dataset: Dataset::new(),
                    cause,
                });
            }
        };
        debug!("First sheet spans {:?}", range.get_size());

        let outcome = records_from_rows(sheet_rows(&range).map(Ok));
        if let Some(dataset) = outcome.dataset() {
            info!("Loaded {} records", dataset.len());
        }
        Ok(outcome)
    }
}

fn first_sheet(path: &Path) -> std::result::Result<Range<Data>, IngestError> {
    // The workbook (and its file handle) is dropped when this returns
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(IngestError::NoWorksheet)??;
    Ok(range)
}

/// Rows of `range` as text cells. Rows with no populated cell are skipped.
fn sheet_rows(range: &Range<Data>) -> impl Iterator<Item = SheetRow> + '_ {
    range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<SheetRow>())
        .filter(|row| row.iter().any(Option::is_some))
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Assemble records from decoded rows, the first being the header.
///
/// Missing and empty cells map to `""`; cells past the header width are
/// dropped. Blank header cells all name the same `""` field, so the last
/// blank column wins. A failed row stops the load and keeps the records built
/// so far.
pub fn records_from_rows<I>(rows: I) -> LoadOutcome
where
    I: IntoIterator<Item = std::result::Result<SheetRow, IngestError>>,
{
    let mut rows = rows.into_iter();
    let mut dataset = Dataset::new();

    let header: Vec<String> = match rows.next() {
        Some(Ok(row)) => row.into_iter().map(Option::unwrap_or_default).collect(),
        Some(Err(cause)) => return LoadOutcome::Partial { dataset, cause },
        None => {
            return LoadOutcome::Partial {
                dataset,
                cause: IngestError::MissingHeader,
            }
        }
    };

    for row in rows {
        let row = match row {
            Ok(row) => row,
            Err(cause) => {
                warn!("Row read failed after {} records: {}", dataset.len(), cause);
                return LoadOutcome::Partial { dataset, cause };
            }
        };

        let mut record = Record::with_capacity(header.len());
        for (i, name) in header.iter().enumerate() {
            let value = row.get(i).cloned().flatten().unwrap_or_default();
            record.insert(name.as_str(), Some(value));
        }
        dataset.push(record);
    }

    LoadOutcome::Success(dataset)
}
