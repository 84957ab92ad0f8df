use anyhow::Result;
use rust_xlsxwriter::Workbook;
use std::fs;
use std::path::PathBuf;
use tabular_pipeline::app::MemorySink;
use tabular_pipeline::domain::record_of;
use tabular_pipeline::ingestion::spreadsheet::records_from_rows;
use tabular_pipeline::{
    IngestError, LoadOutcome, LoadStatus, Pipeline, PipelineError, PipelineOptions, SourceFormat,
    SourceLoader,
};
use tempfile::{tempdir, TempDir};

const PEOPLE_CSV: &str = "name,age\nAnn,30\nBob,\nAnn,30\n";

fn write_source(dir: &TempDir, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.path().join(name);
    fs::write(&path, content)?;
    Ok(path)
}

#[test]
fn test_csv_pipeline_end_to_end() -> Result<()> {
    let dir = tempdir()?;
    let path = write_source(&dir, "people.csv", PEOPLE_CSV)?;

    let mut sink = MemorySink::new();
    let result = Pipeline::run_path(&path, None, &PipelineOptions::new("age"), &mut sink)?;

    assert_eq!(result.format, SourceFormat::Delimited);
    assert_eq!(result.load_status, LoadStatus::Success);
    assert_eq!(result.records_loaded, 3);
    assert_eq!(result.records_kept, 2);
    assert_eq!(result.values_filled, 1);

    let description = result.description.expect("description for non-empty dataset");
    assert_eq!(description.count_for("name"), Some(2));
    assert_eq!(description.count_for("age"), Some(2));

    let counts = result.value_counts.expect("value counts after cleaning");
    assert_eq!(counts.count_for("30"), Some(1));
    assert_eq!(counts.count_for("0"), Some(1));

    assert_eq!(
        sink.status_lines(),
        vec![
            "CSV data loaded successfully.",
            "Duplicates removed.",
            "Missing values filled.",
            "Data Description:",
            "name: 2 non-null values",
            "age: 2 non-null values",
            "Value counts for column age:",
            "30: 1",
            "0: 1",
        ]
    );
    assert!(sink.diagnostic_lines().is_empty());
    Ok(())
}

#[test]
fn test_csv_short_row_aborts_run() -> Result<()> {
    let dir = tempdir()?;
    let path = write_source(&dir, "ragged.csv", "name,age\nAnn\nBob,41\n")?;

    let mut sink = MemorySink::new();
    let err = Pipeline::run_path(&path, None, &PipelineOptions::new("age"), &mut sink)
        .expect_err("short row must abort the run");

    assert!(matches!(
        err,
        PipelineError::Ingest(IngestError::ShortRow {
            line: 2,
            expected: 2,
            found: 1
        })
    ));
    assert!(sink.lines.is_empty());
    Ok(())
}

const EMPTY_RUN_LINES: [&str; 3] = [
    "Duplicates removed.",
    "Missing values filled.",
    "Value counts for column age:",
];

#[test]
fn test_missing_csv_still_runs_stages_over_empty_dataset() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("absent.csv");

    let mut sink = MemorySink::new();
    let result = Pipeline::run_path(&path, None, &PipelineOptions::new("age"), &mut sink)?;

    assert_eq!(result.load_status, LoadStatus::Partial);
    assert_eq!(result.records_loaded, 0);
    assert!(result.analyzed());
    assert!(result.description.is_none());
    assert_eq!(sink.status_lines(), EMPTY_RUN_LINES);
    assert_eq!(sink.diagnostic_lines().len(), 1);
    assert!(sink.diagnostic_lines()[0].starts_with("Error loading CSV: "));
    Ok(())
}

#[test]
fn test_header_only_csv_runs_stages_over_empty_dataset() -> Result<()> {
    let dir = tempdir()?;
    let path = write_source(&dir, "empty.csv", "name,age\n")?;

    let mut sink = MemorySink::new();
    let result = Pipeline::run_path(&path, None, &PipelineOptions::new("age"), &mut sink)?;

    assert_eq!(result.load_status, LoadStatus::Success);
    assert!(result.description.is_none());
    assert_eq!(
        sink.status_lines(),
        vec![
            "CSV data loaded successfully.",
            "Duplicates removed.",
            "Missing values filled.",
            "Value counts for column age:",
        ]
    );
    Ok(())
}

#[test]
fn test_json_pipeline_with_ragged_records() -> Result<()> {
    let dir = tempdir()?;
    let path = write_source(
        &dir,
        "people.json",
        r#"[
            {"name": "Ann", "age": 30},
            {"name": "Bob", "age": null},
            {"name": "Ann", "age": 30},
            {"name": "Cid", "city": "Oslo"}
        ]"#,
    )?;

    let mut sink = MemorySink::new();
    let options = PipelineOptions::new("city").with_fill_default("?");
    let result = Pipeline::run_path(&path, None, &options, &mut sink)?;

    assert_eq!(result.format, SourceFormat::Structured);
    assert_eq!(result.records_kept, 3);
    assert_eq!(result.values_filled, 1);

    // city only exists in a later record, so it is not described
    let description = result.description.expect("description");
    assert_eq!(description.count_for("city"), None);
    assert_eq!(description.count_for("name"), Some(3));
    assert_eq!(description.count_for("age"), Some(2));

    let counts = result.value_counts.expect("value counts");
    assert_eq!(counts.counts, vec![("Oslo".to_string(), 1)]);

    assert_eq!(sink.status_lines()[0], "JSON data loaded successfully.");
    Ok(())
}

#[test]
fn test_malformed_json_still_runs_stages_over_empty_dataset() -> Result<()> {
    let dir = tempdir()?;
    let path = write_source(&dir, "broken.json", r#"[{"a": 1"#)?;

    let mut sink = MemorySink::new();
    let result = Pipeline::run_path(&path, None, &PipelineOptions::new("age"), &mut sink)?;

    assert_eq!(result.load_status, LoadStatus::Partial);
    assert!(result.load_error.is_some());
    assert!(result.analyzed());
    assert_eq!(sink.status_lines(), EMPTY_RUN_LINES);
    assert!(sink.diagnostic_lines()[0].starts_with("Error loading JSON: "));
    Ok(())
}

#[test]
fn test_null_json_document_skips_cleaning_and_analysis() -> Result<()> {
    let dir = tempdir()?;
    let path = write_source(&dir, "null.json", "null")?;

    let mut sink = MemorySink::new();
    let result = Pipeline::run_path(&path, None, &PipelineOptions::new("age"), &mut sink)?;

    assert_eq!(result.load_status, LoadStatus::Failed);
    assert!(!result.analyzed());
    assert!(sink.status_lines().is_empty());
    assert_eq!(
        sink.diagnostic_lines(),
        vec!["Error loading JSON: document is null"]
    );
    Ok(())
}

#[test]
fn test_forced_format_overrides_extension() -> Result<()> {
    let dir = tempdir()?;
    let path = write_source(&dir, "people.dat", PEOPLE_CSV)?;

    let mut sink = MemorySink::new();
    let result = Pipeline::run_path(
        &path,
        Some(SourceFormat::Delimited),
        &PipelineOptions::new("age"),
        &mut sink,
    )?;
    assert_eq!(result.records_loaded, 3);
    Ok(())
}

#[test]
fn test_unreadable_workbook_is_partial_and_still_analyzed() -> Result<()> {
    let dir = tempdir()?;
    let path = write_source(&dir, "book.xlsx", "this is not a zip archive")?;

    let mut sink = MemorySink::new();
    let result = Pipeline::run_path(&path, None, &PipelineOptions::new("age"), &mut sink)?;

    assert_eq!(result.format, SourceFormat::Spreadsheet);
    assert_eq!(result.load_status, LoadStatus::Partial);
    assert_eq!(result.records_loaded, 0);
    assert!(result.analyzed());
    assert!(sink.diagnostic_lines()[0].starts_with("Error loading Excel: "));
    Ok(())
}

#[test]
fn test_workbook_pipeline_with_sparse_and_numeric_cells() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("people.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "name")?;
    sheet.write_string(0, 1, "age")?;
    sheet.write_string(0, 2, "city")?;
    sheet.write_string(1, 0, "Ann")?;
    sheet.write_number(1, 1, 30)?;
    sheet.write_string(1, 2, "Oslo")?;
    // only the first cell is written on this row
    sheet.write_string(2, 0, "Bob")?;
    sheet.write_string(3, 0, "Ann")?;
    sheet.write_number(3, 1, 30)?;
    sheet.write_string(3, 2, "Oslo")?;
    workbook.save(&path)?;

    let loaded = SourceFormat::Spreadsheet.loader().load(&path)?;
    let LoadOutcome::Success(dataset) = loaded else {
        panic!("workbook must load completely");
    };
    assert_eq!(
        dataset,
        vec![
            record_of([("name", "Ann"), ("age", "30"), ("city", "Oslo")]),
            record_of([("name", "Bob"), ("age", ""), ("city", "")]),
            record_of([("name", "Ann"), ("age", "30"), ("city", "Oslo")]),
        ]
    );

    let mut sink = MemorySink::new();
    let result = Pipeline::run_path(&path, None, &PipelineOptions::new("age"), &mut sink)?;

    assert_eq!(result.load_status, LoadStatus::Success);
    assert_eq!(result.records_kept, 2);
    assert_eq!(result.values_filled, 2);
    assert_eq!(
        sink.status_lines(),
        vec![
            "Excel data loaded successfully.",
            "Duplicates removed.",
            "Missing values filled.",
            "Data Description:",
            "name: 2 non-null values",
            "age: 2 non-null values",
            "city: 2 non-null values",
            "Value counts for column age:",
            "30: 1",
            "0: 1",
        ]
    );
    Ok(())
}

#[test]
fn test_spreadsheet_short_row_is_not_fatal() {
    let rows = vec![
        vec![Some("name".to_string()), Some("age".to_string())],
        vec![Some("Ann".to_string())],
    ];
    let outcome = records_from_rows(rows.into_iter().map(Ok));

    let LoadOutcome::Success(dataset) = outcome else {
        panic!("sparse rows must not fail the load");
    };
    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset[0].get("age"), Some(&Some(String::new())));
}
