//! Read-only column reports.

use std::collections::HashMap;

use crate::app::ports::ReportSink;
use crate::constants;
use crate::domain::Dataset;

/// Non-empty value counts per column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    pub columns: Vec<ColumnCount>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnCount {
    pub name: String,
    pub non_null: usize,
}

/// Occurrences of each distinct value of one column, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueCounts {
    pub column: String,
    pub counts: Vec<(String, usize)>,
}

/// Count non-empty values for the columns of the first record.
///
/// Columns are taken from the first record only: a name that appears only in
/// later records is not reported. Returns `None` for an empty dataset.
pub fn describe(dataset: &Dataset) -> Option<Description> {
    let first = dataset.first()?;
    let columns = first
        .names()
        .map(|name| ColumnCount {
            name: name.to_string(),
            non_null: dataset.iter().filter(|r| r.has_value(name)).count(),
        })
        .collect();
    Some(Description { columns })
}

/// Count each distinct value of `column`.
///
/// Records without the column, or with a null value, contribute nothing. An
/// empty string is a value like any other.
pub fn value_counts(dataset: &Dataset, column: &str) -> ValueCounts {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for value in dataset
        .iter()
        .filter_map(|r| r.get(column))
        .filter_map(|v| v.as_deref())
    {
        match index.get(value) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(value, counts.len());
                counts.push((value.to_string(), 1));
            }
        }
    }

    ValueCounts {
        column: column.to_string(),
        counts,
    }
}

impl Description {
    pub fn count_for(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.non_null)
    }

    pub fn lines(&self) -> Vec<String> {
        std::iter::once(constants::DESCRIPTION_HEADER.to_string())
            .chain(
                self.columns
                    .iter()
                    .map(|c| format!("{}: {} non-null values", c.name, c.non_null)),
            )
            .collect()
    }

    pub fn report(&self, sink: &mut dyn ReportSink) {
        for line in self.lines() {
            sink.status(&line);
        }
    }
}

impl ValueCounts {
    pub fn count_for(&self, value: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, n)| *n)
    }

    pub fn lines(&self) -> Vec<String> {
        std::iter::once(constants::value_counts_header(&self.column))
            .chain(self.counts.iter().map(|(v, n)| format!("{v}: {n}")))
            .collect()
    }

    pub fn report(&self, sink: &mut dyn ReportSink) {
        for line in self.lines() {
            sink.status(&line);
        }
    }
}

/// Describe `dataset` into `sink`; an empty dataset writes nothing.
pub fn report_description(dataset: &Dataset, sink: &mut dyn ReportSink) -> Option<Description> {
    let description = describe(dataset)?;
    description.report(sink);
    Some(description)
}

pub fn report_value_counts(
    dataset: &Dataset,
    column: &str,
    sink: &mut dyn ReportSink,
) -> ValueCounts {
    let counts = value_counts(dataset, column);
    counts.report(sink);
    counts
}
