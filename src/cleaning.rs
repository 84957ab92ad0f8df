//! Row-level cleaning.
//!
//! [`deduplicate`] leaves its input untouched and returns a new dataset;
//! [`fill_missing_values`] rewrites values of the dataset it is given.

use std::collections::HashSet;
use tracing::debug;

use crate::domain::Dataset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DedupSummary {
    pub kept: usize,
    pub removed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FillSummary {
    /// Records with at least one substituted value
    pub records_touched: usize,
    pub values_filled: usize,
}

/// Copy of `dataset` without records structurally equal to an earlier one.
///
/// The first occurrence survives and survivors keep their relative order.
pub fn deduplicate(dataset: &Dataset) -> (Dataset, DedupSummary) {
    let mut seen = HashSet::with_capacity(dataset.len());
    let unique: Dataset = dataset
        .iter()
        .filter(|record| seen.insert(record.canonical_key()))
        .cloned()
        .collect();

    let summary = DedupSummary {
        kept: unique.len(),
        removed: dataset.len() - unique.len(),
    };
    debug!("Deduplicated {} records, {} removed", dataset.len(), summary.removed);
    (unique, summary)
}

/// Replace every empty or null value with `default`, in place.
///
/// Only fields already present in a record are touched; absent fields are
/// not added.
pub fn fill_missing_values(dataset: &mut Dataset, default: &str) -> FillSummary {
    let mut summary = FillSummary::default();

    for record in dataset.iter_mut() {
        let mut filled_here = 0;
        for value in record.values_mut() {
            if value.as_deref().map_or(true, str::is_empty) {
                *value = Some(default.to_string());
                filled_here += 1;
            }
        }
        if filled_here > 0 {
            summary.records_touched += 1;
            summary.values_filled += filled_here;
        }
    }

    debug!(
        "Filled {} values across {} records",
        summary.values_filled, summary.records_touched
    );
    summary
}
