//! Status lines and defaults shared by the loaders, cleaner and CLI.

/// Field delimiter of the delimited-text loader. No quoting or escaping is recognized.
pub const DELIMITER: char = ',';

/// Default substitution value for empty fields
pub const DEFAULT_FILL_VALUE: &str = "0";

pub const DUPLICATES_REMOVED: &str = "Duplicates removed.";
pub const MISSING_VALUES_FILLED: &str = "Missing values filled.";
pub const DESCRIPTION_HEADER: &str = "Data Description:";

// Short labels used in load confirmation and failure lines
pub const CSV_LABEL: &str = "CSV";
pub const EXCEL_LABEL: &str = "Excel";
pub const JSON_LABEL: &str = "JSON";

pub fn load_success_line(label: &str) -> String {
    format!("{label} data loaded successfully.")
}

pub fn load_error_line(label: &str, cause: &dyn std::fmt::Display) -> String {
    format!("Error loading {label}: {cause}")
}

pub fn value_counts_header(column: &str) -> String {
    format!("Value counts for column {column}:")
}

// Environment overrides for the TOML configuration
pub const ENV_FILL_DEFAULT: &str = "TABULAR_FILL_DEFAULT";
pub const ENV_COLUMN: &str = "TABULAR_COLUMN";
pub const ENV_LOG_DIR: &str = "TABULAR_LOG_DIR";
