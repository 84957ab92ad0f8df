use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::constants;
use crate::error::{PipelineError, Result};
use crate::ingestion::SourceFormat;

/// Pipeline settings, usually read from `pipeline.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Substitution value for empty fields
    pub fill_default: String,
    /// Column for the value-counts report
    pub column: Option<String>,
    /// Force a source format instead of detecting it from the extension
    pub format: Option<SourceFormat>,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: String,
    pub file_prefix: String,
    /// Write the rolling log file as JSON lines
    pub json_file: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fill_default: constants::DEFAULT_FILL_VALUE.to_string(),
            column: None,
            format: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: "logs".to_string(),
            file_prefix: "pipeline.log".to_string(),
            json_file: true,
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when it exists, otherwise start from defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply `TABULAR_*` environment overrides on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup(constants::ENV_FILL_DEFAULT) {
            self.fill_default = v;
        }
        if let Some(v) = lookup(constants::ENV_COLUMN).filter(|v| !v.trim().is_empty()) {
            self.column = Some(v);
        }
        if let Some(v) = lookup(constants::ENV_LOG_DIR).filter(|v| !v.trim().is_empty()) {
            self.logging.directory = v;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.fill_default.is_empty() {
            return Err(PipelineError::Config(
                "fill_default must not be empty".to_string(),
            ));
        }
        if self.column.as_deref().is_some_and(str::is_empty) {
            return Err(PipelineError::Config("column must not be empty".to_string()));
        }
        Ok(())
    }
}
