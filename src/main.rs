use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use tabular_pipeline::analysis;
use tabular_pipeline::app::StdoutSink;
use tabular_pipeline::config::PipelineConfig;
use tabular_pipeline::observability::{self, metrics};
use tabular_pipeline::{LoadStatus, Pipeline, PipelineOptions, SourceFormat};

#[derive(Parser)]
#[command(name = "tabular_pipeline")]
#[command(about = "Load, clean and summarize CSV, spreadsheet and JSON record files")]
#[command(version)]
struct Cli {
    /// Pipeline configuration file
    #[arg(long, global = true, default_value = "pipeline.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, deduplicate, fill missing values, then describe and count values
    Run {
        /// Source file (.csv, .xlsx, .json, ...)
        input: PathBuf,
        /// Column for the value-counts report
        #[arg(long)]
        column: Option<String>,
        /// Substitution value for empty fields
        #[arg(long)]
        fill_default: Option<String>,
        /// Force the source format instead of using the file extension
        #[arg(long, value_enum)]
        format: Option<SourceFormat>,
        /// Print collected metrics in Prometheus text format after the run
        #[arg(long)]
        print_metrics: bool,
    },
    /// Load a source and report non-empty counts per column, without cleaning
    Describe {
        input: PathBuf,
        #[arg(long, value_enum)]
        format: Option<SourceFormat>,
    },
    /// Load a source and count the values of one column, without cleaning
    ValueCounts {
        input: PathBuf,
        #[arg(long)]
        column: String,
        #[arg(long, value_enum)]
        format: Option<SourceFormat>,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = PipelineConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    config.apply_env_overrides();
    config.validate()?;

    let _log_guard = observability::init_logging(&config.logging);
    let mut sink = StdoutSink;

    match cli.command {
        Commands::Run {
            input,
            column,
            fill_default,
            format,
            print_metrics,
        } => {
            if print_metrics {
                metrics::init()?;
            }

            let column = column
                .or_else(|| config.column.clone())
                .context("No value-counts column given: pass --column or set `column` in the config")?;
            let options = PipelineOptions::new(column)
                .with_fill_default(fill_default.unwrap_or_else(|| config.fill_default.clone()));

            let result = Pipeline::run_path(&input, format.or(config.format), &options, &mut sink)
                .with_context(|| format!("Pipeline failed for {}", input.display()))?;

            match result.load_status {
                LoadStatus::Success => info!(run_id = %result.run_id, "Pipeline finished"),
                LoadStatus::Partial => warn!(
                    run_id = %result.run_id,
                    "Pipeline finished on a partial load: {}",
                    result.load_error.as_deref().unwrap_or("unknown cause")
                ),
                LoadStatus::Failed => error!(
                    run_id = %result.run_id,
                    "Load failed, cleaning and analysis skipped"
                ),
            }

            if print_metrics {
                if let Some(rendered) = metrics::render() {
                    println!("{rendered}");
                }
            }
        }
        Commands::Describe { input, format } => {
            let format = resolve_format(&input, format.or(config.format))?;
            let outcome = Pipeline::load_and_report(format.loader().as_ref(), &input, &mut sink)?;
            if let Some(dataset) = outcome.dataset() {
                analysis::report_description(dataset, &mut sink);
            }
        }
        Commands::ValueCounts {
            input,
            column,
            format,
        } => {
            let format = resolve_format(&input, format.or(config.format))?;
            let outcome = Pipeline::load_and_report(format.loader().as_ref(), &input, &mut sink)?;
            if let Some(dataset) = outcome.dataset() {
                analysis::report_value_counts(dataset, &column, &mut sink);
            }
        }
    }

    Ok(())
}

fn resolve_format(input: &Path, forced: Option<SourceFormat>) -> Result<SourceFormat> {
    match forced {
        Some(format) => Ok(format),
        None => Ok(SourceFormat::from_path(input)?),
    }
}
