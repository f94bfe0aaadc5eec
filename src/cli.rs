use clap::{CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::batch::{BatchError, process_source};
use crate::config::{ConfigError, ConfigStore, WatermarkConfig};
use crate::watermark::{DEFAULT_FONT_SIZE, Typeface, WatermarkError};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Source image file or directory of images
    pub source: Option<PathBuf>,

    /// Watermark text (falls back to the stored default)
    #[arg(short, long, requires = "source")]
    pub text: Option<String>,

    /// TrueType/OpenType font file; the built-in bitmap font is used otherwise
    #[arg(long, requires = "source")]
    pub font: Option<PathBuf>,

    /// Font size in pixels, only used together with --font
    #[arg(long, default_value_t = DEFAULT_FONT_SIZE, requires = "source")]
    pub font_size: f32,

    /// Config file to use instead of ~/.watermark/config.json
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, default_value = "warn", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show or change the stored default watermark text
    Config {
        /// New default watermark text
        #[arg(long)]
        default_text: Option<String>,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("No watermark text provided; pass --text or run `config --default-text <TEXT>`")]
    MissingText,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Watermark(#[from] WatermarkError),

    #[error("{0} image(s) could not be watermarked")]
    PartialFailure(usize),

    #[error("Failed to print usage: {0}")]
    Usage(#[from] std::io::Error),
}

/// Effective watermark text: a non-blank `--text` wins over the stored
/// default
pub fn resolve_text<'a>(explicit: Option<&'a str>, config: &'a WatermarkConfig) -> Option<&'a str> {
    explicit
        .filter(|text| !text.trim().is_empty())
        .or_else(|| config.default_text())
}

fn config_store(path: Option<&Path>) -> Result<ConfigStore, ConfigError> {
    match path {
        Some(path) => Ok(ConfigStore::at(path)),
        None => ConfigStore::default_location(),
    }
}

/// Execute a parsed command line
pub fn run(cli: Cli) -> Result<(), CliError> {
    if let Some(Commands::Config { default_text }) = cli.command {
        return run_config(config_store(cli.config.as_deref())?, default_text.as_deref());
    }

    let Some(source) = cli.source else {
        Cli::command().print_help()?;
        return Ok(());
    };

    // Watermarking still works without a readable config location
    let config = match config_store(cli.config.as_deref()) {
        Ok(store) => store.load(),
        Err(e) => {
            warn!("{}, continuing without stored defaults", e);
            WatermarkConfig::default()
        }
    };

    let text = resolve_text(cli.text.as_deref(), &config).ok_or(CliError::MissingText)?;

    let typeface = match &cli.font {
        Some(font_path) => Typeface::from_file(font_path, cli.font_size)?,
        None => Typeface::Builtin,
    };
    debug!("Using {:?} for {:?}", typeface, text);

    let report = process_source(&source, text, &typeface)?;

    for written in &report.written {
        println!(
            "Watermarked {} to {}",
            written.source.display(),
            written.output.display()
        );
    }
    for failed in &report.failed {
        eprintln!(
            "Error: failed to watermark {}: {}",
            failed.source.display(),
            failed.reason
        );
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::PartialFailure(report.failed.len()))
    }
}

fn run_config(store: ConfigStore, default_text: Option<&str>) -> Result<(), CliError> {
    match default_text {
        Some(text) => {
            store.set_default_text(text)?;
            println!("Default watermark text set to: {}", text);
            println!("Saved to {}", store.path().display());
        }
        None => match store.load().default_text() {
            Some(text) => println!("Default watermark text: {}", text),
            None => println!("No default watermark text set"),
        },
    }
    Ok(())
}
