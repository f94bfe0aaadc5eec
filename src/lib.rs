pub mod batch;
pub mod cli;
pub mod config;
pub mod watermark;

pub use batch::{BatchError, BatchReport, OUTPUT_DIRECTORY_NAME, process_source};
pub use config::{ConfigError, ConfigStore, WatermarkConfig};
pub use watermark::{Typeface, WatermarkError, apply_watermark};
