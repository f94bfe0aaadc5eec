use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::watermark::{Typeface, apply_watermark};

/// Name of the directory the watermarked copies are written to
pub const OUTPUT_DIRECTORY_NAME: &str = "watermark_images";

/// Extensions eligible for watermarking, compared case-insensitively
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "tiff", "bmp", "gif"];

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("No watermark text provided")]
    EmptyText,

    #[error("{0} is not a supported image file")]
    UnsupportedFile(String),

    #[error("{0} is not a valid file or directory")]
    InvalidSource(String),

    #[error("Failed to create output directory {path:?}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read directory {path:?}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A file that was watermarked successfully
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenImage {
    pub source: PathBuf,
    pub output: PathBuf,
}

/// A file that could not be watermarked
#[derive(Debug, Clone, PartialEq)]
pub struct FailedImage {
    pub source: PathBuf,
    pub reason: String,
}

/// Outcome of one run over a file or directory
#[derive(Debug, Default)]
pub struct BatchReport {
    pub output_directory: PathBuf,
    pub written: Vec<WrittenImage>,
    pub failed: Vec<FailedImage>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Whether `path` has one of the supported image extensions
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// Watermark a single image or every supported image directly inside a
/// directory. Subdirectories are not descended into.
///
/// Results go to a `watermark_images` directory next to the file, or inside
/// the scanned directory. Existing files there are overwritten. A failure on
/// one image is recorded in the report and does not stop the others.
pub fn process_source(
    source: &Path,
    text: &str,
    typeface: &Typeface,
) -> Result<BatchReport, BatchError> {
    if text.trim().is_empty() {
        return Err(BatchError::EmptyText);
    }

    let (output_directory, images) = if source.is_file() {
        if !is_supported_image(source) {
            return Err(BatchError::UnsupportedFile(source.display().to_string()));
        }
        let parent = source.parent().unwrap_or_else(|| Path::new(""));
        (
            parent.join(OUTPUT_DIRECTORY_NAME),
            vec![source.to_path_buf()],
        )
    } else if source.is_dir() {
        (
            source.join(OUTPUT_DIRECTORY_NAME),
            collect_images(source)?,
        )
    } else {
        return Err(BatchError::InvalidSource(source.display().to_string()));
    };

    std::fs::create_dir_all(&output_directory).map_err(|e| BatchError::OutputDirectory {
        path: output_directory.clone(),
        source: e,
    })?;

    let mut report = BatchReport {
        output_directory,
        ..Default::default()
    };

    for image_path in images {
        let Some(file_name) = image_path.file_name() else {
            continue;
        };
        let output_path = report.output_directory.join(file_name);

        match apply_watermark(&image_path, &output_path, text, typeface) {
            Ok(()) => {
                debug!("Watermarked {:?} to {:?}", image_path, output_path);
                report.written.push(WrittenImage {
                    source: image_path,
                    output: output_path,
                });
            }
            Err(e) => {
                error!("Failed to watermark {:?}: {}", image_path, e);
                report.failed.push(FailedImage {
                    source: image_path,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        "Watermarked {} image(s) into {:?}, {} failed",
        report.written.len(),
        report.output_directory,
        report.failed.len()
    );
    Ok(report)
}

/// Supported regular files directly inside `directory`, sorted by name
fn collect_images(directory: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let read_error = |source| BatchError::ReadDirectory {
        path: directory.to_path_buf(),
        source,
    };

    let mut images = Vec::new();
    for entry in std::fs::read_dir(directory).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        let path = entry.path();
        if path.is_file() && is_supported_image(&path) {
            images.push(path);
        } else {
            debug!("Skipping {:?}", path);
        }
    }

    images.sort();
    Ok(images)
}
