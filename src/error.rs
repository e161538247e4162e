//! Error types for the image-prep crate.

use std::path::PathBuf;

/// Errors that can occur while preparing images.
///
/// Directory, font and option errors are fatal for a run. The remaining
/// variants are raised per file and recorded in that file's
/// [`ProcessResult`](crate::ProcessResult) instead of aborting the batch.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input directory is missing or cannot be listed.
    #[error("cannot read input directory {}: {source}", path.display())]
    InputDirectory {
        /// Directory that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The output directory could not be created.
    #[error("cannot create output directory {}: {source}", path.display())]
    OutputDirectory {
        /// Directory that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// No watermark font was given and none of the default locations exist.
    #[error("no watermark font found (searched: {})", display_paths(searched))]
    FontNotFound {
        /// Every location that was tried, in order.
        searched: Vec<PathBuf>,
    },

    /// The watermark font file could not be read.
    #[error("cannot read font {}: {source}", path.display())]
    FontLoad {
        /// Font file path.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The watermark font file is not a usable TrueType/OpenType font.
    #[error("invalid font file {}", path.display())]
    InvalidFont {
        /// Font file path.
        path: PathBuf,
    },

    /// The maximum output dimension must be positive.
    #[error("max size must be greater than zero (got {0})")]
    InvalidMaxSize(u32),

    /// JPEG quality must lie in `1..=100`.
    #[error("JPEG quality must be between 1 and 100 (got {0})")]
    InvalidQuality(u8),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The image format is not supported.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The JPEG container could not be parsed or rewritten.
    #[error("malformed JPEG container: {0}")]
    Container(String),

    /// EXIF metadata could not be encoded.
    #[error("EXIF error: {0}")]
    Exif(#[from] exif::Error),

    /// An error occurred during image processing (decode, encode).
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    /// Whether this error must stop the whole run rather than a single file.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InputDirectory { .. }
                | Self::OutputDirectory { .. }
                | Self::FontNotFound { .. }
                | Self::FontLoad { .. }
                | Self::InvalidFont { .. }
                | Self::InvalidMaxSize(_)
                | Self::InvalidQuality(_)
        )
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
