//! Batch processor: runs the per-file pipeline over a directory.

use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use img_parts::jpeg::Jpeg;
use img_parts::ImageEXIF;
use tracing::{debug, info, warn};

use crate::asset::ImageAsset;
use crate::error::{Error, Result};
use crate::metadata::Metadata;
use crate::options::ProcessingOptions;
use crate::resize::resize_to_fit;
use crate::watermark::{WatermarkPlan, Watermarker};

/// Result of processing a single image file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the input file.
    pub path: PathBuf,
    /// Path the output was (or would have been) written to.
    pub output: PathBuf,
    /// Whether the file was written.
    pub success: bool,
    /// Output dimensions, on success.
    pub dimensions: Option<(u32, u32)>,
    /// Watermark placement, when one was drawn.
    pub watermark: Option<WatermarkPlan>,
    /// Human-readable status message.
    pub message: String,
}

/// Processed vs. skipped counts for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Files written to the output directory.
    pub processed: usize,
    /// Files that failed and were left out.
    pub skipped: usize,
}

impl BatchSummary {
    /// Tally a batch.
    #[must_use]
    pub fn from_results(results: &[ProcessResult]) -> Self {
        let processed = results.iter().filter(|r| r.success).count();
        Self {
            processed,
            skipped: results.len() - processed,
        }
    }

    /// Files considered.
    #[must_use]
    pub fn total(self) -> usize {
        self.processed + self.skipped
    }
}

/// Runs the preparation pipeline with one fixed set of options.
///
/// Create once with [`Processor::new()`] and reuse for every file. The
/// watermark font is loaded only when the options ask for a watermark.
#[derive(Debug)]
pub struct Processor {
    options: ProcessingOptions,
    watermarker: Option<Watermarker>,
}

impl Processor {
    /// Validate `options` and load the watermark font if one is needed.
    ///
    /// # Errors
    ///
    /// Returns an option error for out-of-range values, or a font error when
    /// a watermark is requested and the font cannot be loaded.
    pub fn new(options: ProcessingOptions) -> Result<Self> {
        options.validate()?;
        let watermarker = match options.watermark() {
            Some(_) => Some(Watermarker::load(options.font.as_deref())?),
            None => None,
        };
        Ok(Self {
            options,
            watermarker,
        })
    }

    /// Like [`Processor::new()`], with an already-loaded font.
    ///
    /// # Errors
    ///
    /// Returns an option error for out-of-range values.
    pub fn with_watermarker(options: ProcessingOptions, watermarker: Watermarker) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            watermarker: Some(watermarker),
        })
    }

    /// Options this processor runs with.
    #[must_use]
    pub fn options(&self) -> &ProcessingOptions {
        &self.options
    }

    /// Apply every in-memory stage to `asset`: strip, rights, watermark, resize.
    #[must_use]
    pub fn prepare(&self, mut asset: ImageAsset) -> (ImageAsset, Option<WatermarkPlan>) {
        if self.options.strip_metadata {
            asset = asset.strip_metadata();
        }

        if let Some(holder) = self.options.rights() {
            asset.add_rights_holder(holder);
        }

        let mut plan = None;
        if let (Some(text), Some(watermarker)) = (self.options.watermark(), &self.watermarker) {
            let (image, p) = watermarker.apply(&asset.image, text);
            asset.image = image;
            plan = Some(p);
        }

        asset.image = resize_to_fit(asset.image, self.options.max_size);
        let (width, height) = asset.dimensions();
        asset.metadata.set_pixel_dimensions(width, height);
        (asset, plan)
    }

    /// Process a single image file: load, prepare, save.
    ///
    /// Failures are reported in the returned [`ProcessResult`], never raised.
    #[must_use]
    pub fn process_file(&self, input: &Path, output: &Path) -> ProcessResult {
        let mut result = ProcessResult {
            path: input.to_path_buf(),
            output: output.to_path_buf(),
            success: false,
            dimensions: None,
            watermark: None,
            message: String::new(),
        };

        let asset = match ImageAsset::load(input) {
            Ok(asset) => asset,
            Err(e) => {
                result.message = format!("Failed to load: {e}");
                warn!(file = %input.display(), "{}", result.message);
                return result;
            }
        };
        let original = asset.dimensions();

        let (asset, plan) = self.prepare(asset);
        result.watermark = plan;

        match save_image(&asset.image, &asset.metadata, output, self.options.quality) {
            Ok(()) => {
                let (w, h) = asset.dimensions();
                result.success = true;
                result.dimensions = Some((w, h));
                result.message = format!("{}x{} -> {w}x{h}", original.0, original.1);
                info!(file = %input.display(), "{}", result.message);
            }
            Err(e) => {
                result.message = format!("Failed to save: {e}");
                warn!(file = %input.display(), "{}", result.message);
            }
        }

        result
    }

    /// Process every JPEG directly inside `input_dir`, writing to `output_dir`.
    ///
    /// Files are handled one at a time in directory-listing order. Entries
    /// that are not regular `.jpg`/`.jpeg` files are ignored. The output
    /// directory is created (with parents) if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputDirectory`] if `input_dir` cannot be listed, in
    /// which case nothing is written, or [`Error::OutputDirectory`] if
    /// `output_dir` cannot be created. Per-file failures are not errors.
    pub fn process_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<Vec<ProcessResult>> {
        let inputs: Vec<PathBuf> = std::fs::read_dir(input_dir)
            .map_err(|source| Error::InputDirectory {
                path: input_dir.to_path_buf(),
                source,
            })?
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path()),
                Err(e) => {
                    debug!("skipping unreadable entry: {e}");
                    None
                }
            })
            .filter(|path| {
                let keep = path.is_file() && is_jpeg_file_name(path);
                if !keep {
                    debug!(entry = %path.display(), "skipping");
                }
                keep
            })
            .collect();

        std::fs::create_dir_all(output_dir).map_err(|source| Error::OutputDirectory {
            path: output_dir.to_path_buf(),
            source,
        })?;

        info!(
            input = %input_dir.display(),
            output = %output_dir.display(),
            files = inputs.len(),
            "starting batch"
        );

        Ok(inputs
            .iter()
            .filter_map(|input| {
                let name = input.file_name()?;
                Some(self.process_file(input, &output_dir.join(name)))
            })
            .collect())
    }
}

/// Whether a file name ends in `.jpg` or `.jpeg`.
///
/// The match is case-sensitive: `photo.JPG` is not selected.
#[must_use]
pub fn is_jpeg_file_name(path: &Path) -> bool {
    path.file_name()
        .and_then(OsStr::to_str)
        .is_some_and(|name| name.ends_with(".jpg") || name.ends_with(".jpeg"))
}

/// Output directory used when none is given: `<input>/output`.
#[must_use]
pub fn default_output_dir(input_dir: &Path) -> PathBuf {
    input_dir.join("output")
}

/// Encode `image` as JPEG at `quality` and write it with `metadata` embedded.
///
/// # Errors
///
/// Returns an error if the extension is not a JPEG one, encoding fails, or
/// writing fails.
pub fn save_image(
    image: &DynamicImage,
    metadata: &Metadata,
    path: &Path,
    quality: u8,
) -> Result<()> {
    let format =
        ImageFormat::from_path(path).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;
    if format != ImageFormat::Jpeg {
        return Err(Error::UnsupportedFormat(format!("{format:?}")));
    }

    let mut bytes = encode_jpeg(image, quality)?;
    if let Some(exif) = metadata.to_exif()? {
        bytes = embed_exif(bytes, exif)?;
    }

    std::fs::write(path, bytes)?;
    Ok(())
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    // Baseline JPEG holds only grey or RGB.
    let image = match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => Cow::Borrowed(image),
        other => Cow::Owned(DynamicImage::ImageRgb8(other.to_rgb8())),
    };

    let mut buf = Vec::new();
    image.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))?;
    Ok(buf)
}

fn embed_exif(jpeg_bytes: Vec<u8>, exif: Vec<u8>) -> Result<Vec<u8>> {
    let mut jpeg =
        Jpeg::from_bytes(jpeg_bytes.into()).map_err(|e| Error::Container(e.to_string()))?;
    jpeg.set_exif(Some(exif.into()));
    Ok(jpeg.encoder().bytes().to_vec())
}
