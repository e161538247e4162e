//! Decoded image plus its metadata block.

use std::path::Path;

use image::{DynamicImage, ImageFormat};
use img_parts::jpeg::Jpeg;
use img_parts::ImageEXIF;
use tracing::{debug, warn};

use crate::error::Result;
use crate::metadata::Metadata;

/// An image moving through the pipeline.
///
/// Owned by whichever stage is acting on it and dropped once saved.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    /// Decoded raster.
    pub image: DynamicImage,
    /// Metadata carried alongside the raster.
    pub metadata: Metadata,
}

impl ImageAsset {
    /// Wrap a raster with an empty metadata block.
    #[must_use]
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image,
            metadata: Metadata::new(),
        }
    }

    /// Read and decode a JPEG file together with its EXIF block.
    ///
    /// An EXIF segment that cannot be located or parsed is logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a decodable JPEG.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_jpeg_bytes(bytes, path)
    }

    fn from_jpeg_bytes(bytes: Vec<u8>, path: &Path) -> Result<Self> {
        let image = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg)?;

        let raw_exif = match Jpeg::from_bytes(bytes.into()) {
            Ok(jpeg) => jpeg.exif(),
            Err(e) => {
                warn!(file = %path.display(), "cannot scan JPEG segments for EXIF: {e}");
                None
            }
        };

        let metadata = match raw_exif {
            Some(raw) => Metadata::from_exif(raw.to_vec()).unwrap_or_else(|e| {
                warn!(file = %path.display(), "ignoring unreadable EXIF block: {e}");
                Metadata::new()
            }),
            None => Metadata::new(),
        };

        debug!(
            file = %path.display(),
            width = image.width(),
            height = image.height(),
            exif_fields = metadata.len(),
            "decoded"
        );
        Ok(Self { image, metadata })
    }

    /// Same pixels, no metadata.
    ///
    /// Everything goes, orientation included, so viewers that honoured a
    /// rotation tag will show the raw sensor orientation afterwards.
    #[must_use]
    pub fn strip_metadata(self) -> Self {
        Self::new(self.image)
    }

    /// Record `holder` as the image's Artist.
    pub fn add_rights_holder(&mut self, holder: &str) {
        self.metadata.set_artist(holder);
    }

    /// Width and height of the raster.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}
