//! Run configuration.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Default bounding size in pixels.
pub const DEFAULT_MAX_SIZE: u32 = 1080;

/// Default JPEG encode quality.
pub const DEFAULT_QUALITY: u8 = 75;

/// Options controlling how every image in a run is prepared.
///
/// Empty strings for `rights_holder` and `watermark_text` count as unset.
#[derive(Debug, Clone)]
pub struct ProcessingOptions {
    /// Largest allowed width or height of an output image.
    pub max_size: u32,
    /// Discard all metadata before anything else is written.
    pub strip_metadata: bool,
    /// Stored as the EXIF Artist and used as watermark text unless overridden.
    pub rights_holder: Option<String>,
    /// Watermark text; takes precedence over `rights_holder`.
    pub watermark_text: Option<String>,
    /// JPEG encode quality (1-100).
    pub quality: u8,
    /// Watermark font file. The default search list is used when unset.
    pub font: Option<PathBuf>,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            strip_metadata: true,
            rights_holder: None,
            watermark_text: None,
            quality: DEFAULT_QUALITY,
            font: None,
        }
    }
}

impl ProcessingOptions {
    /// Check ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMaxSize`] or [`Error::InvalidQuality`].
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(Error::InvalidMaxSize(self.max_size));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(Error::InvalidQuality(self.quality));
        }
        Ok(())
    }

    /// Rights holder to record, if any.
    #[must_use]
    pub fn rights(&self) -> Option<&str> {
        non_empty(self.rights_holder.as_deref())
    }

    /// Text to draw: the explicit watermark, else the rights holder.
    #[must_use]
    pub fn watermark(&self) -> Option<&str> {
        non_empty(self.watermark_text.as_deref()).or_else(|| self.rights())
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}
