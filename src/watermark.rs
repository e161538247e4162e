//! Centered text watermark.
//!
//! The text is sized so it spans roughly 90% of the image width, drawn in
//! translucent white on a transparent layer and composited over the image:
//!
//! `out = alpha * white + (1 - alpha) * original`, with `alpha = 50 / 255`.

use std::path::{Path, PathBuf};

use ab_glyph::{FontArc, PxScale};
use image::{imageops, DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use tracing::debug;

use crate::error::{Error, Result};

/// Watermark colour: white at roughly 20% opacity.
pub const WATERMARK_COLOR: Rgba<u8> = Rgba([255, 255, 255, 50]);

/// Smallest upper bound for the font search. Wide images raise it, see
/// [`font_size_cap`].
pub const MIN_FONT_SIZE_CAP: u32 = 4096;

/// The cap allows glyphs up to this many image widths tall, which is beyond
/// what any visible text needs to reach 90% of the width.
const CAP_WIDTH_FACTOR: u32 = 8;

/// Stop growing once the text covers this share of the image width.
const TARGET_WIDTH_RATIO: f64 = 0.9;

/// Below this share of the image width the search takes big steps.
const COARSE_WIDTH_RATIO: f64 = 0.8;

const FINE_STEP: u32 = 1;
const COARSE_STEP: u32 = 10;

/// Fonts tried, in order, when no font path is given.
pub const DEFAULT_FONT_CANDIDATES: &[&str] = &[
    "arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/usr/share/fonts/truetype/msttcorefonts/Arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
];

/// Measures rendered text.
pub trait TextMeasure {
    /// Bounding-box `(width, height)` of `text` rendered at `size` pixels.
    fn measure(&self, size: u32, text: &str) -> (u32, u32);
}

/// Font size and placement chosen for one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatermarkPlan {
    /// Font size in pixels.
    pub font_size: u32,
    /// Measured text width at `font_size`.
    pub text_width: u32,
    /// Measured text height at `font_size`.
    pub text_height: u32,
    /// Left edge of the text. Negative when the text overshoots the image.
    pub x: i32,
    /// Top edge of the text.
    pub y: i32,
}

/// Find the font size that makes `text` span about 90% of `width`, and the
/// position that centres it in a `width` x `height` image.
///
/// Starting at size 1, grows by one step at a time until the measured width
/// reaches 90% of the image width, adding ten extra per step while the text
/// is still under 80%.
///
/// Text that still measures zero wide after a step (whitespace, glyphs the
/// font lacks) ends the search, as does reaching [`font_size_cap`].
#[must_use]
pub fn plan_watermark<M: TextMeasure + ?Sized>(
    measure: &M,
    width: u32,
    height: u32,
    text: &str,
) -> WatermarkPlan {
    let target = f64::from(width) * TARGET_WIDTH_RATIO;
    let coarse = f64::from(width) * COARSE_WIDTH_RATIO;
    let cap = font_size_cap(width);

    let mut font_size = 1;
    let (mut text_width, mut text_height) = measure.measure(font_size, text);
    while f64::from(text_width) < target && font_size < cap {
        font_size += FINE_STEP;
        if f64::from(text_width) < coarse {
            font_size += COARSE_STEP;
        }
        font_size = font_size.min(cap);
        (text_width, text_height) = measure.measure(font_size, text);
        if text_width == 0 {
            break;
        }
    }

    WatermarkPlan {
        font_size,
        text_width,
        text_height,
        x: centre(width, text_width),
        y: centre(height, text_height),
    }
}

/// Largest font size the search will try for an image `width` pixels wide.
#[must_use]
pub fn font_size_cap(width: u32) -> u32 {
    width.saturating_mul(CAP_WIDTH_FACTOR).max(MIN_FONT_SIZE_CAP)
}

#[allow(clippy::cast_possible_truncation)]
fn centre(outer: u32, inner: u32) -> i32 {
    ((i64::from(outer) - i64::from(inner)).div_euclid(2)) as i32
}

/// Renders watermarks with a loaded font.
///
/// Load once with [`Watermarker::load()`] and reuse for every image.
#[derive(Clone)]
pub struct Watermarker {
    font: FontArc,
}

impl std::fmt::Debug for Watermarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watermarker").finish_non_exhaustive()
    }
}

impl Watermarker {
    /// Wrap an already-parsed font.
    #[must_use]
    pub fn new(font: FontArc) -> Self {
        Self { font }
    }

    /// Load the font at `path`, or the first default candidate that exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FontNotFound`] when no candidate exists,
    /// [`Error::FontLoad`] when the file cannot be read and
    /// [`Error::InvalidFont`] when it does not parse.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => find_default_font()?,
        };
        let data = std::fs::read(&path).map_err(|source| Error::FontLoad {
            path: path.clone(),
            source,
        })?;
        let font =
            FontArc::try_from_vec(data).map_err(|_| Error::InvalidFont { path: path.clone() })?;
        debug!(font = %path.display(), "loaded watermark font");
        Ok(Self::new(font))
    }

    /// Compute the plan for `text` on a `width` x `height` image.
    #[must_use]
    pub fn plan(&self, width: u32, height: u32, text: &str) -> WatermarkPlan {
        plan_watermark(self, width, height, text)
    }

    /// Draw `text` across `image` and return the flattened RGB result.
    #[must_use]
    pub fn apply(&self, image: &DynamicImage, text: &str) -> (DynamicImage, WatermarkPlan) {
        let (width, height) = (image.width(), image.height());
        let plan = self.plan(width, height, text);

        let mut layer = RgbaImage::from_pixel(width, height, Rgba([1, 1, 1, 0]));
        #[allow(clippy::cast_precision_loss)]
        let scale = PxScale::from(plan.font_size as f32);
        draw_text_mut(
            &mut layer,
            WATERMARK_COLOR,
            plan.x,
            plan.y,
            scale,
            &self.font,
            text,
        );

        let mut base = image.to_rgba8();
        imageops::overlay(&mut base, &layer, 0, 0);
        let flattened = DynamicImage::ImageRgba8(base).to_rgb8();

        debug!(
            font_size = plan.font_size,
            x = plan.x,
            y = plan.y,
            "watermark applied"
        );
        (DynamicImage::ImageRgb8(flattened), plan)
    }
}

impl TextMeasure for Watermarker {
    #[allow(clippy::cast_precision_loss)]
    fn measure(&self, size: u32, text: &str) -> (u32, u32) {
        text_size(PxScale::from(size as f32), &self.font, text)
    }
}

/// First existing entry of [`DEFAULT_FONT_CANDIDATES`].
///
/// # Errors
///
/// Returns [`Error::FontNotFound`] listing every location tried.
pub fn find_default_font() -> Result<PathBuf> {
    let searched: Vec<PathBuf> = DEFAULT_FONT_CANDIDATES.iter().map(PathBuf::from).collect();
    if let Some(found) = searched.iter().find(|p| p.is_file()) {
        return Ok(found.clone());
    }
    Err(Error::FontNotFound { searched })
}
