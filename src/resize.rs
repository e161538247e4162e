//! Downscaling to a bounding square.

use image::imageops::FilterType;
use image::DynamicImage;

/// Resampling filter used for downscaling (bicubic).
pub const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// Dimensions of a `width` x `height` image shrunk to fit in a
/// `max_size` x `max_size` box.
///
/// The aspect ratio is kept and the constrained side is rounded to whichever
/// neighbouring integer stays closest to the original ratio, never below 1.
/// Images already inside the box keep their size.
#[must_use]
pub fn fit_within(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    if width == 0 || height == 0 || (width <= max_size && height <= max_size) {
        return (width, height);
    }

    let aspect = f64::from(width) / f64::from(height);
    let bound = f64::from(max_size);

    if aspect >= 1.0 {
        let h = round_aspect(bound / aspect, |n| {
            if n == 0 {
                0.0
            } else {
                (aspect - bound / f64::from(n)).abs()
            }
        });
        (max_size, h)
    } else {
        let w = round_aspect(bound * aspect, |n| (aspect - f64::from(n) / bound).abs());
        (w, max_size)
    }
}

/// Floor or ceil of `value`, whichever scores lower; ties go to the floor.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_aspect(value: f64, score: impl Fn(u32) -> f64) -> u32 {
    let floor = value.floor() as u32;
    let ceil = value.ceil() as u32;
    let best = if score(ceil) < score(floor) { ceil } else { floor };
    best.max(1)
}

/// Shrink `image` to fit in a `max_size` box. Never upscales.
#[must_use]
pub fn resize_to_fit(image: DynamicImage, max_size: u32) -> DynamicImage {
    let (width, height) = (image.width(), image.height());
    let (w, h) = fit_within(width, height, max_size);
    if (w, h) == (width, height) {
        return image;
    }
    image.resize_exact(w, h, RESIZE_FILTER)
}
