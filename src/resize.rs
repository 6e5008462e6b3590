// this_file: src/resize.rs
//! Raster downscaling applied before luminance computation.

use image::imageops::{self, FilterType};
use image::RgbImage;

/// Downscale an image when either dimension exceeds `max_dimension`.
///
/// Aspect ratio is preserved: the longer side is scaled to exactly
/// `max_dimension` and the shorter side truncates proportionally (never below
/// one pixel). Images already within bounds are returned unchanged.
pub fn resize_if_needed(image: RgbImage, max_dimension: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    if width <= max_dimension && height <= max_dimension {
        return image;
    }

    let (new_width, new_height) = if width > height {
        let scale = f64::from(max_dimension) / f64::from(width);
        (max_dimension, (f64::from(height) * scale) as u32)
    } else {
        let scale = f64::from(max_dimension) / f64::from(height);
        ((f64::from(width) * scale) as u32, max_dimension)
    };

    imageops::resize(
        &image,
        new_width.max(1),
        new_height.max(1),
        FilterType::Lanczos3,
    )
}
