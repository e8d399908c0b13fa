//! Decoding, tile fitting and placeholder synthesis.

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};

use crate::constants::placeholder::{BORDER_RGBA, FILL_RGBA};
use crate::error::{CarouselError, Result};

/// Decode encoded image bytes.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(CarouselError::EmptyBody("no image data".to_string()));
    }
    Ok(image::load_from_memory(bytes)?)
}

/// Read and decode a local file.
pub fn load_local(path: &Path) -> Result<DynamicImage> {
    let bytes = std::fs::read(path)?;
    decode_image(&bytes)
}

fn tile_px(value: f32) -> u32 {
    if value.is_finite() && value >= 1.0 {
        value.round() as u32
    } else {
        1
    }
}

/// Scale `image` to cover a `width × height` tile, keeping its aspect
/// ratio and cropping the overflow around the center.
pub fn fit_to_tile(image: &DynamicImage, width: f32, height: f32) -> RgbaImage {
    let (w, h) = (tile_px(width), tile_px(height));
    if image.width() == w && image.height() == h {
        return image.to_rgba8();
    }
    image.resize_to_fill(w, h, FilterType::Triangle).to_rgba8()
}

/// Dark tile with a one pixel border, shown when artwork cannot be loaded.
pub fn placeholder_image(width: f32, height: f32) -> RgbaImage {
    let (w, h) = (tile_px(width), tile_px(height));
    RgbaImage::from_fn(w, h, |x, y| {
        if x == 0 || y == 0 || x + 1 == w || y + 1 == h {
            Rgba(BORDER_RGBA)
        } else {
            Rgba(FILL_RGBA)
        }
    })
}
