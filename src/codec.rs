//! Image codec: compressed bytes <-> pixel arrays.
//!
//! Available with the `codec` feature. Decoding always produces RGB
//! (height, width, 3); encoding accepts 1, 3 or 4 channels.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
use ndarray::{Array3, ArrayView3};
use tracing::debug;

use crate::buffer::image_from_flat;
use crate::error::{EqualizeError, Result};
use crate::filters::equalize::{equalize_image, EqualizeMode};

/// Decode PNG/JPEG bytes into an RGB image.
pub fn decode(bytes: &[u8]) -> Result<Array3<u8>> {
    let rgb = image::load_from_memory(bytes)?.into_rgb8();
    let (width, height) = rgb.dimensions();
    debug!(width, height, "decoded image");
    image_from_flat(rgb.into_raw(), width as usize, height as usize, 3)
}

/// Encode an image with 1, 3 or 4 channels.
pub fn encode(image: ArrayView3<u8>, format: ImageFormat) -> Result<Vec<u8>> {
    let (height, width, channels) = image.dim();
    if height == 0 || width == 0 {
        return Err(EqualizeError::EmptyInput);
    }

    let raw: Vec<u8> = image.iter().copied().collect();
    let found = raw.len();
    let (w, h) = (width as u32, height as u32);
    let dynamic = match channels {
        1 => GrayImage::from_raw(w, h, raw).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(w, h, raw).map(DynamicImage::ImageRgb8),
        4 => RgbaImage::from_raw(w, h, raw).map(DynamicImage::ImageRgba8),
        n => return Err(EqualizeError::UnsupportedChannels(n)),
    }
    .ok_or(EqualizeError::InvalidBufferLength {
        expected: height * width * channels,
        found,
    })?;

    let mut out = Cursor::new(Vec::new());
    dynamic.write_to(&mut out, format)?;
    Ok(out.into_inner())
}

/// Decode, equalize, and re-encode as PNG.
pub fn equalize_encoded(bytes: &[u8], mode: EqualizeMode) -> Result<Vec<u8>> {
    let image = decode(bytes)?;
    let equalized = equalize_image(image.view(), mode)?;
    encode(equalized.view(), ImageFormat::Png)
}
