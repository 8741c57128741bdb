//! WebAssembly exports for the equalization filters.
//!
//! These functions are exposed to JavaScript via wasm-bindgen and work on
//! flat, row-major, interleaved u8 buffers. Invalid input raises a JS
//! exception instead of panicking.

use wasm_bindgen::prelude::*;

use crate::buffer::{channel_from_flat, image_from_flat, into_flat};
use crate::error::EqualizeError;
use crate::filters::equalize::{equalize_image, EqualizeMode};
use crate::filters::histogram::equalize;

fn to_js(err: EqualizeError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Histogram-equalize an image.
///
/// # Arguments
/// * `data` - Flat array of bytes (length = width * height * channels)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `channels` - 1, 3 or 4
/// * `luminance` - Equalize YCbCr luma only (true) or grayscale (false)
///
/// # Returns
/// Flat RGB bytes (RGBA if `channels` is 4)
#[wasm_bindgen]
pub fn equalize_histogram_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    luminance: bool,
) -> Result<Vec<u8>, JsValue> {
    let input = image_from_flat(data.to_vec(), width, height, channels).map_err(to_js)?;
    let result = equalize_image(input.view(), EqualizeMode::from_flag(luminance)).map_err(to_js)?;
    Ok(into_flat(result))
}

/// Histogram-equalize a single channel.
///
/// # Arguments
/// * `data` - Flat array of bytes (length = width * height)
/// * `width` - Channel width in pixels
/// * `height` - Channel height in pixels
#[wasm_bindgen]
pub fn equalize_channel_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsValue> {
    let input = channel_from_flat(data.to_vec(), width, height).map_err(to_js)?;
    let result = equalize(input.view()).map_err(to_js)?;
    Ok(into_flat(result))
}
