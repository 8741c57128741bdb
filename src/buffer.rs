//! Conversion between flat sample buffers and ndarray images.
//!
//! Flat buffers are row-major, interleaved: `data[(y * width + x) * channels + c]`.
//! This is the layout used by the WASM bindings and by most codecs.

use ndarray::{Array, Array2, Array3, Dimension};

use crate::error::{EqualizeError, Result};

/// Sample count for `dims`, checked against the buffer length.
///
/// An overflowing product is reported with `expected: usize::MAX`.
fn checked_len(dims: &[usize], found: usize) -> Result<usize> {
    let expected = dims
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or(EqualizeError::InvalidBufferLength { expected: usize::MAX, found })?;
    if found != expected {
        return Err(EqualizeError::InvalidBufferLength { expected, found });
    }
    Ok(expected)
}

/// Wrap a flat interleaved buffer as a (height, width, channels) image.
pub fn image_from_flat(
    data: Vec<u8>,
    width: usize,
    height: usize,
    channels: usize,
) -> Result<Array3<u8>> {
    let found = data.len();
    let expected = checked_len(&[width, height, channels], found)?;
    Array3::from_shape_vec((height, width, channels), data)
        .map_err(|_| EqualizeError::InvalidBufferLength { expected, found })
}

/// Wrap a flat buffer as a (height, width) channel.
pub fn channel_from_flat(data: Vec<u8>, width: usize, height: usize) -> Result<Array2<u8>> {
    let found = data.len();
    let expected = checked_len(&[width, height], found)?;
    Array2::from_shape_vec((height, width), data)
        .map_err(|_| EqualizeError::InvalidBufferLength { expected, found })
}

/// Flatten an array in row-major order.
pub fn into_flat<D: Dimension>(array: Array<u8, D>) -> Vec<u8> {
    if array.is_standard_layout() {
        array.into_raw_vec_and_offset().0
    } else {
        array.iter().copied().collect()
    }
}
