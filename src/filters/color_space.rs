//! Color-space conversion used by the equalization pipeline.
//!
//! The pipeline only needs four operations, collected in the
//! [`ColorSpaceConverter`] trait so a different luma/chroma encoding can be
//! plugged in. [`YCbCrConverter`] is the default: full-range YCbCr as
//! defined by JFIF (the encoding used inside JPEG files).
//!
//! ## Supported Formats
//!
//! Converters accept images with 1, 3, or 4 channels:
//! - **Grayscale**: (height, width, 1) - luma is the channel, chroma is neutral (128)
//! - **RGB**: (height, width, 3)
//! - **RGBA**: (height, width, 4) - alpha is ignored
//!
//! Output color images are always RGB (height, width, 3).

use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis};

use crate::error::{EqualizeError, Result};

/// Neutral chroma value (no color).
pub const CHROMA_NEUTRAL: u8 = 128;

// ============================================================================
// Grayscale weights
// ============================================================================

/// RGB channel weights for grayscale conversion.
///
/// Default uses ITU-R BT.601 coefficients, the same weights as the "L"
/// conversion of 8-bit imaging libraries. Those usually compute it in 16-bit
/// fixed point; this float version with round-to-nearest can differ by one
/// level on some pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrayscaleWeights {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for GrayscaleWeights {
    fn default() -> Self {
        Self::bt601()
    }
}

impl GrayscaleWeights {
    /// ITU-R BT.601 luma coefficients.
    pub const fn bt601() -> Self {
        Self { r: 0.299, g: 0.587, b: 0.114 }
    }

    /// ITU-R BT.709 luma coefficients.
    pub const fn bt709() -> Self {
        Self { r: 0.2126, g: 0.7152, b: 0.0722 }
    }

    /// Custom weights, normalized to sum to 1.0.
    ///
    /// Falls back to BT.601 if the weights sum to zero or less.
    pub fn custom(r: f32, g: f32, b: f32) -> Self {
        let sum = r + g + b;
        if sum <= 0.0 {
            return Self::bt601();
        }
        Self { r: r / sum, g: g / sum, b: b / sum }
    }

    #[inline]
    fn apply(&self, r: u8, g: u8, b: u8) -> u8 {
        to_u8(self.r * r as f32 + self.g * g as f32 + self.b * b as f32)
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

// ============================================================================
// Luma/chroma planes
// ============================================================================

/// One luma and two chroma planes of identical shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LumaChroma {
    luma: Array2<u8>,
    cb: Array2<u8>,
    cr: Array2<u8>,
}

impl LumaChroma {
    /// Combine three planes.
    ///
    /// # Errors
    /// [`EqualizeError::DimensionMismatch`] if either chroma plane differs in
    /// shape from the luma plane.
    pub fn new(luma: Array2<u8>, cb: Array2<u8>, cr: Array2<u8>) -> Result<Self> {
        let expected = luma.dim();
        for (plane, found) in [("cb", cb.dim()), ("cr", cr.dim())] {
            if found != expected {
                return Err(EqualizeError::DimensionMismatch { plane, expected, found });
            }
        }
        Ok(Self { luma, cb, cr })
    }

    /// (height, width) shared by all three planes.
    pub fn dim(&self) -> (usize, usize) {
        self.luma.dim()
    }

    pub fn luma(&self) -> ArrayView2<u8> {
        self.luma.view()
    }

    pub fn cb(&self) -> ArrayView2<u8> {
        self.cb.view()
    }

    pub fn cr(&self) -> ArrayView2<u8> {
        self.cr.view()
    }

    /// Split back into (luma, cb, cr).
    pub fn into_planes(self) -> (Array2<u8>, Array2<u8>, Array2<u8>) {
        (self.luma, self.cb, self.cr)
    }
}

// ============================================================================
// Converter trait
// ============================================================================

/// Conversions between RGB images and luma/chroma or grayscale planes.
///
/// Implementations must preserve (height, width). The chroma planes handed
/// to [`from_luma_chroma`](Self::from_luma_chroma) are exactly the ones
/// produced by [`to_luma_chroma`](Self::to_luma_chroma) when the pipeline
/// runs in luminance mode.
pub trait ColorSpaceConverter {
    fn to_luma_chroma(&self, image: ArrayView3<u8>) -> Result<LumaChroma>;

    fn from_luma_chroma(&self, planes: &LumaChroma) -> Array3<u8>;

    fn to_grayscale(&self, image: ArrayView3<u8>) -> Result<Array2<u8>>;

    /// Expand a single channel into RGB with R=G=B.
    fn replicate_to_color(&self, gray: ArrayView2<u8>) -> Array3<u8> {
        let (height, width) = gray.dim();
        let mut output = Array3::<u8>::zeros((height, width, 3));
        for c in 0..3 {
            output.index_axis_mut(Axis(2), c).assign(&gray);
        }
        output
    }
}

/// Check shape and channel count of a color image.
pub(crate) fn validate_image(image: &ArrayView3<u8>) -> Result<()> {
    let (height, width, channels) = image.dim();
    if height == 0 || width == 0 {
        return Err(EqualizeError::EmptyInput);
    }
    match channels {
        1 | 3 | 4 => Ok(()),
        n => Err(EqualizeError::UnsupportedChannels(n)),
    }
}

// ============================================================================
// Full-range YCbCr
// ============================================================================

/// Full-range (JFIF) YCbCr converter with BT.601 luma.
///
/// ```text
/// Y  =       0.299    R + 0.587    G + 0.114    B
/// Cb = 128 - 0.168736 R - 0.331264 G + 0.5      B
/// Cr = 128 + 0.5      R - 0.418688 G - 0.081312 B
/// ```
///
/// Computed in f32 with round-to-nearest, so results may differ by one level
/// from fixed-point implementations.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct YCbCrConverter {
    grayscale: GrayscaleWeights,
}

impl YCbCrConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `weights` for grayscale conversion instead of BT.601.
    pub fn with_grayscale_weights(weights: GrayscaleWeights) -> Self {
        Self { grayscale: weights }
    }

    pub fn grayscale_weights(&self) -> GrayscaleWeights {
        self.grayscale
    }
}

impl ColorSpaceConverter for YCbCrConverter {
    fn to_luma_chroma(&self, image: ArrayView3<u8>) -> Result<LumaChroma> {
        validate_image(&image)?;
        let (height, width, channels) = image.dim();

        if channels == 1 {
            let luma = image.index_axis(Axis(2), 0).to_owned();
            let cb = Array2::from_elem((height, width), CHROMA_NEUTRAL);
            let cr = Array2::from_elem((height, width), CHROMA_NEUTRAL);
            return LumaChroma::new(luma, cb, cr);
        }

        let mut luma = Array2::<u8>::zeros((height, width));
        let mut cb = Array2::<u8>::zeros((height, width));
        let mut cr = Array2::<u8>::zeros((height, width));

        for y in 0..height {
            for x in 0..width {
                let r = image[[y, x, 0]] as f32;
                let g = image[[y, x, 1]] as f32;
                let b = image[[y, x, 2]] as f32;

                luma[[y, x]] = to_u8(0.299 * r + 0.587 * g + 0.114 * b);
                cb[[y, x]] = to_u8(128.0 - 0.168736 * r - 0.331264 * g + 0.5 * b);
                cr[[y, x]] = to_u8(128.0 + 0.5 * r - 0.418688 * g - 0.081312 * b);
            }
        }

        LumaChroma::new(luma, cb, cr)
    }

    fn from_luma_chroma(&self, planes: &LumaChroma) -> Array3<u8> {
        let (height, width) = planes.dim();
        let mut output = Array3::<u8>::zeros((height, width, 3));

        for y in 0..height {
            for x in 0..width {
                let luma = planes.luma[[y, x]] as f32;
                let cb = planes.cb[[y, x]] as f32 - 128.0;
                let cr = planes.cr[[y, x]] as f32 - 128.0;

                output[[y, x, 0]] = to_u8(luma + 1.402 * cr);
                output[[y, x, 1]] = to_u8(luma - 0.344136 * cb - 0.714136 * cr);
                output[[y, x, 2]] = to_u8(luma + 1.772 * cb);
            }
        }

        output
    }

    fn to_grayscale(&self, image: ArrayView3<u8>) -> Result<Array2<u8>> {
        validate_image(&image)?;
        let (height, width, channels) = image.dim();

        if channels == 1 {
            return Ok(image.index_axis(Axis(2), 0).to_owned());
        }

        let weights = self.grayscale;
        Ok(Array2::from_shape_fn((height, width), |(y, x)| {
            weights.apply(image[[y, x, 0]], image[[y, x, 1]], image[[y, x, 2]])
        }))
    }
}
