//! Histogram equalization of color images.
//!
//! Two modes are supported:
//! - **Grayscale**: the image is reduced to one intensity channel, equalized,
//!   and replicated back into RGB (R=G=B).
//! - **Luminance**: the image is split into luma and chroma, only the luma
//!   plane is equalized, and the untouched chroma planes are recombined.
//!   Colors are kept while contrast changes.
//!
//! ## Supported Formats
//!
//! - **Grayscale**: (height, width, 1) - output is RGB
//! - **RGB**: (height, width, 3) - output is RGB
//! - **RGBA**: (height, width, 4) - output is RGBA, alpha preserved

use std::fmt;
use std::str::FromStr;

use ndarray::{concatenate, Array3, ArrayView2, ArrayView3, Axis};
use rayon::prelude::*;
use tracing::debug;

use super::color_space::{validate_image, ColorSpaceConverter, LumaChroma, YCbCrConverter};
use super::histogram::equalize;
use crate::error::{EqualizeError, Result};

// ============================================================================
// Mode
// ============================================================================

/// Which representation of the image gets equalized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EqualizeMode {
    /// Equalize a single grayscale channel; output is gray.
    #[default]
    Grayscale,
    /// Equalize only the luma plane of a luma/chroma split.
    Luminance,
}

impl EqualizeMode {
    /// `true` selects [`EqualizeMode::Luminance`].
    pub fn from_flag(luminance: bool) -> Self {
        if luminance {
            Self::Luminance
        } else {
            Self::Grayscale
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::Luminance => "luminance",
        }
    }
}

impl fmt::Display for EqualizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EqualizeMode {
    type Err = EqualizeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grayscale" | "greyscale" | "gray" | "grey" | "l" => Ok(Self::Grayscale),
            "luminance" | "luma" | "color" | "colour" | "ycbcr" => Ok(Self::Luminance),
            _ => Err(EqualizeError::UnknownMode(s.to_string())),
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Equalize the luma plane, moving both chroma planes through unchanged.
pub fn equalize_luma_chroma(planes: LumaChroma) -> Result<LumaChroma> {
    let (luma, cb, cr) = planes.into_planes();
    let luma = equalize(luma.view())?;
    LumaChroma::new(luma, cb, cr)
}

/// Equalize a color image with the default full-range YCbCr converter.
///
/// # Arguments
/// * `image` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `mode` - Grayscale or luminance equalization
///
/// # Returns
/// RGB image (RGBA if the input had alpha) with the same height and width
pub fn equalize_image(image: ArrayView3<u8>, mode: EqualizeMode) -> Result<Array3<u8>> {
    equalize_image_with(image, mode, &YCbCrConverter::default())
}

/// Equalize a color image using `converter` for all color-space work.
///
/// # Errors
/// - [`EqualizeError::EmptyInput`] for images without pixels
/// - [`EqualizeError::UnsupportedChannels`] for channel counts other than 1, 3, 4
/// - [`EqualizeError::DimensionMismatch`] if the converter changes the shape
pub fn equalize_image_with<C>(
    image: ArrayView3<u8>,
    mode: EqualizeMode,
    converter: &C,
) -> Result<Array3<u8>>
where
    C: ColorSpaceConverter + ?Sized,
{
    validate_image(&image)?;
    let (height, width, channels) = image.dim();
    debug!(height, width, channels, %mode, "equalizing image");

    let rgb = match mode {
        EqualizeMode::Grayscale => {
            let gray = converter.to_grayscale(image)?;
            check_plane("gray", (height, width), gray.dim())?;
            let equalized = equalize(gray.view())?;
            converter.replicate_to_color(equalized.view())
        }
        EqualizeMode::Luminance => {
            let planes = converter.to_luma_chroma(image)?;
            check_plane("luma", (height, width), planes.dim())?;
            let equalized = equalize_luma_chroma(planes)?;
            converter.from_luma_chroma(&equalized)
        }
    };

    if channels == 4 {
        attach_alpha(rgb, image.index_axis(Axis(2), 3))
    } else {
        Ok(rgb)
    }
}

/// Equalize independent images in parallel.
///
/// Results are returned in input order; a failing image does not affect
/// the others.
pub fn equalize_images_par(images: &[Array3<u8>], mode: EqualizeMode) -> Vec<Result<Array3<u8>>> {
    images
        .par_iter()
        .map(|image| equalize_image(image.view(), mode))
        .collect()
}

fn check_plane(plane: &'static str, expected: (usize, usize), found: (usize, usize)) -> Result<()> {
    if found == expected {
        Ok(())
    } else {
        Err(EqualizeError::DimensionMismatch { plane, expected, found })
    }
}

/// Append `alpha` as a fourth channel.
fn attach_alpha(rgb: Array3<u8>, alpha: ArrayView2<u8>) -> Result<Array3<u8>> {
    let (height, width, _) = rgb.dim();
    check_plane("alpha", (height, width), alpha.dim())?;
    let found = alpha.dim();
    let alpha = alpha.insert_axis(Axis(2));
    concatenate(Axis(2), &[rgb.view(), alpha.view()]).map_err(|_| {
        EqualizeError::DimensionMismatch {
            plane: "alpha",
            expected: (height, width),
            found,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};
    use std::cell::RefCell;

    /// RGB image with two distinct colors on a checkerboard.
    fn two_color_image() -> Array3<u8> {
        Array3::from_shape_fn((4, 4, 3), |(y, x, c)| {
            let dark = [40u8, 60, 90];
            let light = [180u8, 150, 120];
            if (x + y) % 2 == 0 {
                dark[c]
            } else {
                light[c]
            }
        })
    }

    fn gradient_image() -> Array3<u8> {
        Array3::from_shape_fn((12, 10, 3), |(y, x, c)| {
            (60 + y * 5 + x * 3 + c * 10) as u8
        })
    }

    /// Delegates to YCbCr and keeps the planes passed to `from_luma_chroma`.
    #[derive(Default)]
    struct RecordingConverter {
        inner: YCbCrConverter,
        split: RefCell<Option<LumaChroma>>,
        merged: RefCell<Option<LumaChroma>>,
    }

    impl ColorSpaceConverter for RecordingConverter {
        fn to_luma_chroma(&self, image: ArrayView3<u8>) -> Result<LumaChroma> {
            let planes = self.inner.to_luma_chroma(image)?;
            *self.split.borrow_mut() = Some(planes.clone());
            Ok(planes)
        }

        fn from_luma_chroma(&self, planes: &LumaChroma) -> Array3<u8> {
            *self.merged.borrow_mut() = Some(planes.clone());
            self.inner.from_luma_chroma(planes)
        }

        fn to_grayscale(&self, image: ArrayView3<u8>) -> Result<Array2<u8>> {
            self.inner.to_grayscale(image)
        }
    }

    /// Returns a grayscale plane one column short.
    struct ShrinkingConverter;

    impl ColorSpaceConverter for ShrinkingConverter {
        fn to_luma_chroma(&self, image: ArrayView3<u8>) -> Result<LumaChroma> {
            YCbCrConverter::new().to_luma_chroma(image)
        }

        fn from_luma_chroma(&self, planes: &LumaChroma) -> Array3<u8> {
            YCbCrConverter::new().from_luma_chroma(planes)
        }

        fn to_grayscale(&self, image: ArrayView3<u8>) -> Result<Array2<u8>> {
            let (height, width, _) = image.dim();
            Ok(Array2::zeros((height, width - 1)))
        }
    }

    // ========================================================================
    // Mode
    // ========================================================================

    #[test]
    fn test_mode_parse() {
        assert_eq!("grayscale".parse::<EqualizeMode>().unwrap(), EqualizeMode::Grayscale);
        assert_eq!(" L ".parse::<EqualizeMode>().unwrap(), EqualizeMode::Grayscale);
        assert_eq!("YCbCr".parse::<EqualizeMode>().unwrap(), EqualizeMode::Luminance);
        assert_eq!("color".parse::<EqualizeMode>().unwrap(), EqualizeMode::Luminance);
        assert!(matches!(
            "sepia".parse::<EqualizeMode>(),
            Err(EqualizeError::UnknownMode(_))
        ));
    }

    #[test]
    fn test_mode_default_and_flag() {
        assert_eq!(EqualizeMode::default(), EqualizeMode::Grayscale);
        assert_eq!(EqualizeMode::from_flag(true), EqualizeMode::Luminance);
        assert_eq!(EqualizeMode::from_flag(false), EqualizeMode::Grayscale);
        assert_eq!(EqualizeMode::Luminance.to_string(), "luminance");
    }

    // ========================================================================
    // Grayscale mode
    // ========================================================================

    #[test]
    fn test_grayscale_mode_two_levels() {
        let img = two_color_image();
        let result = equalize_image(img.view(), EqualizeMode::Grayscale).unwrap();

        assert_eq!(result.dim(), (4, 4, 3));
        for y in 0..4 {
            for x in 0..4 {
                let expected = if (x + y) % 2 == 0 { 0 } else { 255 };
                for c in 0..3 {
                    assert_eq!(result[[y, x, c]], expected);
                }
            }
        }
    }

    #[test]
    fn test_grayscale_mode_uniform_is_black() {
        let img = Array3::<u8>::from_elem((3, 5, 3), 77);
        let result = equalize_image(img.view(), EqualizeMode::Grayscale).unwrap();
        assert!(result.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_grayscale_mode_channels_equal() {
        let img = gradient_image();
        let result = equalize_image(img.view(), EqualizeMode::Grayscale).unwrap();

        for y in 0..12 {
            for x in 0..10 {
                assert_eq!(result[[y, x, 0]], result[[y, x, 1]]);
                assert_eq!(result[[y, x, 1]], result[[y, x, 2]]);
            }
        }
        assert!(result.iter().any(|&v| v == 255));
    }

    // ========================================================================
    // Luminance mode
    // ========================================================================

    #[test]
    fn test_luma_chroma_keeps_chroma() {
        let img = gradient_image();
        let planes = YCbCrConverter::new().to_luma_chroma(img.view()).unwrap();
        let original = planes.clone();

        let equalized = equalize_luma_chroma(planes).unwrap();

        assert_eq!(equalized.cb(), original.cb());
        assert_eq!(equalized.cr(), original.cr());
        assert_ne!(equalized.luma(), original.luma());
    }

    #[test]
    fn test_luminance_mode_passes_chroma_through() {
        let img = gradient_image();
        let converter = RecordingConverter::default();

        let result = equalize_image_with(img.view(), EqualizeMode::Luminance, &converter).unwrap();
        assert_eq!(result.dim(), (12, 10, 3));

        let split = converter.split.borrow().clone().unwrap();
        let merged = converter.merged.borrow().clone().unwrap();
        assert_eq!(merged.cb(), split.cb());
        assert_eq!(merged.cr(), split.cr());

        let expected_luma = equalize(split.luma()).unwrap();
        assert_eq!(merged.luma(), expected_luma);
    }

    #[test]
    fn test_luminance_mode_stretches_contrast() {
        let img = gradient_image();
        let result = equalize_image(img.view(), EqualizeMode::Luminance).unwrap();

        let planes = YCbCrConverter::new().to_luma_chroma(result.view()).unwrap();
        let min = planes.luma().iter().copied().min().unwrap();
        let max = planes.luma().iter().copied().max().unwrap();
        assert!(min <= 5, "min luma {}", min);
        assert!(max >= 240, "max luma {}", max);
    }

    #[test]
    fn test_single_channel_modes_agree() {
        let img = Array3::from_shape_fn((5, 7, 1), |(y, x, _)| (y * 20 + x * 9) as u8);

        let gray = equalize_image(img.view(), EqualizeMode::Grayscale).unwrap();
        let luma = equalize_image(img.view(), EqualizeMode::Luminance).unwrap();

        assert_eq!(gray.dim(), (5, 7, 3));
        assert_eq!(gray, luma);
    }

    // ========================================================================
    // Alpha and validation
    // ========================================================================

    #[test]
    fn test_rgba_alpha_preserved() {
        let img = Array3::from_shape_fn((4, 4, 4), |(y, x, c)| {
            if c == 3 {
                (y * 4 + x) as u8 * 10
            } else {
                (y * 30 + x * 10 + c) as u8
            }
        });

        for mode in [EqualizeMode::Grayscale, EqualizeMode::Luminance] {
            let result = equalize_image(img.view(), mode).unwrap();
            assert_eq!(result.dim(), (4, 4, 4));
            assert_eq!(result.index_axis(Axis(2), 3), img.index_axis(Axis(2), 3));
        }
    }

    #[test]
    fn test_attach_alpha_from_borrowed_view() {
        let source = Array3::from_shape_fn((3, 2, 4), |(y, x, c)| (y * 8 + x * 4 + c) as u8);
        let rgb = Array3::<u8>::from_elem((3, 2, 3), 9);

        let result = attach_alpha(rgb, source.index_axis(Axis(2), 3)).unwrap();

        assert_eq!(result.dim(), (3, 2, 4));
        assert_eq!(result.index_axis(Axis(2), 3), source.index_axis(Axis(2), 3));
        assert!(result.index_axis(Axis(2), 0).iter().all(|&v| v == 9));
    }

    #[test]
    fn test_attach_alpha_shape_mismatch() {
        let alpha = Array2::<u8>::zeros((2, 2));
        let rgb = Array3::<u8>::zeros((3, 2, 3));

        assert!(matches!(
            attach_alpha(rgb, alpha.view()),
            Err(EqualizeError::DimensionMismatch { plane: "alpha", .. })
        ));
    }

    #[test]
    fn test_empty_image_rejected() {
        let img = Array3::<u8>::zeros((0, 4, 3));
        assert!(matches!(
            equalize_image(img.view(), EqualizeMode::Luminance),
            Err(EqualizeError::EmptyInput)
        ));
    }

    #[test]
    fn test_unsupported_channels_rejected() {
        let img = Array3::<u8>::zeros((2, 2, 2));
        assert!(matches!(
            equalize_image(img.view(), EqualizeMode::Grayscale),
            Err(EqualizeError::UnsupportedChannels(2))
        ));
    }

    #[test]
    fn test_shape_changing_converter_rejected() {
        let img = gradient_image();
        let result = equalize_image_with(img.view(), EqualizeMode::Grayscale, &ShrinkingConverter);

        assert!(matches!(
            result,
            Err(EqualizeError::DimensionMismatch { plane: "gray", .. })
        ));
    }

    // ========================================================================
    // Batch
    // ========================================================================

    #[test]
    fn test_equalize_images_par_keeps_order() {
        let images = vec![
            two_color_image(),
            Array3::<u8>::zeros((2, 2, 2)),
            gradient_image(),
        ];

        let results = equalize_images_par(&images, EqualizeMode::Grayscale);

        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0].as_ref().unwrap(),
            &equalize_image(images[0].view(), EqualizeMode::Grayscale).unwrap()
        );
        assert!(matches!(results[1], Err(EqualizeError::UnsupportedChannels(2))));
        assert_eq!(results[2].as_ref().unwrap().dim(), (12, 10, 3));
    }
}
