//! Histogram Equalization
//!
//! Contrast enhancement by flattening the intensity histogram of an image,
//! with Python bindings via PyO3 and WASM bindings for JavaScript.
//!
//! ## Image Format
//! Filters accept ndarray images of shape (height, width, channels):
//! - **Grayscale**: (height, width, 1) - single channel
//! - **RGB**: (height, width, 3) - 3 color channels
//! - **RGBA**: (height, width, 4) - 3 color channels + alpha
//!
//! Single channels for the core transform are (height, width) `u8` arrays.
//!
//! ## Modes
//! - **Grayscale**: convert to one intensity channel, equalize, replicate to RGB
//! - **Luminance**: equalize the Y plane of full-range YCbCr, keep Cb/Cr untouched
//!
//! ## Features
//! - `python`: PyO3 extension module `histeq_rust`
//! - `wasm`: wasm-bindgen exports over flat buffers
//! - `codec`: PNG/JPEG decode and encode through the `image` crate

pub mod buffer;
pub mod error;
pub mod filters;

#[cfg(feature = "codec")]
pub mod codec;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{EqualizeError, Result};
pub use filters::color_space::{ColorSpaceConverter, GrayscaleWeights, LumaChroma, YCbCrConverter};
pub use filters::equalize::{
    equalize_image, equalize_image_with, equalize_images_par, equalize_luma_chroma, EqualizeMode,
};
pub use filters::histogram::{equalization_table, equalize, Cdf, Histogram, MappingTable};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray1, PyArray2, PyArray3, PyReadonlyArray2, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::error::EqualizeError;
    use crate::filters::equalize::{equalize_image, EqualizeMode};
    use crate::filters::histogram::{equalization_table as equalization_table_impl, equalize};

    impl From<EqualizeError> for PyErr {
        fn from(err: EqualizeError) -> PyErr {
            PyValueError::new_err(err.to_string())
        }
    }

    // ========================================================================
    // Single channel
    // ========================================================================

    /// Histogram-equalize a 2D u8 array.
    #[pyfunction]
    pub fn equalize_channel<'py>(
        py: Python<'py>,
        channel: PyReadonlyArray2<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        let result = equalize(channel.as_array())?;
        Ok(result.into_pyarray(py))
    }

    /// 256-entry lookup table that `equalize_channel` would apply.
    #[pyfunction]
    pub fn equalization_table<'py>(
        py: Python<'py>,
        channel: PyReadonlyArray2<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray1<u8>>> {
        let table = equalization_table_impl(channel.as_array())?;
        Ok(table.as_array().to_vec().into_pyarray(py))
    }

    // ========================================================================
    // Color images
    // ========================================================================

    /// Histogram-equalize an image with 1, 3 or 4 channels.
    ///
    /// With `luminance=True` only the YCbCr luma is equalized and colors are
    /// kept; otherwise the result is a grayscale RGB image.
    #[pyfunction]
    #[pyo3(signature = (image, luminance=false))]
    pub fn equalize_histogram<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        luminance: bool,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let result = equalize_image(image.as_array(), EqualizeMode::from_flag(luminance))?;
        Ok(result.into_pyarray(py))
    }

    /// Same as `equalize_histogram` with the mode given by name
    /// ("grayscale" or "luminance").
    #[pyfunction]
    pub fn equalize_histogram_mode<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        mode: &str,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let mode: EqualizeMode = mode.parse()?;
        let result = equalize_image(image.as_array(), mode)?;
        Ok(result.into_pyarray(py))
    }

    /// Histogram equalization Rust extension module
    #[pymodule]
    pub fn histeq_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(equalize_channel, m)?)?;
        m.add_function(wrap_pyfunction!(equalization_table, m)?)?;
        m.add_function(wrap_pyfunction!(equalize_histogram, m)?)?;
        m.add_function(wrap_pyfunction!(equalize_histogram_mode, m)?)?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::histeq_rust;
