//! Histogram equalization filters.
//!
//! ## Supported Formats
//!
//! | Format | Shape | Type | Description |
//! |--------|-------|------|-------------|
//! | Channel | (H, W) | u8 | Single intensity plane, 0-255 |
//! | Grayscale8 | (H, W, 1) | u8 | Single luminance channel, 0-255 |
//! | RGB8 | (H, W, 3) | u8 | Red, green, blue, 0-255 |
//! | RGBA8 | (H, W, 4) | u8 | RGB + alpha, 0-255 |
//!
//! Channel count is inferred from input array dimensions.
//!
//! ## Architecture
//!
//! - **Pure** - Every call allocates its output; inputs are never modified
//! - **Alpha preservation** - Alpha channel (if present) is always preserved
//! - **Swappable color space** - Luma/chroma work goes through [`color_space::ColorSpaceConverter`]
//!
//! ## Modules
//!
//! - `histogram`: histogram, CDF, mapping table, single-channel equalization
//! - `color_space`: grayscale and full-range YCbCr conversion
//! - `equalize`: grayscale / luminance pipeline over color images

pub mod histogram;
pub mod color_space;
pub mod equalize;
