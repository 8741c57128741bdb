//! Histogram equalization of a single 8-bit channel.
//!
//! The transform is a 256-entry lookup table built from the channel's
//! cumulative distribution:
//!
//! ```text
//! table[i] = floor((cdf[i] - cdf_min) * 255 / (cdf_max - cdf_min))
//! ```
//!
//! where `cdf_min` is the smallest non-zero CDF entry. Levels whose CDF is
//! still zero (darker than anything in the image) are masked and map to 0.
//! When all samples share one level, `cdf_max == cdf_min` and every entry
//! maps to 0 as well.
//!
//! ## Rounding
//!
//! Entries are computed with exact integer arithmetic and truncated, which
//! matches the usual float-then-cast-to-u8 behavior of 8-bit pipelines.

use ndarray::{Array2, ArrayView2};
use tracing::{debug, trace};

use crate::error::{EqualizeError, Result};

/// Number of intensity levels in an 8-bit channel.
pub const LEVELS: usize = 256;

const MAX_LEVEL: u64 = (LEVELS - 1) as u64;

// ============================================================================
// Histogram
// ============================================================================

/// Sample counts per intensity level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Histogram {
    counts: [u64; LEVELS],
}

impl Histogram {
    /// Count every sample of `buffer` into its level bin.
    pub fn from_buffer(buffer: ArrayView2<u8>) -> Self {
        let mut counts = [0u64; LEVELS];
        for &v in buffer.iter() {
            counts[v as usize] += 1;
        }
        Self { counts }
    }

    pub fn counts(&self) -> &[u64; LEVELS] {
        &self.counts
    }

    /// Total number of samples counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Prefix sums of the counts.
    pub fn cdf(&self) -> Cdf {
        let mut values = [0u64; LEVELS];
        let mut running = 0u64;
        for (slot, &count) in values.iter_mut().zip(self.counts.iter()) {
            running += count;
            *slot = running;
        }
        Cdf { values }
    }
}

// ============================================================================
// Cumulative distribution
// ============================================================================

/// Cumulative distribution of a [`Histogram`]. Non-decreasing by construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cdf {
    values: [u64; LEVELS],
}

impl Cdf {
    pub fn values(&self) -> &[u64; LEVELS] {
        &self.values
    }

    /// Smallest non-zero entry, `None` for an all-zero distribution.
    pub fn min_nonzero(&self) -> Option<u64> {
        // Non-decreasing, so the first non-zero entry is the minimum.
        self.values.iter().copied().find(|&v| v > 0)
    }

    /// Last entry, equal to the total sample count.
    pub fn max(&self) -> u64 {
        self.values[LEVELS - 1]
    }

    /// Normalize the distribution into an intensity mapping table.
    ///
    /// Masked levels (CDF of zero) map to 0. A distribution with all of its
    /// mass on one level (or no mass at all) yields the all-zero table.
    pub fn mapping_table(&self) -> MappingTable {
        let mut table = [0u8; LEVELS];

        let Some(cdf_min) = self.min_nonzero() else {
            return MappingTable { table };
        };
        let cdf_max = self.max();
        let range = cdf_max - cdf_min;
        if range == 0 {
            debug!(cdf_min, "single intensity level, mapping collapses to zero");
            return MappingTable { table };
        }

        for (slot, &c) in table.iter_mut().zip(self.values.iter()) {
            if c == 0 {
                continue;
            }
            // c <= cdf_max, so the quotient never exceeds 255
            *slot = ((c - cdf_min) * MAX_LEVEL / range) as u8;
        }

        trace!(cdf_min, cdf_max, "built mapping table");
        MappingTable { table }
    }
}

// ============================================================================
// Mapping table
// ============================================================================

/// Input level -> output level lookup table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappingTable {
    table: [u8; LEVELS],
}

impl MappingTable {
    pub fn as_array(&self) -> &[u8; LEVELS] {
        &self.table
    }

    #[inline]
    pub fn lookup(&self, level: u8) -> u8 {
        self.table[level as usize]
    }

    /// Apply the table to every sample, producing a new buffer.
    pub fn apply(&self, buffer: ArrayView2<u8>) -> Array2<u8> {
        buffer.mapv(|v| self.table[v as usize])
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Build the equalization table for a channel without applying it.
///
/// # Errors
/// [`EqualizeError::EmptyInput`] if the buffer has no samples.
pub fn equalization_table(buffer: ArrayView2<u8>) -> Result<MappingTable> {
    if buffer.is_empty() {
        return Err(EqualizeError::EmptyInput);
    }

    let histogram = Histogram::from_buffer(buffer);
    let cdf = histogram.cdf();
    debug!(
        rows = buffer.nrows(),
        cols = buffer.ncols(),
        cdf_min = cdf.min_nonzero(),
        cdf_max = cdf.max(),
        "equalizing channel"
    );
    Ok(cdf.mapping_table())
}

/// Histogram-equalize a single 8-bit channel.
///
/// # Arguments
/// * `buffer` - 2D array view of shape (height, width)
///
/// # Returns
/// Newly allocated channel with the same shape
///
/// # Errors
/// [`EqualizeError::EmptyInput`] if the buffer has no samples.
pub fn equalize(buffer: ArrayView2<u8>) -> Result<Array2<u8>> {
    let table = equalization_table(buffer)?;
    Ok(table.apply(buffer))
}
