//! Error types for pixel layout operations.
//!
//! Every fallible operation in the pixmodel crates reports one of four
//! failure categories.
//!
//! # Overview
//!
//! - **Invalid configuration**: malformed construction parameters such as a
//!   non-contiguous bit mask, mismatched offset/bank arrays or an unsupported
//!   bit depth. Always raised eagerly by constructors.
//! - **Out of range**: a coordinate, band, bank or element index outside the
//!   addressable region, or an output slice too short for the result.
//! - **Unsupported operation**: a transfer type or model combination that has
//!   no implementation.
//! - **Format mismatch**: combining rasters, sample models or color models whose
//!   topologies disagree.
//!
//! Errors are synchronous and final. Nothing is retried and no operation
//! leaves partially written output behind on a validation failure.
//!
//! # Usage
//!
//! ```rust
//! use pixmodel_core::{Error, Result};
//!
//! fn band(band: usize, num_bands: usize) -> Result<usize> {
//!     if band >= num_bands {
//!         return Err(Error::out_of_range("band", band as i64, num_bands as i64));
//!     }
//!     Ok(band)
//! }
//!
//! assert!(band(3, 3).unwrap_err().is_range_error());
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - For derive macro error implementation
//!
//! # Used By
//!
//! - [`crate::buffer::DataBuffer`] - Element bounds checks
//! - [`crate::mask`] - Mask validation
//! - `pixmodel-sample`, `pixmodel-raster`, `pixmodel-color` - All operations

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by sample models, color models, rasters and data buffers.
///
/// # Categories
///
/// - **Configuration**: [`InvalidConfiguration`](Error::InvalidConfiguration)
/// - **Range**: [`OutOfRange`](Error::OutOfRange), [`BufferTooSmall`](Error::BufferTooSmall)
/// - **Unsupported**: [`UnsupportedOperation`](Error::UnsupportedOperation)
/// - **Topology**: [`FormatMismatch`](Error::FormatMismatch)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Construction parameters are malformed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pixmodel_core::Error;
    ///
    /// let err = Error::invalid_config("red mask 0xa is not contiguous");
    /// assert!(err.to_string().contains("red mask"));
    /// ```
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// What was wrong with the parameters
        reason: String,
    },

    /// An index or coordinate lies outside `0..limit`.
    #[error("{what} {index} out of range (limit {limit})")]
    OutOfRange {
        /// Name of the indexed quantity ("band", "x", "element index", ...)
        what: &'static str,
        /// Offending value
        index: i64,
        /// Exclusive upper bound
        limit: i64,
    },

    /// A caller-supplied output slice cannot hold the result.
    #[error("output buffer holds {got} values, {required} required")]
    BufferTooSmall {
        /// Values the operation needs to write
        required: usize,
        /// Length of the slice that was supplied
        got: usize,
    },

    /// The operation has no implementation for this configuration.
    #[error("unsupported operation {operation}: {reason}")]
    UnsupportedOperation {
        /// Operation name
        operation: &'static str,
        /// Which combination is not handled
        reason: String,
    },

    /// Two objects with incompatible layouts were combined.
    #[error("format mismatch: {reason}")]
    FormatMismatch {
        /// Description of the disagreement
        reason: String,
    },
}

impl Error {
    /// Creates an [`Error::InvalidConfiguration`] error.
    #[inline]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::OutOfRange`] error.
    ///
    /// # Arguments
    ///
    /// * `what` - Name of the indexed quantity
    /// * `index` - Value that was used
    /// * `limit` - Exclusive upper bound that applies
    #[inline]
    pub fn out_of_range(what: &'static str, index: i64, limit: i64) -> Self {
        Self::OutOfRange { what, index, limit }
    }

    /// Creates an [`Error::BufferTooSmall`] error.
    #[inline]
    pub fn buffer_too_small(required: usize, got: usize) -> Self {
        Self::BufferTooSmall { required, got }
    }

    /// Creates an [`Error::UnsupportedOperation`] error.
    #[inline]
    pub fn unsupported(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::FormatMismatch`] error.
    #[inline]
    pub fn format_mismatch(reason: impl Into<String>) -> Self {
        Self::FormatMismatch {
            reason: reason.into(),
        }
    }

    /// Returns `true` if this is a construction-time configuration error.
    #[inline]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfiguration { .. })
    }

    /// Returns `true` if this is an index or output-size error.
    #[inline]
    pub fn is_range_error(&self) -> bool {
        matches!(self, Self::OutOfRange { .. } | Self::BufferTooSmall { .. })
    }

    /// Returns `true` if the operation is not implemented for the input.
    #[inline]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedOperation { .. })
    }

    /// Returns `true` if this is a layout compatibility error.
    #[inline]
    pub fn is_format_mismatch(&self) -> bool {
        matches!(self, Self::FormatMismatch { .. })
    }
}

/// Checks that `slice_len` can hold `required` values.
#[inline]
pub fn ensure_len(required: usize, slice_len: usize) -> Result<()> {
    if slice_len < required {
        Err(Error::buffer_too_small(required, slice_len))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range() {
        let err = Error::out_of_range("band", 4, 3);
        let msg = err.to_string();
        assert!(msg.contains("band 4"));
        assert!(msg.contains("3"));
        assert!(err.is_range_error());
        assert!(!err.is_config_error());
    }

    #[test]
    fn test_buffer_too_small() {
        let err = Error::buffer_too_small(12, 4);
        assert!(err.is_range_error());
        assert!(err.to_string().contains("12"));
        assert!(ensure_len(4, 4).is_ok());
        assert_eq!(ensure_len(5, 4), Err(Error::buffer_too_small(5, 4)));
    }

    #[test]
    fn test_categories() {
        assert!(Error::invalid_config("x").is_config_error());
        assert!(Error::unsupported("getPixelFloat", "byte").is_unsupported());
        assert!(Error::format_mismatch("child outside parent").is_format_mismatch());
    }
}
