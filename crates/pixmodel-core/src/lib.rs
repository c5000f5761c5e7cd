//! # pixmodel-core
//!
//! Core types shared by the pixel layout crates.
//!
//! - [`DataBuffer`] - Banked numeric storage addressed by `(bank, index)`
//! - [`DataType`], [`TransferData`] - Element types and native pixel arrays
//! - [`Rect`] - Signed integer bounds
//! - [`mask`] - Contiguous bit-mask decomposition for packed pixels
//! - [`Error`], [`Result`] - The error taxonomy used by every crate
//!
//! ## Crate Structure
//!
//! ```text
//! pixmodel-core (this crate)
//!    ^
//!    |
//!    +-- pixmodel-sample (sample models: where samples live)
//!    +-- pixmodel-raster (raster = sample model + buffer + origin)
//!    +-- pixmodel-color (color models: what samples mean)
//!    +-- pixmodel-icc (lcms2 transform engine)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod error;
pub mod format;
pub mod mask;
pub mod rect;

pub use buffer::DataBuffer;
pub use error::{Error, Result, ensure_len};
pub use format::{DataType, TransferData};
pub use mask::{MaskField, decompose_mask, validate_masks};
pub use rect::Rect;

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use pixmodel_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::buffer::DataBuffer;
    pub use crate::error::{Error, Result};
    pub use crate::format::{DataType, TransferData};
    pub use crate::rect::Rect;
}
