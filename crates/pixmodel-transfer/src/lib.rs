//! # pixmodel-transfer
//!
//! Transfer curves and integer lookup tables for color models.
//!
//! # Terminology
//!
//! - **OETF**: Linear -> Encoded
//! - **EOTF**: Encoded -> Linear
//!
//! # Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`curve`] | [`TransferCurve`]: sRGB piecewise and power-law curves |
//! | [`lut`] | 8/16-bit tables to and from sRGB 8-bit |
//!
//! # Usage
//!
//! ```rust
//! use pixmodel_transfer::{TransferCurve, lut};
//!
//! let linear = TransferCurve::Srgb.decode(0.5);
//! assert!((TransferCurve::Srgb.encode(linear) - 0.5).abs() < 1e-5);
//!
//! // Linear 16-bit sample to 8-bit sRGB without evaluating the curve.
//! assert_eq!(lut::linear16_to_srgb8()[65535], 255);
//! ```
//!
//! # Dependencies
//!
//! - `rayon` - parallel fill of 65536-entry tables
//!
//! # Used By
//!
//! - `pixmodel-color` - color space conversions and component color model fast paths

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod curve;
pub mod lut;

pub use curve::TransferCurve;
