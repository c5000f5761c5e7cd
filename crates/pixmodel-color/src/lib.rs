//! # pixmodel-color
//!
//! Color models: what the samples of a raster mean.
//!
//! A color model maps native pixels (the data elements a
//! [`Raster`](pixmodel_raster::Raster) stores for one pixel) to colors and
//! back. Three kinds exist, gathered in the [`ColorModel`] sum type:
//!
//! | Model | Pixel layout | Typical use |
//! |-------|--------------|-------------|
//! | [`ComponentColorModel`] | one sample per component | RGB(A), gray, XYZ rasters |
//! | [`DirectColorModel`] | bit fields of one element | 565, 555, `0xAARRGGBB` |
//! | [`IndexColorModel`] | palette index | GIF-style images |
//!
//! Colors are exchanged as non-premultiplied `0xAARRGGBB` sRGB integers.
//! [`colorspace`] defines what the components of a model mean and
//! [`ColorConvertOp`] converts rasters between spaces.
//!
//! # Usage
//!
//! ```rust
//! use pixmodel_color::{ColorModel, ComponentColorModel};
//! use pixmodel_core::DataType;
//!
//! let cm: ColorModel = ComponentColorModel::with_defaults(
//!     pixmodel_color::colorspace::srgb(),
//!     true,
//!     false,
//!     DataType::Byte,
//! )
//! .unwrap()
//! .into();
//!
//! let pixel = cm.get_data_elements(0x80ff8000);
//! assert_eq!(cm.get_components(&pixel).unwrap(), vec![255, 128, 0, 128]);
//! assert_eq!(cm.get_rgb(&pixel).unwrap(), 0x80ff8000);
//! ```
//!
//! # Dependencies
//!
//! - `pixmodel-core` - element types, errors, mask decomposition
//! - `pixmodel-sample`, `pixmodel-raster` - pixel layout and storage
//! - `pixmodel-transfer` - transfer curves and sRGB lookup tables
//! - `rayon` - row-parallel `coerce_data`, palette expansion and conversion
//! - `tracing` - construction and conversion events
//!
//! # Used By
//!
//! - `pixmodel-icc` - implements [`TransformEngine`] with lcms2

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod colorspace;
pub mod convert;

mod component;
mod direct;
mod header;
mod index;
mod model;
mod packed;

pub use component::ComponentColorModel;
pub use convert::{ColorConvertOp, ColorTransform, RenderingIntent, TransformEngine};
pub use direct::DirectColorModel;
pub use header::Transparency;
pub use index::IndexColorModel;
pub use model::ColorModel;
pub use packed::PackedColorModel;
