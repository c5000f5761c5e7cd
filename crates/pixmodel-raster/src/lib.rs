//! # pixmodel-raster
//!
//! A [`Raster`] binds a [`SampleModel`](pixmodel_sample::SampleModel) to a
//! shared [`DataBuffer`](pixmodel_core::DataBuffer) and places it on the
//! pixel plane.
//!
//! # Usage
//!
//! ```rust
//! use pixmodel_core::DataType;
//! use pixmodel_raster::create_interleaved_raster;
//!
//! let raster = create_interleaved_raster(DataType::Byte, 16, 16, 3, Some((100, 100))).unwrap();
//! raster.set_pixel(105, 110, &[255, 128, 0]).unwrap();
//!
//! // A child view shares storage with its parent.
//! let child = raster.create_child(104, 108, 4, 4, 0, 0, None).unwrap();
//! assert_eq!(child.get_pixel(1, 2).unwrap(), vec![255, 128, 0]);
//! ```
//!
//! # Dependencies
//!
//! - `pixmodel-core` - buffers, element types, errors
//! - `pixmodel-sample` - layouts
//!
//! # Used By
//!
//! - `pixmodel-color` - color models read and write rasters

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod factory;
mod raster;

pub use factory::{
    create_banded_raster, create_banded_raster_from, create_banded_raster_with, create_interleaved_raster,
    create_interleaved_raster_from, create_interleaved_raster_with, create_packed_raster,
    create_packed_raster_bits, create_packed_raster_from, create_raster, create_writable_raster,
};
pub use raster::Raster;
