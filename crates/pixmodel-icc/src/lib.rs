//! # pixmodel-icc
//!
//! ICC profile support for `pixmodel-color`, built on Little CMS 2.
//!
//! [`LcmsEngine`] implements [`TransformEngine`](pixmodel_color::TransformEngine):
//! given an ordered list of [`IccProfile`]s it composes one transform that
//! [`ColorConvertOp`](pixmodel_color::ColorConvertOp) applies to whole
//! rasters. Sequences of RGB profiles are supported; other data color
//! spaces are rejected with an unsupported-operation error.
//!
//! # Example
//!
//! ```rust,no_run
//! use pixmodel_color::{ColorConvertOp, RenderingIntent};
//! use pixmodel_icc::{IccProfile, LcmsEngine};
//! use std::path::Path;
//!
//! let monitor = IccProfile::from_file(Path::new("monitor.icc")).unwrap();
//! let op = ColorConvertOp::from_profiles(
//!     &LcmsEngine,
//!     &[IccProfile::srgb(), monitor],
//!     RenderingIntent::RelativeColorimetric,
//! )
//! .unwrap();
//! ```
//!
//! # Dependencies
//!
//! - `lcms2` - profile parsing and transforms
//! - `thiserror` - [`IccError`]
//! - `pixmodel-color`, `pixmodel-raster`, `pixmodel-core` - the engine interface and rasters

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod engine;
mod error;
mod profile;

pub use engine::LcmsEngine;
pub use error::{IccError, IccResult};
pub use profile::{IccProfile, ProfileKind};
