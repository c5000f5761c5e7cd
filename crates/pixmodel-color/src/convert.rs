//! Color conversion between rasters.
//!
//! [`ColorConvertOp`] converts pixels from one color space to another. It
//! either goes through CIE XYZ using two [`ColorSpace`]s, or hands the work
//! to a [`ColorTransform`] built by a [`TransformEngine`] from an ordered
//! list of profiles.
//!
//! # Example
//!
//! ```rust
//! use pixmodel_color::colorspace::{linear_rgb, srgb};
//! use pixmodel_color::ColorConvertOp;
//! use pixmodel_core::DataType;
//! use pixmodel_raster::create_interleaved_raster;
//!
//! let src = create_interleaved_raster(DataType::Byte, 2, 1, 3, None).unwrap();
//! src.set_pixel(0, 0, &[128, 128, 128]).unwrap();
//!
//! let op = ColorConvertOp::new(srgb(), linear_rgb());
//! let dst = op.filter_raster(&src, None).unwrap();
//! assert_eq!(dst.get_pixel(0, 0).unwrap(), vec![55, 55, 55]);
//! ```

use std::fmt;
use std::sync::Arc;

use pixmodel_core::{DataType, Error, Result};
use pixmodel_raster::{Raster, create_interleaved_raster};
use rayon::prelude::*;
use tracing::debug;

use crate::colorspace::ColorSpace;
use crate::component::ComponentColorModel;
use crate::header::{Transparency, magnitude, max_for_bits, to_sample};
use crate::model::ColorModel;

/// How out-of-gamut colors are mapped by profile-based transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderingIntent {
    /// Compresses the source gamut into the destination gamut.
    #[default]
    Perceptual,
    /// Clips out-of-gamut colors, white point adapted.
    RelativeColorimetric,
    /// Preserves saturation over hue and lightness.
    Saturation,
    /// Clips out-of-gamut colors, no white point adaptation.
    AbsoluteColorimetric,
}

/// A composed color transform over whole rasters.
pub trait ColorTransform: Send + Sync + fmt::Debug {
    /// Bands expected in the source raster.
    fn num_input_components(&self) -> usize;

    /// Bands written to the destination raster.
    fn num_output_components(&self) -> usize;

    /// Converts every pixel of `src` into the pixel at the same offset in `dst`.
    ///
    /// Both rasters have the same size.
    fn convert(&self, src: &Raster, dst: &Raster) -> Result<()>;
}

/// Builds [`ColorTransform`]s from profile sequences.
pub trait TransformEngine {
    /// Profile description understood by the engine.
    type Profile;

    /// Composes `profiles`, first to last, into one transform.
    fn create_transform(&self, profiles: &[Self::Profile], intent: RenderingIntent) -> Result<Arc<dyn ColorTransform>>;
}

#[derive(Debug, Clone)]
enum Stage {
    Spaces { src: Arc<dyn ColorSpace>, dst: Arc<dyn ColorSpace> },
    Transform(Arc<dyn ColorTransform>),
}

/// Converts pixels between color spaces.
#[derive(Debug, Clone)]
pub struct ColorConvertOp {
    stage: Stage,
    intent: RenderingIntent,
}

impl ColorConvertOp {
    /// Converts from `src` to `dst` through CIE XYZ.
    pub fn new(src: Arc<dyn ColorSpace>, dst: Arc<dyn ColorSpace>) -> Self {
        Self { stage: Stage::Spaces { src, dst }, intent: RenderingIntent::default() }
    }

    /// Converts with an already composed transform.
    pub fn with_transform(transform: Arc<dyn ColorTransform>, intent: RenderingIntent) -> Self {
        Self { stage: Stage::Transform(transform), intent }
    }

    /// Converts through `profiles`, composed by `engine`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] with fewer than two profiles; engine
    /// errors otherwise.
    pub fn from_profiles<E: TransformEngine>(engine: &E, profiles: &[E::Profile], intent: RenderingIntent) -> Result<Self> {
        if profiles.len() < 2 {
            return Err(Error::invalid_config("source or destination profile is undefined"));
        }
        let transform = engine.create_transform(profiles, intent)?;
        debug!(profiles = profiles.len(), ?intent, "ColorConvertOp::from_profiles");
        Ok(Self::with_transform(transform, intent))
    }

    /// Rendering intent of the op.
    pub fn rendering_intent(&self) -> RenderingIntent {
        self.intent
    }

    /// Source and destination color spaces, `None` for transform-based ops.
    pub fn color_spaces(&self) -> Option<(&Arc<dyn ColorSpace>, &Arc<dyn ColorSpace>)> {
        match &self.stage {
            Stage::Spaces { src, dst } => Some((src, dst)),
            Stage::Transform(_) => None,
        }
    }

    fn component_counts(&self) -> (usize, usize) {
        match &self.stage {
            Stage::Spaces { src, dst } => (src.num_components(), dst.num_components()),
            Stage::Transform(t) => (t.num_input_components(), t.num_output_components()),
        }
    }

    /// Byte raster of the source size and location with one band per
    /// destination component.
    pub fn create_compatible_dest_raster(&self, src: &Raster) -> Result<Raster> {
        let (_, n) = self.component_counts();
        create_interleaved_raster(DataType::Byte, src.width(), src.height(), n, Some((src.min_x(), src.min_y())))
    }

    /// Converts every pixel of `src`, whose bands are the source color
    /// components.
    ///
    /// Each sample range maps onto its color component's
    /// [`min_value`](ColorSpace::min_value) to
    /// [`max_value`](ColorSpace::max_value) range. Without `dst` a
    /// [`Self::create_compatible_dest_raster`] is filled and returned.
    ///
    /// # Errors
    ///
    /// [`Error::FormatMismatch`] when band counts disagree with the color
    /// spaces or the rasters differ in size.
    pub fn filter_raster(&self, src: &Raster, dst: Option<&Raster>) -> Result<Raster> {
        let (in_n, out_n) = self.component_counts();
        if src.num_bands() != in_n {
            return Err(Error::format_mismatch(format!(
                "source raster has {} bands for {in_n} source components",
                src.num_bands()
            )));
        }
        let dst = match dst {
            Some(d) => {
                check_same_size(src, d)?;
                if d.num_bands() != out_n {
                    return Err(Error::format_mismatch(format!(
                        "destination raster has {} bands for {out_n} destination components",
                        d.num_bands()
                    )));
                }
                d.clone()
            }
            None => self.create_compatible_dest_raster(src)?,
        };
        debug!(width = src.width(), height = src.height(), in_n, out_n, "ColorConvertOp::filter_raster");

        match &self.stage {
            Stage::Transform(t) => t.convert(src, &dst)?,
            Stage::Spaces { src: s, dst: d } => convert_samples(s.as_ref(), d.as_ref(), src, &dst)?,
        }
        Ok(dst)
    }

    /// Byte component model and raster receiving the conversion of an image
    /// described by `src_cm`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] for transform-based ops, which have no
    /// destination color space.
    pub fn create_compatible_dest(&self, src_cm: &ColorModel, src: &Raster) -> Result<(ColorModel, Raster)> {
        let Stage::Spaces { dst, .. } = &self.stage else {
            return Err(Error::invalid_config("destination color space is undefined"));
        };
        let has_alpha = src_cm.has_alpha();
        let transparency = if has_alpha { src_cm.transparency() } else { Transparency::Opaque };
        let cm: ColorModel =
            ComponentColorModel::new(Arc::clone(dst), None, has_alpha, false, transparency, DataType::Byte)?.into();
        let raster = cm.create_compatible_writable_raster(src.width(), src.height())?;
        Ok((cm, raster))
    }

    /// Converts an image, color model included.
    ///
    /// Palette sources are expanded to packed ARGB first. Colors go from the
    /// source model's space to the destination model's space; alpha is
    /// carried over, or set opaque when the source has none. Without `dst`
    /// the result uses [`Self::create_compatible_dest`].
    pub fn filter(
        &self,
        src_cm: &ColorModel,
        src: &Raster,
        dst: Option<(&ColorModel, &Raster)>,
    ) -> Result<(ColorModel, Raster)> {
        let (src_cm, src) = match src_cm.as_index() {
            Some(icm) => icm.convert_to_int_discrete(src, false)?,
            None => (src_cm.clone(), src.clone()),
        };
        let (dst_cm, dst) = match dst {
            Some((cm, r)) => {
                check_same_size(&src, r)?;
                (cm.clone(), r.clone())
            }
            None => self.create_compatible_dest(&src_cm, &src)?,
        };
        debug!(
            src = src_cm.kind_name(),
            dst = dst_cm.kind_name(),
            width = src.width(),
            height = src.height(),
            "ColorConvertOp::filter"
        );

        match &self.stage {
            Stage::Spaces { .. } => convert_pixels(&src_cm, &src, &dst_cm, &dst)?,
            Stage::Transform(t) => transform_pixels(t.as_ref(), &src_cm, &src, &dst_cm, &dst)?,
        }
        Ok((dst_cm, dst))
    }
}

fn check_same_size(src: &Raster, dst: &Raster) -> Result<()> {
    if src.width() != dst.width() || src.height() != dst.height() {
        return Err(Error::format_mismatch(format!(
            "raster sizes differ: {}x{} and {}x{}",
            src.width(),
            src.height(),
            dst.width(),
            dst.height()
        )));
    }
    Ok(())
}

fn band_maxes(raster: &Raster) -> Result<Vec<f64>> {
    (0..raster.num_bands())
        .map(|b| Ok(f64::from(max_for_bits(raster.sample_model().sample_size(b)?))))
        .collect()
}

fn component_ranges(space: &dyn ColorSpace, bands: usize) -> Vec<(f64, f64)> {
    (0..bands)
        .map(|k| {
            let lo = f64::from(space.min_value(k));
            (lo, f64::from(space.max_value(k)) - lo)
        })
        .collect()
}

// Raster path: bands are the color components. A sample spans its space's
// component range scaled to the sample size.
fn convert_samples(s: &dyn ColorSpace, d: &dyn ColorSpace, src: &Raster, dst: &Raster) -> Result<()> {
    let smax = band_maxes(src)?;
    let dmax = band_maxes(dst)?;
    let srange = component_ranges(s, smax.len());
    let drange = component_ranges(d, dmax.len());
    let (st, w) = (src.transfer_type(), src.width());
    let (sx, sy, dx, dy) = (src.min_x(), src.min_y(), dst.min_x(), dst.min_y());

    (0..src.height()).into_par_iter().try_for_each(|y| -> Result<()> {
        let row = src.get_pixels(sx, sy + y, w, 1)?;
        let mut out = Vec::with_capacity(dmax.len() * w as usize);
        let mut norm = vec![0.0f32; smax.len()];
        for px in row.chunks(smax.len()) {
            for (k, n) in norm.iter_mut().enumerate() {
                let (lo, span) = srange[k];
                *n = (lo + magnitude(px[k], st) / smax[k] * span) as f32;
            }
            let v = d.from_ciexyz(&s.to_ciexyz(&norm));
            out.extend(dmax.iter().zip(&drange).enumerate().map(|(k, (&m, &(lo, span)))| {
                let c = f64::from(v.get(k).copied().unwrap_or(0.0));
                let unit = if span > 0.0 { (c - lo) / span } else { 0.0 };
                to_sample(unit * m, m as u32)
            }));
        }
        dst.set_pixels(dx, dy + y, w, 1, &out)
    })
}

// Image path: components go through the color models, alpha carried over.
fn convert_pixels(src_cm: &ColorModel, src: &Raster, dst_cm: &ColorModel, dst: &Raster) -> Result<()> {
    let (s, d) = (src_cm.color_space(), dst_cm.color_space());
    let snc = src_cm.num_color_components();
    let dnc = dst_cm.num_color_components();
    let (sx, sy, dx, dy) = (src.min_x(), src.min_y(), dst.min_x(), dst.min_y());

    (0..src.height()).into_par_iter().try_for_each(|y| -> Result<()> {
        for x in 0..src.width() {
            let px = src.get_data_elements(sx + x, sy + y)?;
            let norm = src_cm.get_normalized_components(&src_cm.get_components(&px)?)?;
            let alpha = if src_cm.has_alpha() { norm[snc] } else { 1.0 };
            let mut color = norm[..snc].to_vec();
            if src_cm.is_alpha_premultiplied() {
                color.iter_mut().for_each(|c| *c = if alpha == 0.0 { 0.0 } else { *c / alpha });
            }

            let mut out = d.from_ciexyz(&s.to_ciexyz(&color));
            out.resize(dnc, 0.0);
            if dst_cm.is_alpha_premultiplied() {
                out.iter_mut().for_each(|c| *c *= alpha);
            }
            if dst_cm.has_alpha() {
                out.push(alpha);
            }
            let comps = dst_cm.get_unnormalized_components(&out)?;
            dst.set_data_elements(dx + x, dy + y, &dst_cm.get_data_elements_from_components(&comps)?)?;
        }
        Ok(())
    })
}

// Leading `n` bands of `raster`.
fn color_view(raster: &Raster, n: usize) -> Result<Raster> {
    if raster.num_bands() == n {
        return Ok(raster.clone());
    }
    let b = raster.bounds();
    let bands: Vec<usize> = (0..n).collect();
    raster.create_child(b.x, b.y, b.width, b.height, b.x, b.y, Some(&bands))
}

fn transform_pixels(
    t: &dyn ColorTransform,
    src_cm: &ColorModel,
    src: &Raster,
    dst_cm: &ColorModel,
    dst: &Raster,
) -> Result<()> {
    if src_cm.is_alpha_premultiplied() || dst_cm.is_alpha_premultiplied() {
        return Err(Error::unsupported("filter", "premultiplied models with a profile transform"));
    }
    let snc = src_cm.num_color_components();
    let dnc = dst_cm.num_color_components();
    if t.num_input_components() != snc || t.num_output_components() != dnc {
        return Err(Error::format_mismatch(format!(
            "transform maps {} to {} components, models have {snc} and {dnc}",
            t.num_input_components(),
            t.num_output_components()
        )));
    }
    t.convert(&color_view(src, snc)?, &color_view(dst, dnc)?)?;
    if dst_cm.has_alpha() {
        fix_dest_alpha(src_cm, src, dst_cm, dst)?;
    }
    Ok(())
}

// Copies source alpha into the destination alpha band, shifted to its
// width, or fills it opaque when the source has none.
fn fix_dest_alpha(src_cm: &ColorModel, src: &Raster, dst_cm: &ColorModel, dst: &Raster) -> Result<()> {
    let da = dst.num_bands() - 1;
    let dbits = dst_cm.component_size(dst_cm.num_components() - 1)?;
    let (w, h) = (dst.width(), dst.height());
    if !src_cm.has_alpha() {
        let opaque = vec![max_for_bits(dbits) as i32; (w as usize) * (h as usize)];
        return dst.set_samples(dst.min_x(), dst.min_y(), w, h, da, &opaque);
    }

    let sa = src.num_bands() - 1;
    let sbits = src_cm.component_size(src_cm.num_components() - 1)?;
    let shift = i64::from(dbits) - i64::from(sbits);
    (0..h).into_par_iter().try_for_each(|y| -> Result<()> {
        let row = src.get_samples(src.min_x(), src.min_y() + y, w, 1, sa)?;
        let shifted: Vec<i32> = row
            .iter()
            .map(|&a| {
                let a = a as u32;
                (if shift >= 0 { a << shift } else { a >> -shift }) as i32
            })
            .collect();
        dst.set_samples(dst.min_x(), dst.min_y() + y, w, 1, da, &shifted)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorspace::{D50_WHITE, XYZ_MAX, cie_xyz, linear_gray, linear_rgb, srgb};
    use approx::assert_abs_diff_eq;
    use crate::index::IndexColorModel;
    use pixmodel_raster::create_banded_raster;

    fn rgb_raster(pixels: &[[i32; 3]]) -> Raster {
        let r = create_interleaved_raster(DataType::Byte, pixels.len() as i32, 1, 3, None).unwrap();
        for (x, p) in pixels.iter().enumerate() {
            r.set_pixel(x as i32, 0, p).unwrap();
        }
        r
    }

    #[test]
    fn test_srgb_to_linear() {
        let src = rgb_raster(&[[0, 0, 0], [128, 128, 128], [255, 255, 255]]);
        let dst = ColorConvertOp::new(srgb(), linear_rgb()).filter_raster(&src, None).unwrap();
        assert_eq!(dst.get_pixels(0, 0, 3, 1).unwrap(), vec![0, 0, 0, 55, 55, 55, 255, 255, 255]);
    }

    #[test]
    fn test_identity_round_trip() {
        let src = rgb_raster(&[[10, 200, 30], [255, 0, 128]]);
        let dst = ColorConvertOp::new(srgb(), srgb()).filter_raster(&src, None).unwrap();
        assert_eq!(dst.get_pixels(0, 0, 2, 1).unwrap(), src.get_pixels(0, 0, 2, 1).unwrap());
    }

    #[test]
    fn test_to_gray_and_explicit_dest() {
        let src = rgb_raster(&[[255, 255, 255], [0, 0, 0]]);
        let dst = create_banded_raster(DataType::UShort, 2, 1, 1, Some((5, 5))).unwrap();
        let out = ColorConvertOp::new(srgb(), linear_gray()).filter_raster(&src, Some(&dst)).unwrap();
        assert_eq!(out.min_x(), 5);
        assert_eq!(dst.get_samples(5, 5, 2, 1, 0).unwrap(), vec![65535, 0]);
    }

    #[test]
    fn test_xyz_samples_span_component_range() {
        let src = rgb_raster(&[[255, 255, 255]]);
        let xyz = create_interleaved_raster(DataType::UShort, 1, 1, 3, None).unwrap();
        ColorConvertOp::new(srgb(), cie_xyz()).filter_raster(&src, Some(&xyz)).unwrap();
        let px = xyz.get_pixel(0, 0).unwrap();
        for (k, white) in D50_WHITE.iter().enumerate() {
            let want = white / XYZ_MAX * 65535.0;
            assert_abs_diff_eq!(px[k] as f32, want, epsilon = 80.0);
        }

        let back = ColorConvertOp::new(cie_xyz(), srgb()).filter_raster(&xyz, None).unwrap();
        for v in back.get_pixel(0, 0).unwrap() {
            assert!(v >= 254, "white came back as {v}");
        }
    }

    #[test]
    fn test_mismatches() {
        let op = ColorConvertOp::new(srgb(), linear_gray());
        let two = create_interleaved_raster(DataType::Byte, 2, 1, 2, None).unwrap();
        assert!(op.filter_raster(&two, None).unwrap_err().is_format_mismatch());

        let src = rgb_raster(&[[1, 2, 3], [4, 5, 6]]);
        let small = create_interleaved_raster(DataType::Byte, 1, 1, 1, None).unwrap();
        assert!(op.filter_raster(&src, Some(&small)).unwrap_err().is_format_mismatch());
        let wide = create_interleaved_raster(DataType::Byte, 2, 1, 3, None).unwrap();
        assert!(op.filter_raster(&src, Some(&wide)).unwrap_err().is_format_mismatch());
    }

    #[test]
    fn test_compatible_dest_raster() {
        let src = create_interleaved_raster(DataType::UShort, 4, 3, 3, Some((2, 7))).unwrap();
        let dst = ColorConvertOp::new(srgb(), linear_gray()).create_compatible_dest_raster(&src).unwrap();
        assert_eq!((dst.min_x(), dst.min_y(), dst.width(), dst.height()), (2, 7, 4, 3));
        assert_eq!(dst.num_bands(), 1);
        assert_eq!(dst.transfer_type(), DataType::Byte);
    }

    #[test]
    fn test_filter_image_keeps_alpha() {
        let cm: ColorModel = ComponentColorModel::with_defaults(srgb(), true, false, DataType::Byte).unwrap().into();
        let src = cm.create_compatible_writable_raster(1, 1).unwrap();
        src.set_pixel(0, 0, &[128, 128, 128, 77]).unwrap();

        let (dst_cm, dst) = ColorConvertOp::new(srgb(), linear_rgb()).filter(&cm, &src, None).unwrap();
        assert!(dst_cm.has_alpha());
        assert_eq!(dst_cm.color_space().name(), linear_rgb().name());
        assert_eq!(dst.get_pixel(0, 0).unwrap(), vec![55, 55, 55, 77]);
    }

    #[test]
    fn test_filter_index_source() {
        let icm: ColorModel = IndexColorModel::new(1, 2, &[0, 255], &[0, 255], &[0, 255]).unwrap().into();
        let src = icm.create_compatible_writable_raster(2, 1).unwrap();
        src.set_samples(0, 0, 2, 1, 0, &[1, 0]).unwrap();

        let gray: ColorModel =
            ComponentColorModel::with_defaults(linear_gray(), false, false, DataType::Byte).unwrap().into();
        let dst = gray.create_compatible_writable_raster(2, 1).unwrap();
        ColorConvertOp::new(srgb(), linear_gray()).filter(&icm, &src, Some((&gray, &dst))).unwrap();
        assert_eq!(dst.get_samples(0, 0, 2, 1, 0).unwrap(), vec![255, 0]);
    }

    #[derive(Debug)]
    struct Invert;

    impl ColorTransform for Invert {
        fn num_input_components(&self) -> usize {
            3
        }

        fn num_output_components(&self) -> usize {
            3
        }

        fn convert(&self, src: &Raster, dst: &Raster) -> Result<()> {
            let px = src.get_pixels(src.min_x(), src.min_y(), src.width(), src.height())?;
            let inv: Vec<i32> = px.iter().map(|v| 255 - v).collect();
            dst.set_pixels(dst.min_x(), dst.min_y(), dst.width(), dst.height(), &inv)
        }
    }

    struct InvertEngine;

    impl TransformEngine for InvertEngine {
        type Profile = &'static str;

        fn create_transform(&self, _profiles: &[&'static str], _intent: RenderingIntent) -> Result<Arc<dyn ColorTransform>> {
            Ok(Arc::new(Invert))
        }
    }

    #[test]
    fn test_transform_stage() {
        let op = ColorConvertOp::from_profiles(&InvertEngine, &["a", "b"], RenderingIntent::Saturation).unwrap();
        assert_eq!(op.rendering_intent(), RenderingIntent::Saturation);
        assert!(op.color_spaces().is_none());
        assert!(ColorConvertOp::from_profiles(&InvertEngine, &["a"], RenderingIntent::default()).is_err());

        let src = rgb_raster(&[[0, 100, 255]]);
        let dst = op.filter_raster(&src, None).unwrap();
        assert_eq!(dst.get_pixel(0, 0).unwrap(), vec![255, 155, 0]);

        // Opaque source into a destination with alpha fills alpha opaque.
        let src_cm: ColorModel =
            ComponentColorModel::with_defaults(srgb(), false, false, DataType::Byte).unwrap().into();
        let dst_cm: ColorModel =
            ComponentColorModel::with_defaults(srgb(), true, false, DataType::Byte).unwrap().into();
        let dst = dst_cm.create_compatible_writable_raster(1, 1).unwrap();
        op.filter(&src_cm, &src, Some((&dst_cm, &dst))).unwrap();
        assert_eq!(dst.get_pixel(0, 0).unwrap(), vec![255, 155, 0, 255]);

        assert!(op.create_compatible_dest(&src_cm, &src).unwrap_err().is_config_error());
    }
}
