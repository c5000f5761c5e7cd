//! [`TransformEngine`] backed by Little CMS.

use std::sync::Arc;

use lcms2::{PixelFormat, Profile as LcmsProfile, Transform as LcmsTransform};
use pixmodel_color::{ColorTransform, RenderingIntent, TransformEngine};
use pixmodel_core::{DataType, Error, Result};
use pixmodel_raster::Raster;
use tracing::{debug, trace};

use crate::{IccError, IccProfile, IccResult, ProfileKind};

type RgbTransform = LcmsTransform<[f32; 3], [f32; 3]>;

fn lcms_intent(intent: RenderingIntent) -> lcms2::Intent {
    match intent {
        RenderingIntent::Perceptual => lcms2::Intent::Perceptual,
        RenderingIntent::RelativeColorimetric => lcms2::Intent::RelativeColorimetric,
        RenderingIntent::Saturation => lcms2::Intent::Saturation,
        RenderingIntent::AbsoluteColorimetric => lcms2::Intent::AbsoluteColorimetric,
    }
}

/// Chains RGB ICC profiles with lcms2.
///
/// # Example
///
/// ```rust
/// use pixmodel_color::{ColorConvertOp, RenderingIntent};
/// use pixmodel_core::DataType;
/// use pixmodel_icc::{IccProfile, LcmsEngine};
/// use pixmodel_raster::create_interleaved_raster;
///
/// let profiles = [IccProfile::srgb(), IccProfile::linear_srgb().unwrap()];
/// let op = ColorConvertOp::from_profiles(&LcmsEngine, &profiles, RenderingIntent::Perceptual).unwrap();
///
/// let src = create_interleaved_raster(DataType::Byte, 1, 1, 3, None).unwrap();
/// src.set_pixel(0, 0, &[255, 255, 255]).unwrap();
/// let dst = op.filter_raster(&src, None).unwrap();
/// assert!(dst.get_pixel(0, 0).unwrap().iter().all(|&v| v >= 254));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LcmsEngine;

impl TransformEngine for LcmsEngine {
    type Profile = IccProfile;

    fn create_transform(&self, profiles: &[IccProfile], intent: RenderingIntent) -> Result<Arc<dyn ColorTransform>> {
        if profiles.len() < 2 {
            return Err(Error::invalid_config("an ICC transform needs at least two profiles"));
        }
        if let Some((index, p)) = profiles.iter().enumerate().find(|(_, p)| p.kind() != ProfileKind::Rgb) {
            return Err(IccError::NotRgb { index, actual: p.signature() }.into());
        }
        let chain = ProfileChain {
            profiles: profiles.iter().map(IccProfile::to_bytes).collect::<IccResult<_>>()?,
            intent,
        };
        // surfaces unreadable profiles here instead of in convert
        chain.build()?;
        debug!(profiles = profiles.len(), ?intent, "LcmsEngine::create_transform");
        Ok(Arc::new(chain))
    }
}

/// Serialized profile sequence. The lcms2 handles are rebuilt for every
/// conversion.
#[derive(Debug, Clone)]
struct ProfileChain {
    profiles: Vec<Vec<u8>>,
    intent: RenderingIntent,
}

impl ProfileChain {
    fn build(&self) -> IccResult<Vec<RgbTransform>> {
        let handles = self
            .profiles
            .iter()
            .map(|b| LcmsProfile::new_icc(b).map_err(|e| IccError::InvalidProfile(e.to_string())))
            .collect::<IccResult<Vec<_>>>()?;
        handles
            .windows(2)
            .map(|pair| {
                LcmsTransform::new(
                    &pair[0],
                    PixelFormat::RGB_FLT,
                    &pair[1],
                    PixelFormat::RGB_FLT,
                    lcms_intent(self.intent),
                )
                .map_err(|e| IccError::TransformFailed(e.to_string()))
            })
            .collect()
    }
}

fn band_maxes(raster: &Raster) -> Result<[f32; 3]> {
    let mut out = [0.0; 3];
    for (b, m) in out.iter_mut().enumerate() {
        let bits = raster.sample_model().sample_size(b)?;
        *m = if bits >= 32 { u32::MAX as f32 } else { ((1u64 << bits) - 1) as f32 };
    }
    Ok(out)
}

fn unit(sample: i32, data_type: DataType, max: f32) -> f32 {
    let v = match data_type {
        DataType::Short => sample.max(0) as f32,
        _ => sample as u32 as f32,
    };
    v / max
}

impl ColorTransform for ProfileChain {
    fn num_input_components(&self) -> usize {
        3
    }

    fn num_output_components(&self) -> usize {
        3
    }

    fn convert(&self, src: &Raster, dst: &Raster) -> Result<()> {
        if src.num_bands() != 3 || dst.num_bands() != 3 {
            return Err(Error::format_mismatch(format!(
                "ICC transforms convert 3-band rasters, got {} and {}",
                src.num_bands(),
                dst.num_bands()
            )));
        }
        if src.width() != dst.width() || src.height() != dst.height() {
            return Err(Error::format_mismatch("raster sizes differ"));
        }
        let transforms = self.build()?;
        let (smax, dmax) = (band_maxes(src)?, band_maxes(dst)?);
        let (w, h, st) = (src.width(), src.height(), src.transfer_type());
        trace!(width = w, height = h, stages = transforms.len(), "ProfileChain::convert");

        let samples = src.get_pixels(src.min_x(), src.min_y(), w, h)?;
        let mut pixels: Vec<[f32; 3]> = samples
            .chunks_exact(3)
            .map(|px| [0, 1, 2].map(|k| unit(px[k], st, smax[k])))
            .collect();
        for t in &transforms {
            t.transform_in_place(&mut pixels);
        }
        let out: Vec<i32> = pixels
            .iter()
            .flat_map(|px| (0..3).map(move |k| (px[k].clamp(0.0, 1.0) * dmax[k] + 0.5).min(dmax[k]) as u32 as i32))
            .collect();
        dst.set_pixels(dst.min_x(), dst.min_y(), w, h, &out)
    }
}
