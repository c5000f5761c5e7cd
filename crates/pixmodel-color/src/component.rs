//! Color model with one unpacked sample per component.
//!
//! Conversion to and from 8-bit sRGB picks one of four strategies when the
//! model is built:
//!
//! | Space | Transfer types | Strategy |
//! |-------|----------------|----------|
//! | sRGB | BYTE, USHORT | rescale samples to 8 bits |
//! | linear RGB | BYTE, USHORT | shared 8/16-bit LUTs |
//! | gray | BYTE, USHORT | per-model gray LUTs, luma on the way in |
//! | anything else | all | normalize and call the color space |
//!
//! Samples are read two ways. Straight components are rescaled between bit
//! depths with truncating integer math. Premultiplied components are divided
//! by alpha in floating point and rounded to nearest. Both behaviors are
//! observable and covered by tests.

use std::fmt;
use std::sync::Arc;

use pixmodel_core::{DataType, Error, Result, TransferData};
use pixmodel_raster::{Raster, create_interleaved_raster};
use pixmodel_sample::{PixelInterleavedSampleModel, SampleModel};
use pixmodel_transfer::{TransferCurve, lut};
use tracing::debug;

use crate::colorspace::{ColorSpace, ColorSpaceFamily, StandardSpace};
use crate::header::{Header, Transparency, coerce_raster, magnitude, max_for_bits, to_sample};

#[derive(Clone)]
enum FastPath {
    Srgb,
    LinearRgb { precision: u32 },
    Gray { precision: u32, to_srgb8: Arc<[u8]>, from_linear16: Arc<[u16]> },
    Generic,
}

impl fmt::Debug for FastPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Srgb => f.write_str("Srgb"),
            Self::LinearRgb { precision } => write!(f, "LinearRgb({precision})"),
            Self::Gray { precision, .. } => write!(f, "Gray({precision})"),
            Self::Generic => f.write_str("Generic"),
        }
    }
}

impl FastPath {
    fn select(space: &dyn ColorSpace, transfer_type: DataType) -> Self {
        let precision = match transfer_type {
            DataType::Byte => 8,
            DataType::UShort => 16,
            _ => return Self::Generic,
        };
        match space.standard() {
            Some(StandardSpace::Srgb) => Self::Srgb,
            Some(StandardSpace::LinearRgb) => Self::LinearRgb { precision },
            Some(StandardSpace::Gray { gamma }) => Self::Gray {
                precision,
                to_srgb8: Arc::from(lut::to_srgb8_table(TransferCurve::Gamma(gamma), precision)),
                from_linear16: Arc::from(lut::from_linear16_table(TransferCurve::Gamma(gamma), 16)),
            },
            _ => Self::Generic,
        }
    }
}

/// Color model storing each color and alpha component in its own sample.
///
/// # Example
///
/// ```rust
/// use pixmodel_color::{ComponentColorModel, colorspace};
/// use pixmodel_core::DataType;
///
/// let cm = ComponentColorModel::with_defaults(colorspace::srgb(), true, false, DataType::Byte).unwrap();
/// let px = cm.get_data_elements(0x80ff4000);
/// assert_eq!(px.to_i32s(), vec![255, 64, 0, 128]);
/// assert_eq!(cm.get_rgb(&px).unwrap(), 0x80ff4000);
/// ```
#[derive(Debug, Clone)]
pub struct ComponentColorModel {
    header: Header,
    maxes: Vec<u32>,
    path: FastPath,
}

impl ComponentColorModel {
    /// Creates a component model.
    ///
    /// `bits` gives the significant bits of every component (color first,
    /// alpha last); `None` uses the full width of `transfer_type`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] if the bit count list has the wrong
    /// length, a component is wider than the transfer type or zero bits wide,
    /// or a translucent or bitmask model has no alpha.
    pub fn new(
        color_space: Arc<dyn ColorSpace>,
        bits: Option<&[u32]>,
        has_alpha: bool,
        premultiplied: bool,
        transparency: Transparency,
        transfer_type: DataType,
    ) -> Result<Self> {
        let n = color_space.num_components() + usize::from(has_alpha);
        let bits = match bits {
            Some(b) if b.len() != n => {
                return Err(Error::invalid_config(format!("{} bit counts for {n} components", b.len())));
            }
            Some(b) => b.to_vec(),
            None => vec![transfer_type.bits(); n],
        };
        if let Some(&b) = bits.iter().find(|&&b| b == 0 || b > transfer_type.bits()) {
            return Err(Error::invalid_config(format!(
                "component of {b} bits does not fit a {} sample",
                transfer_type.name()
            )));
        }
        let maxes = bits
            .iter()
            .map(|&b| match transfer_type {
                DataType::Short => max_for_bits(b).min(i16::MAX as u32),
                _ => max_for_bits(b),
            })
            .collect();

        let path = FastPath::select(color_space.as_ref(), transfer_type);
        let header = Header {
            color_space,
            pixel_bits: bits.iter().sum(),
            bits,
            has_alpha,
            premultiplied: premultiplied && has_alpha,
            transparency,
            transfer_type,
        };
        header.validate()?;
        debug!(
            space = header.color_space.name(),
            bits = ?header.bits,
            has_alpha,
            transfer_type = transfer_type.name(),
            path = ?path,
            "ComponentColorModel::new"
        );
        Ok(Self { header, maxes, path })
    }

    /// Full-width components, translucent when `has_alpha`.
    pub fn with_defaults(
        color_space: Arc<dyn ColorSpace>,
        has_alpha: bool,
        premultiplied: bool,
        transfer_type: DataType,
    ) -> Result<Self> {
        let transparency = if has_alpha { Transparency::Translucent } else { Transparency::Opaque };
        Self::new(color_space, None, has_alpha, premultiplied, transparency, transfer_type)
    }

    pub(crate) fn header(&self) -> &Header {
        &self.header
    }

    fn alpha_index(&self) -> usize {
        self.header.num_color_components()
    }

    /// Component `idx` rescaled to `precision` bits.
    ///
    /// Straight components use truncating integer rescaling. Premultiplied
    /// color components are divided by alpha and rounded to nearest; a zero
    /// alpha yields 0.
    fn extract_component(&self, samples: &[i32], idx: usize, precision: u32) -> u32 {
        let dt = self.header.transfer_type;
        let cmax = u64::from(self.maxes[idx]);
        let pmax = u64::from(max_for_bits(precision));
        let comp = (magnitude(samples[idx], dt) as u64).min(cmax);

        let ai = self.alpha_index();
        if self.header.premultiplied && idx < ai {
            let amax = u64::from(self.maxes[ai]);
            let alp = (magnitude(samples[ai], dt) as u64).min(amax);
            if alp == 0 {
                return 0;
            }
            let v = (comp as f64 / cmax as f64) / (alp as f64 / amax as f64) * pmax as f64 + 0.5;
            return (v as u64).min(pmax) as u32;
        }
        if cmax == pmax { comp as u32 } else { (comp * pmax / cmax) as u32 }
    }

    // Components scaled to [0, 1], premultiplication untouched.
    fn unit_components(&self, samples: &[i32]) -> Vec<f32> {
        let dt = self.header.transfer_type;
        samples
            .iter()
            .zip(&self.maxes)
            .map(|(&s, &m)| (magnitude(s, dt) / f64::from(m)).min(1.0) as f32)
            .collect()
    }

    fn generic_rgb(&self, samples: &[i32]) -> [u8; 3] {
        let space = &self.header.color_space;
        let nc = self.header.num_color_components();
        let mut unit = self.unit_components(samples);
        if self.header.premultiplied {
            let a = unit[nc];
            if a == 0.0 {
                return [0; 3];
            }
            unit[..nc].iter_mut().for_each(|c| *c = (*c / a).min(1.0));
        }
        let norm: Vec<f32> = (0..nc)
            .map(|i| {
                let (lo, hi) = (space.min_value(i), space.max_value(i));
                lo + unit[i] * (hi - lo)
            })
            .collect();
        space.to_rgb(&norm).map(|v| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8)
    }

    fn rgb_components(&self, samples: &[i32]) -> [u8; 3] {
        match &self.path {
            FastPath::Srgb => [0, 1, 2].map(|i| self.extract_component(samples, i, 8) as u8),
            FastPath::LinearRgb { precision } => {
                let table = if *precision == 8 { lut::linear8_to_srgb8() } else { lut::linear16_to_srgb8() };
                [0, 1, 2].map(|i| table[self.extract_component(samples, i, *precision) as usize])
            }
            FastPath::Gray { precision, to_srgb8, .. } => {
                let v = to_srgb8[self.extract_component(samples, 0, *precision) as usize];
                [v; 3]
            }
            FastPath::Generic => self.generic_rgb(samples),
        }
    }

    fn alpha8(&self, samples: &[i32]) -> u8 {
        if self.header.has_alpha {
            self.extract_component(samples, self.alpha_index(), 8) as u8
        } else {
            255
        }
    }

    fn samples_of(&self, pixel: &TransferData) -> Result<Vec<i32>> {
        self.header.components_of(pixel)
    }

    /// Red of a native pixel as 8-bit sRGB.
    pub fn get_red(&self, pixel: &TransferData) -> Result<u8> {
        Ok(self.rgb_components(&self.samples_of(pixel)?)[0])
    }

    /// Green of a native pixel as 8-bit sRGB.
    pub fn get_green(&self, pixel: &TransferData) -> Result<u8> {
        Ok(self.rgb_components(&self.samples_of(pixel)?)[1])
    }

    /// Blue of a native pixel as 8-bit sRGB.
    pub fn get_blue(&self, pixel: &TransferData) -> Result<u8> {
        Ok(self.rgb_components(&self.samples_of(pixel)?)[2])
    }

    /// Alpha of a native pixel scaled to `0..=255`.
    pub fn get_alpha(&self, pixel: &TransferData) -> Result<u8> {
        Ok(self.alpha8(&self.samples_of(pixel)?))
    }

    /// Native pixel as non-premultiplied `0xAARRGGBB`.
    pub fn get_rgb(&self, pixel: &TransferData) -> Result<u32> {
        let samples = self.samples_of(pixel)?;
        Ok(pack_argb(self.alpha8(&samples), self.rgb_components(&samples)))
    }

    /// `0xAARRGGBB` of a single-component pixel.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedOperation`] for models with more than one component.
    pub fn get_rgb_of(&self, pixel: u32) -> Result<u32> {
        if self.header.num_components() != 1 {
            return Err(Error::unsupported(
                "get_rgb_of",
                "more than one component per pixel",
            ));
        }
        let samples = [pixel as i32];
        Ok(pack_argb(self.alpha8(&samples), self.rgb_components(&samples)))
    }

    /// Native pixel for non-premultiplied `0xAARRGGBB`.
    pub fn get_data_elements(&self, argb: u32) -> TransferData {
        TransferData::from_i32s(self.header.transfer_type, &self.samples_for_rgb(argb))
    }

    fn samples_for_rgb(&self, argb: u32) -> Vec<i32> {
        let n = self.header.num_components();
        let nc = self.header.num_color_components();
        let mut out = vec![0i32; n];
        let a8 = (argb >> 24) & 0xff;
        let rgb8 = [(argb >> 16) & 0xff, (argb >> 8) & 0xff, argb & 0xff];

        let mut factor = 1.0f64;
        if self.header.has_alpha {
            let alpha = f64::from(a8) / 255.0;
            out[nc] = to_sample(alpha * f64::from(self.maxes[nc]), self.maxes[nc]);
            if self.header.premultiplied {
                factor = alpha;
            }
        }
        let put = |out: &mut [i32], i: usize, unit: f64| {
            out[i] = to_sample(unit * factor * f64::from(self.maxes[i]), self.maxes[i]);
        };

        match &self.path {
            FastPath::Srgb => {
                for (i, &c) in rgb8.iter().enumerate() {
                    put(&mut out, i, f64::from(c) / 255.0);
                }
            }
            FastPath::LinearRgb { precision } => {
                for (i, &c) in rgb8.iter().enumerate() {
                    let unit = if *precision == 8 {
                        f64::from(lut::srgb8_to_linear8()[c as usize]) / 255.0
                    } else {
                        f64::from(lut::srgb8_to_linear16()[c as usize]) / 65535.0
                    };
                    put(&mut out, i, unit);
                }
            }
            FastPath::Gray { from_linear16, .. } => {
                let [r, g, b] = rgb8.map(|c| c as u8);
                let y = from_linear16[lut::luminance16(r, g, b) as usize];
                put(&mut out, 0, f64::from(y) / 65535.0);
            }
            FastPath::Generic => {
                let space = &self.header.color_space;
                let norm = space.from_rgb(&rgb8.map(|c| c as f32 / 255.0));
                for i in 0..nc {
                    let (lo, hi) = (space.min_value(i), space.max_value(i));
                    let v = norm.get(i).copied().unwrap_or(lo);
                    put(&mut out, i, f64::from((v - lo) / (hi - lo)));
                }
            }
        }
        out
    }

    /// Raw sample values of a native pixel.
    pub fn get_components(&self, pixel: &TransferData) -> Result<Vec<i32>> {
        self.samples_of(pixel)
    }

    /// Native pixel holding raw sample values.
    pub fn get_data_elements_from_components(&self, components: &[i32]) -> Result<TransferData> {
        let n = self.header.num_components();
        if components.len() < n {
            return Err(Error::out_of_range("components", components.len() as i64, n as i64));
        }
        Ok(TransferData::from_i32s(self.header.transfer_type, &components[..n]))
    }

    /// Raw samples mapped into each component's color space range; alpha
    /// maps onto `[0, 1]`.
    pub fn get_normalized_components(&self, components: &[i32]) -> Result<Vec<f32>> {
        let n = self.header.num_components();
        if components.len() < n {
            return Err(Error::out_of_range("components", components.len() as i64, n as i64));
        }
        let nc = self.header.num_color_components();
        let space = &self.header.color_space;
        let mut unit = self.unit_components(&components[..n]);
        for (i, v) in unit.iter_mut().enumerate().take(nc) {
            let (lo, hi) = (space.min_value(i), space.max_value(i));
            *v = lo + *v * (hi - lo);
        }
        Ok(unit)
    }

    /// Inverse of [`Self::get_normalized_components`], rounded to nearest.
    pub fn get_unnormalized_components(&self, normalized: &[f32]) -> Result<Vec<i32>> {
        let n = self.header.num_components();
        if normalized.len() < n {
            return Err(Error::out_of_range("components", normalized.len() as i64, n as i64));
        }
        let nc = self.header.num_color_components();
        let space = &self.header.color_space;
        Ok((0..n)
            .map(|i| {
                let unit = if i < nc {
                    let (lo, hi) = (space.min_value(i), space.max_value(i));
                    (normalized[i] - lo) / (hi - lo)
                } else {
                    normalized[i]
                };
                to_sample(f64::from(unit) * f64::from(self.maxes[i]), self.maxes[i])
            })
            .collect())
    }

    /// Premultiplies or un-premultiplies `raster` in place.
    ///
    /// Returns a model describing the new state; `self` is unchanged. Zero
    /// alpha forces the color samples to 0 either way. Models without alpha,
    /// or already in the requested state, return a clone and leave the
    /// raster alone.
    ///
    /// # Errors
    ///
    /// [`Error::FormatMismatch`] if the raster is not compatible.
    pub fn coerce_data(&self, raster: &Raster, premultiplied: bool) -> Result<Self> {
        if !self.header.has_alpha || self.header.premultiplied == premultiplied {
            return Ok(self.clone());
        }
        if !self.is_compatible_raster(raster) {
            return Err(Error::format_mismatch("raster does not match this component color model"));
        }
        debug!(premultiplied, bands = raster.num_bands(), "ComponentColorModel::coerce_data");
        coerce_raster(raster, &self.maxes, self.header.transfer_type, premultiplied)?;
        let mut out = self.clone();
        out.header.premultiplied = premultiplied;
        Ok(out)
    }

    /// True when `raster` has one component sample per band of sufficient width.
    pub fn is_compatible_raster(&self, raster: &Raster) -> bool {
        self.is_compatible_sample_model(raster.sample_model())
    }

    /// True for component sample models with matching band count, transfer
    /// type, and samples at least as wide as the components.
    pub fn is_compatible_sample_model(&self, sm: &SampleModel) -> bool {
        sm.as_component().is_some()
            && sm.num_bands() == self.header.num_components()
            && sm.transfer_type() == self.header.transfer_type
            && self
                .header
                .bits
                .iter()
                .enumerate()
                .all(|(i, &b)| sm.sample_size(i).is_ok_and(|s| s >= b))
    }

    /// Pixel-interleaved raster with one band per component.
    pub fn create_compatible_writable_raster(&self, width: i32, height: i32) -> Result<Raster> {
        create_interleaved_raster(self.header.transfer_type, width, height, self.header.num_components(), None)
    }

    /// Pixel-interleaved sample model with band offsets `0..n`.
    pub fn create_compatible_sample_model(&self, width: i32, height: i32) -> Result<SampleModel> {
        let n = self.header.num_components() as i32;
        let stride = width
            .checked_mul(n)
            .ok_or_else(|| Error::invalid_config(format!("scanline of {width} x {n} samples overflows")))?;
        let sm = PixelInterleavedSampleModel::new(self.header.transfer_type, width, height, n, stride, (0..n).collect())?;
        Ok(sm.into())
    }

    /// Single-band child of `raster` over the alpha band, `None` without alpha.
    pub fn alpha_raster(&self, raster: &Raster) -> Result<Option<Raster>> {
        if !self.header.has_alpha {
            return Ok(None);
        }
        alpha_child(raster).map(Some)
    }

    /// True when the color space is gray.
    pub fn is_gray(&self) -> bool {
        self.header.color_space.family() == ColorSpaceFamily::Gray
    }
}

pub(crate) fn alpha_child(raster: &Raster) -> Result<Raster> {
    let b = raster.bounds();
    let last = raster.num_bands().saturating_sub(1);
    raster.create_child(b.x, b.y, b.width, b.height, b.x, b.y, Some(&[last]))
}

#[inline]
pub(crate) fn pack_argb(a: u8, [r, g, b]: [u8; 3]) -> u32 {
    (u32::from(a) << 24) | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorspace::{cie_xyz, gray, linear_gray, linear_rgb, srgb, XYZ_MAX};
    use approx::assert_abs_diff_eq;

    fn px(dt: DataType, v: &[i32]) -> TransferData {
        TransferData::from_i32s(dt, v)
    }

    #[test]
    fn test_srgb_byte() {
        let cm = ComponentColorModel::with_defaults(srgb(), true, false, DataType::Byte).unwrap();
        assert_eq!(cm.header().pixel_bits, 32);
        let p = px(DataType::Byte, &[10, 20, 30, 40]);
        assert_eq!(cm.get_rgb(&p).unwrap(), 0x280a141e);
        assert_eq!(cm.get_data_elements(0x280a141e).to_i32s(), vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_srgb_ushort() {
        let cm = ComponentColorModel::with_defaults(srgb(), false, false, DataType::UShort).unwrap();
        let p = px(DataType::UShort, &[65535, 0x8080, 0]);
        assert_eq!(cm.get_rgb(&p).unwrap(), 0xffff8000);
        assert_eq!(cm.get_data_elements(0xffff8000).to_i32s(), vec![65535, 0x8080, 0]);
    }

    #[test]
    fn test_straight_rescale_truncates() {
        let cm = ComponentColorModel::new(srgb(), Some(&[5, 5, 5]), false, false, Transparency::Opaque, DataType::Byte)
            .unwrap();
        // 12 * 255 / 31 = 98.7
        assert_eq!(cm.get_red(&px(DataType::Byte, &[12, 0, 0])).unwrap(), 98);
        assert_eq!(cm.get_red(&px(DataType::Byte, &[31, 0, 0])).unwrap(), 255);
    }

    #[test]
    fn test_premultiplied_rescale_rounds() {
        let cm = ComponentColorModel::with_defaults(srgb(), true, true, DataType::Byte).unwrap();
        // 100 / 180 * 255 = 141.67
        assert_eq!(cm.get_red(&px(DataType::Byte, &[100, 0, 0, 180])).unwrap(), 142);
        assert_eq!(cm.get_red(&px(DataType::Byte, &[100, 0, 0, 0])).unwrap(), 0);
        assert_eq!(cm.get_alpha(&px(DataType::Byte, &[100, 0, 0, 180])).unwrap(), 180);
        assert_eq!(cm.get_data_elements(0x80ff0000).to_i32s(), vec![128, 0, 0, 128]);
    }

    #[test]
    fn test_linear_rgb_luts() {
        let cm = ComponentColorModel::with_defaults(linear_rgb(), false, false, DataType::Byte).unwrap();
        assert_eq!(cm.get_red(&px(DataType::Byte, &[128, 0, 0])).unwrap(), 188);
        assert_eq!(cm.get_data_elements(0xff808080).to_i32s(), vec![55, 55, 55]);

        let cm16 = ComponentColorModel::with_defaults(linear_rgb(), false, false, DataType::UShort).unwrap();
        assert_eq!(cm16.get_rgb(&px(DataType::UShort, &[65535, 0, 65535])).unwrap(), 0xffff00ff);
        let back = cm16.get_data_elements(0xff808080).to_i32s();
        assert_eq!(back[0], i32::from(lut::srgb8_to_linear16()[128]));
    }

    #[test]
    fn test_gray() {
        let cm = ComponentColorModel::with_defaults(linear_gray(), false, false, DataType::Byte).unwrap();
        assert!(cm.is_gray());
        assert_eq!(cm.get_rgb(&px(DataType::Byte, &[128])).unwrap(), 0xffbcbcbc);
        assert_eq!(cm.get_rgb_of(128).unwrap(), 0xffbcbcbc);
        assert_eq!(cm.get_data_elements(0xffffffff).to_i32s(), vec![255]);
        assert_eq!(cm.get_data_elements(0xff000000).to_i32s(), vec![0]);

        let g22 = ComponentColorModel::with_defaults(gray(2.2).unwrap(), true, false, DataType::UShort).unwrap();
        assert_eq!(g22.get_rgb(&px(DataType::UShort, &[65535, 65535])).unwrap(), 0xffffffff);
        let mid = g22.get_data_elements(0xff808080).to_i32s();
        // sRGB mid gray is ~21.6% luminance, about 0.498 at gamma 2.2.
        assert!((mid[0] - 32640).abs() < 700, "{mid:?}");
    }

    #[test]
    fn test_generic_xyz() {
        let cm = ComponentColorModel::with_defaults(cie_xyz(), false, false, DataType::UShort).unwrap();
        for argb in [0xffffffffu32, 0xff000000, 0xff336699, 0xffc08040] {
            let back = cm.get_rgb(&cm.get_data_elements(argb)).unwrap();
            for shift in [0, 8, 16] {
                let (a, b) = ((argb >> shift) & 0xff, (back >> shift) & 0xff);
                assert!(a.abs_diff(b) <= 1, "{argb:08x} -> {back:08x}");
            }
        }
        let norm = cm.get_normalized_components(&[65535, 0, 0]).unwrap();
        assert_abs_diff_eq!(norm[0], XYZ_MAX, epsilon = 1e-5);
        assert_eq!(cm.get_unnormalized_components(&norm).unwrap(), vec![65535, 0, 0]);
    }

    #[test]
    fn test_int_transfer_is_generic() {
        let cm = ComponentColorModel::with_defaults(srgb(), false, false, DataType::Int).unwrap();
        assert_eq!(cm.header().bits, vec![32, 32, 32]);
        assert_eq!(cm.get_red(&px(DataType::Int, &[-1, 0, 0])).unwrap(), 255);
        assert_eq!(cm.get_data_elements(0xffff0000).to_i32s(), vec![-1, 0, 0]);
    }

    #[test]
    fn test_short_transfer() {
        let cm = ComponentColorModel::with_defaults(srgb(), false, false, DataType::Short).unwrap();
        assert_eq!(cm.get_red(&px(DataType::Short, &[32767, 0, 0])).unwrap(), 255);
        assert_eq!(cm.get_red(&px(DataType::Short, &[-5, 0, 0])).unwrap(), 0);
        assert_eq!(cm.get_data_elements(0xffff0000).to_i32s()[0], 32767);
    }

    #[test]
    fn test_construction_errors() {
        let e = ComponentColorModel::new(srgb(), Some(&[8, 8]), false, false, Transparency::Opaque, DataType::Byte);
        assert!(e.unwrap_err().is_config_error());
        let e = ComponentColorModel::new(srgb(), Some(&[8, 9, 8]), false, false, Transparency::Opaque, DataType::Byte);
        assert!(e.unwrap_err().is_config_error());
        let e = ComponentColorModel::new(srgb(), Some(&[8, 0, 8]), false, false, Transparency::Opaque, DataType::Byte);
        assert!(e.unwrap_err().is_config_error());
        let e = ComponentColorModel::new(srgb(), None, false, false, Transparency::Translucent, DataType::Byte);
        assert!(e.unwrap_err().is_config_error());
    }

    #[test]
    fn test_shape_checks() {
        let cm = ComponentColorModel::with_defaults(srgb(), true, false, DataType::Byte).unwrap();
        assert!(cm.get_rgb(&px(DataType::Byte, &[1, 2, 3])).is_err());
        assert!(cm.get_rgb(&px(DataType::UShort, &[1, 2, 3, 4])).is_err());
        assert!(cm.get_rgb_of(7).unwrap_err().is_unsupported());
        assert!(cm.get_data_elements_from_components(&[1, 2]).is_err());
        assert_eq!(cm.get_data_elements_from_components(&[1, 2, 3, 4, 5]).unwrap().len(), 4);
    }

    #[test]
    fn test_coerce_data() {
        let cm = ComponentColorModel::with_defaults(srgb(), true, false, DataType::Byte).unwrap();
        let r = cm.create_compatible_writable_raster(3, 1).unwrap();
        r.set_pixels(0, 0, 3, 1, &[200, 100, 50, 128, 10, 20, 30, 0, 255, 255, 255, 255]).unwrap();

        let pre = cm.coerce_data(&r, true).unwrap();
        assert!(pre.header().premultiplied);
        assert!(!cm.header().premultiplied);
        assert_eq!(r.get_pixel(0, 0).unwrap(), vec![100, 50, 25, 128]);
        assert_eq!(r.get_pixel(1, 0).unwrap(), vec![0, 0, 0, 0]);

        let straight = pre.coerce_data(&r, false).unwrap();
        assert!(!straight.header().premultiplied);
        let p = r.get_pixel(0, 0).unwrap();
        for (a, b) in p.iter().zip([200, 100, 50, 128]) {
            assert!((a - b).abs() <= 1, "{p:?}");
        }
        assert_eq!(r.get_pixel(2, 0).unwrap(), vec![255, 255, 255, 255]);

        // Same state is a no-op.
        let same = cm.coerce_data(&r, false).unwrap();
        assert!(!same.header().premultiplied);
    }

    #[test]
    fn test_compatibility() {
        let cm = ComponentColorModel::with_defaults(srgb(), true, false, DataType::Byte).unwrap();
        let r = cm.create_compatible_writable_raster(4, 4).unwrap();
        assert!(cm.is_compatible_raster(&r));
        let sm = cm.create_compatible_sample_model(5, 2).unwrap();
        assert!(cm.is_compatible_sample_model(&sm));
        assert_eq!(sm.num_bands(), 4);
        assert_eq!(sm.as_component().unwrap().band_offsets(), &[0, 1, 2, 3]);

        let three = create_interleaved_raster(DataType::Byte, 4, 4, 3, None).unwrap();
        assert!(!cm.is_compatible_raster(&three));
        let wide = create_interleaved_raster(DataType::UShort, 4, 4, 4, None).unwrap();
        assert!(!cm.is_compatible_raster(&wide));
        assert!(cm.coerce_data(&three, true).unwrap_err().is_format_mismatch());
    }

    #[test]
    fn test_alpha_raster() {
        let cm = ComponentColorModel::with_defaults(srgb(), true, false, DataType::Byte).unwrap();
        let r = cm.create_compatible_writable_raster(2, 2).unwrap();
        r.set_pixel(1, 1, &[1, 2, 3, 77]).unwrap();
        let a = cm.alpha_raster(&r).unwrap().unwrap();
        assert_eq!(a.num_bands(), 1);
        assert_eq!(a.get_sample(1, 1, 0).unwrap(), 77);

        let opaque = ComponentColorModel::with_defaults(srgb(), false, false, DataType::Byte).unwrap();
        assert!(opaque.alpha_raster(&r).unwrap().is_none());
    }
}
