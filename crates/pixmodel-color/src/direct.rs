//! RGB color model with components packed by bit masks.

use std::sync::Arc;

use pixmodel_core::{DataType, Error, MaskField, Result};
use pixmodel_raster::Raster;
use tracing::debug;

use crate::colorspace::{ColorSpace, ColorSpaceFamily, srgb};
use crate::header::{Transparency, coerce_raster};
use crate::packed::PackedColorModel;

/// Packed RGB model: red, green and blue masks plus an optional alpha mask.
///
/// # Example
///
/// ```rust
/// use pixmodel_color::DirectColorModel;
///
/// let cm = DirectColorModel::new(16, 0xf800, 0x07e0, 0x001f).unwrap();
/// assert_eq!(cm.get_red(0xf800), 255);
/// assert_eq!(cm.get_rgb(0x07e0), 0xff00ff00);
/// ```
#[derive(Debug, Clone)]
pub struct DirectColorModel {
    packed: PackedColorModel,
    // sRGB, straight alpha, 8-bit fields at the standard ARGB positions
    is_argb: bool,
}

impl DirectColorModel {
    /// Opaque sRGB model.
    pub fn new(bits: u32, red_mask: u32, green_mask: u32, blue_mask: u32) -> Result<Self> {
        Self::with_alpha(bits, red_mask, green_mask, blue_mask, 0)
    }

    /// sRGB model with straight alpha. An `alpha_mask` of zero is opaque.
    ///
    /// The transfer type is the narrowest of BYTE, USHORT and INT that holds
    /// `bits`.
    pub fn with_alpha(bits: u32, red_mask: u32, green_mask: u32, blue_mask: u32, alpha_mask: u32) -> Result<Self> {
        let transfer_type = DataType::for_bits(bits)
            .ok_or_else(|| Error::invalid_config(format!("{bits} pixel bits exceed 32")))?;
        Self::with_space(srgb(), bits, [red_mask, green_mask, blue_mask], alpha_mask, false, transfer_type)
    }

    /// Model over any RGB-family space.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] for non-RGB spaces and for any mask
    /// problem reported by [`PackedColorModel::new`].
    pub fn with_space(
        color_space: Arc<dyn ColorSpace>,
        bits: u32,
        rgb_masks: [u32; 3],
        alpha_mask: u32,
        premultiplied: bool,
        transfer_type: DataType,
    ) -> Result<Self> {
        if color_space.family() != ColorSpaceFamily::Rgb {
            return Err(Error::invalid_config(format!(
                "direct color models need an RGB color space, got {}",
                color_space.name()
            )));
        }
        let transparency = if alpha_mask == 0 { Transparency::Opaque } else { Transparency::Translucent };
        let is_argb = color_space.is_srgb()
            && !premultiplied
            && rgb_masks == [0x00ff_0000, 0x0000_ff00, 0x0000_00ff]
            && alpha_mask == 0xff00_0000;
        let packed = PackedColorModel::new(
            color_space,
            bits,
            &rgb_masks,
            alpha_mask,
            premultiplied,
            transparency,
            transfer_type,
        )?;
        Ok(Self { packed, is_argb })
    }

    /// The default `0xAARRGGBB` model.
    pub(crate) fn argb() -> Self {
        Self { packed: PackedColorModel::argb(srgb()), is_argb: true }
    }

    /// Underlying bit-field model.
    pub fn packed(&self) -> &PackedColorModel {
        &self.packed
    }

    /// Red mask.
    pub fn red_mask(&self) -> u32 {
        self.packed.fields()[0].mask
    }

    /// Green mask.
    pub fn green_mask(&self) -> u32 {
        self.packed.fields()[1].mask
    }

    /// Blue mask.
    pub fn blue_mask(&self) -> u32 {
        self.packed.fields()[2].mask
    }

    /// Alpha mask, zero without alpha.
    pub fn alpha_mask(&self) -> u32 {
        self.packed.fields().get(3).map_or(0, |f| f.mask)
    }

    fn has_alpha(&self) -> bool {
        self.packed.header.has_alpha
    }

    /// Alpha of `pixel` scaled to `0..=255`, 255 without alpha.
    pub fn get_alpha(&self, pixel: u32) -> u8 {
        match self.packed.fields().get(3) {
            Some(f) => decode8(f, pixel) as u8,
            None => 255,
        }
    }

    /// Red of `pixel` as 8-bit sRGB.
    pub fn get_red(&self, pixel: u32) -> u8 {
        self.srgb_component(pixel, 0)
    }

    /// Green of `pixel` as 8-bit sRGB.
    pub fn get_green(&self, pixel: u32) -> u8 {
        self.srgb_component(pixel, 1)
    }

    /// Blue of `pixel` as 8-bit sRGB.
    pub fn get_blue(&self, pixel: u32) -> u8 {
        self.srgb_component(pixel, 2)
    }

    /// Pixel as non-premultiplied `0xAARRGGBB`.
    pub fn get_rgb(&self, pixel: u32) -> u32 {
        if self.is_argb {
            return pixel;
        }
        let [r, g, b] = self.srgb_components(pixel);
        (u32::from(self.get_alpha(pixel)) << 24) | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
    }

    fn srgb_component(&self, pixel: u32, index: usize) -> u8 {
        if self.packed.header.color_space.is_srgb() {
            self.srgb_channel(pixel, index)
        } else {
            self.srgb_components(pixel)[index]
        }
    }

    // Scaled channel of an sRGB model, decoded by truncation.
    fn srgb_channel(&self, pixel: u32, index: usize) -> u8 {
        let v = decode8(&self.packed.fields()[index], pixel);
        if self.packed.header.premultiplied {
            let a = u32::from(self.get_alpha(pixel));
            if a == 0 { 0 } else { (v * 255 / a).min(255) as u8 }
        } else {
            v.min(255) as u8
        }
    }

    fn srgb_components(&self, pixel: u32) -> [u8; 3] {
        let space = &self.packed.header.color_space;
        if space.is_srgb() {
            return [0, 1, 2].map(|i| self.srgb_channel(pixel, i));
        }
        let fields = self.packed.fields();
        let mut norm = [0.0f32; 3];
        for (i, n) in norm.iter_mut().enumerate() {
            let f = &fields[i];
            *n = if f.bits == 0 { 0.0 } else { f.extract(pixel) as f32 / f.max_value() as f32 };
        }
        if self.packed.header.premultiplied {
            let a = fields[3];
            let alpha = a.extract(pixel) as f32 / a.max_value() as f32;
            if alpha == 0.0 {
                return [0; 3];
            }
            norm.iter_mut().for_each(|n| *n /= alpha);
        }
        space.to_rgb(&norm).map(|v| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8)
    }

    /// Pixel for non-premultiplied `0xAARRGGBB`, rounded to nearest.
    pub fn get_data_element_for_rgb(&self, argb: u32) -> u32 {
        if self.is_argb {
            return argb;
        }
        let fields = self.packed.fields();
        let a8 = (argb >> 24) & 0xff;
        let alpha = if self.has_alpha() { a8 as f32 / 255.0 } else { 1.0 };
        let premul = self.packed.header.premultiplied;
        let rgb8 = [(argb >> 16) & 0xff, (argb >> 8) & 0xff, argb & 0xff];

        let norm: [f32; 3] = if self.packed.header.color_space.is_srgb() {
            rgb8.map(|c| c as f32 / 255.0)
        } else {
            let v = self.packed.header.color_space.from_rgb(&rgb8.map(|c| c as f32 / 255.0));
            std::array::from_fn(|i| v.get(i).copied().unwrap_or(0.0))
        };

        let mut pixel = 0u32;
        for (f, n) in fields.iter().zip(norm) {
            let n = if premul { n * alpha } else { n };
            pixel = f.insert(pixel, encode(n, f.max_value()));
        }
        if let Some(f) = fields.get(3) {
            pixel = f.insert(pixel, encode(alpha, f.max_value()));
        }
        pixel
    }

    /// Raw component values of `pixel`, alpha last.
    pub fn get_components(&self, pixel: u32) -> Vec<i32> {
        self.packed.components(pixel)
    }

    /// Packs raw component values into a pixel.
    pub fn get_data_element(&self, components: &[i32]) -> Result<u32> {
        self.packed.pack(components)
    }

    /// Premultiplies or un-premultiplies `raster` in place.
    ///
    /// Returns a model describing the new state. The raster's buffer is
    /// modified even though `self` is not. Models without alpha, or already
    /// in the requested state, return a clone and leave the raster alone.
    pub fn coerce_data(&self, raster: &Raster, premultiplied: bool) -> Result<Self> {
        if !self.has_alpha() || self.packed.header.premultiplied == premultiplied {
            return Ok(self.clone());
        }
        if !self.packed.is_compatible_sample_model(raster.sample_model()) {
            return Err(Error::format_mismatch("raster does not match this direct color model"));
        }
        debug!(premultiplied, "DirectColorModel::coerce_data");
        let maxes: Vec<u32> = self.packed.fields().iter().map(|f| f.max_value()).collect();
        coerce_raster(raster, &maxes, self.packed.header.transfer_type, premultiplied)?;

        let h = &self.packed.header;
        Self::with_space(
            Arc::clone(&h.color_space),
            h.pixel_bits,
            [self.red_mask(), self.green_mask(), self.blue_mask()],
            self.alpha_mask(),
            premultiplied,
            h.transfer_type,
        )
    }
}

// Field value scaled to 0..=255, truncating. Zero-width fields read 0.
fn decode8(field: &MaskField, pixel: u32) -> u32 {
    if field.bits == 0 {
        return 0;
    }
    (u64::from(field.extract(pixel)) * 255 / u64::from(field.max_value())) as u32
}

fn encode(norm: f32, max: u32) -> u32 {
    (f64::from(norm.clamp(0.0, 1.0)) * f64::from(max) + 0.5) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorspace::{cie_xyz, linear_rgb};

    #[test]
    fn test_masks() {
        let cm = DirectColorModel::with_alpha(32, 0xff0000, 0xff00, 0xff, 0xff000000).unwrap();
        assert_eq!(cm.red_mask(), 0xff0000);
        assert_eq!(cm.green_mask(), 0xff00);
        assert_eq!(cm.blue_mask(), 0xff);
        assert_eq!(cm.alpha_mask(), 0xff000000);
        assert_eq!(cm.packed().header.transfer_type, DataType::Int);

        let rgb = DirectColorModel::new(24, 0xff0000, 0xff00, 0xff).unwrap();
        assert_eq!(rgb.alpha_mask(), 0);
        assert_eq!(rgb.get_alpha(0x123456), 255);
    }

    #[test]
    fn test_non_contiguous_mask() {
        let err = DirectColorModel::new(8, 0b1010, 0b0100, 0b0001).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_argb_passthrough() {
        let cm = DirectColorModel::with_alpha(32, 0xff0000, 0xff00, 0xff, 0xff000000).unwrap();
        assert_eq!(cm.get_rgb(0x80402010), 0x80402010);
        assert_eq!(cm.get_data_element_for_rgb(0x80402010), 0x80402010);
        assert_eq!(cm.get_red(0x80402010), 0x40);
    }

    #[test]
    fn test_565() {
        let cm = DirectColorModel::new(16, 0xf800, 0x07e0, 0x001f).unwrap();
        assert_eq!(cm.packed().header.transfer_type, DataType::UShort);
        // 16/31 * 255 = 131.6, truncated on decode
        assert_eq!(cm.get_red(16 << 11), 131);
        assert_eq!(cm.get_rgb(0xffff), 0xffffffff);
        // 128/255 * 31 = 15.56, rounded on encode
        assert_eq!(cm.get_data_element_for_rgb(0xff800000), 16 << 11);
    }

    #[test]
    fn test_premultiplied_read() {
        let cm = DirectColorModel::with_space(
            srgb(),
            32,
            [0xff0000, 0xff00, 0xff],
            0xff000000,
            true,
            DataType::Int,
        )
        .unwrap();
        // a=128, r=64 -> 64*255/128 = 127
        assert_eq!(cm.get_red(0x80400000), 127);
        assert_eq!(cm.get_red(0x00400000), 0);
        assert_eq!(cm.get_data_element_for_rgb(0x80ff0000) >> 16 & 0xff, 128);
    }

    #[test]
    fn test_linear_space() {
        let cm = DirectColorModel::with_space(linear_rgb(), 24, [0xff0000, 0xff00, 0xff], 0, false, DataType::Int)
            .unwrap();
        assert_eq!(cm.get_rgb(0xffffff), 0xffffffff);
        assert_eq!(cm.get_rgb(0), 0xff000000);
        // Linear 0.5 is sRGB ~188.
        let r = cm.get_red(0x80 << 16);
        assert!((187..=189).contains(&r), "{r}");
        let px = cm.get_data_element_for_rgb(0xff808080);
        assert!(((px >> 16) & 0xff).abs_diff(55) <= 1);
    }

    #[test]
    fn test_rejects_non_rgb() {
        assert!(DirectColorModel::with_space(cie_xyz(), 24, [0xff0000, 0xff00, 0xff], 0, false, DataType::Int).is_err());
    }

    #[test]
    fn test_components() {
        let cm = DirectColorModel::with_alpha(16, 0x0f00, 0x00f0, 0x000f, 0xf000).unwrap();
        assert_eq!(cm.get_components(0x1234), vec![2, 3, 4, 1]);
        assert_eq!(cm.get_data_element(&[2, 3, 4, 1]).unwrap(), 0x1234);
    }
}
