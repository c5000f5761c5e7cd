//! The [`ColorModel`] sum type.
//!
//! Every model kind shares the same header (color space, per-component bit
//! widths, alpha and transparency flags, transfer type). This module
//! dispatches the common operations to the concrete models and fills in the
//! defaults for the ones a model does not specialise.

use std::sync::{Arc, OnceLock};

use pixmodel_core::{DataType, Error, Result, TransferData};
use pixmodel_raster::Raster;
use pixmodel_sample::SampleModel;

use crate::colorspace::ColorSpace;
use crate::component::{ComponentColorModel, alpha_child};
use crate::direct::DirectColorModel;
use crate::header::{Header, Transparency, max_for_bits, to_sample};
use crate::index::IndexColorModel;

/// Translates between native pixels and colors.
#[derive(Debug, Clone)]
pub enum ColorModel {
    /// One sample per component.
    Component(ComponentColorModel),
    /// All components packed into one element with bit masks.
    Direct(DirectColorModel),
    /// Palette lookup.
    Index(IndexColorModel),
}

impl From<ComponentColorModel> for ColorModel {
    fn from(cm: ComponentColorModel) -> Self {
        Self::Component(cm)
    }
}

impl From<DirectColorModel> for ColorModel {
    fn from(cm: DirectColorModel) -> Self {
        Self::Direct(cm)
    }
}

impl From<IndexColorModel> for ColorModel {
    fn from(cm: IndexColorModel) -> Self {
        Self::Index(cm)
    }
}

impl ColorModel {
    /// Process-wide 32-bit `0xAARRGGBB` sRGB model.
    ///
    /// ```rust
    /// use pixmodel_color::ColorModel;
    ///
    /// let cm = ColorModel::rgb_default();
    /// assert_eq!(cm.pixel_size(), 32);
    /// assert_eq!(cm.get_rgb_packed(0x80123456).unwrap(), 0x80123456);
    /// ```
    pub fn rgb_default() -> &'static ColorModel {
        static DEFAULT: OnceLock<ColorModel> = OnceLock::new();
        DEFAULT.get_or_init(|| ColorModel::Direct(DirectColorModel::argb()))
    }

    /// Short name of the model kind, for logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Component(_) => "component",
            Self::Direct(_) => "direct",
            Self::Index(_) => "index",
        }
    }

    /// The component model, if this is one.
    pub fn as_component(&self) -> Option<&ComponentColorModel> {
        match self {
            Self::Component(cm) => Some(cm),
            _ => None,
        }
    }

    /// The direct model, if this is one.
    pub fn as_direct(&self) -> Option<&DirectColorModel> {
        match self {
            Self::Direct(cm) => Some(cm),
            _ => None,
        }
    }

    /// The index model, if this is one.
    pub fn as_index(&self) -> Option<&IndexColorModel> {
        match self {
            Self::Index(cm) => Some(cm),
            _ => None,
        }
    }

    fn header(&self) -> &Header {
        match self {
            Self::Component(cm) => cm.header(),
            Self::Direct(cm) => &cm.packed().header,
            Self::Index(cm) => cm.header(),
        }
    }

    /// Bits per pixel.
    pub fn pixel_size(&self) -> u32 {
        self.header().pixel_bits
    }

    /// Bits of component `index`.
    pub fn component_size(&self, index: usize) -> Result<u32> {
        self.header().component_size(index)
    }

    /// Bits of every component, alpha last.
    pub fn component_sizes(&self) -> &[u32] {
        &self.header().bits
    }

    /// Color components plus alpha.
    pub fn num_components(&self) -> usize {
        self.header().num_components()
    }

    /// Components excluding alpha.
    pub fn num_color_components(&self) -> usize {
        self.header().num_color_components()
    }

    /// True when the last component is alpha.
    pub fn has_alpha(&self) -> bool {
        self.header().has_alpha
    }

    /// True when color components are stored multiplied by alpha.
    pub fn is_alpha_premultiplied(&self) -> bool {
        self.header().premultiplied
    }

    /// Coverage classification.
    pub fn transparency(&self) -> Transparency {
        self.header().transparency
    }

    /// Element type of native pixels.
    pub fn transfer_type(&self) -> DataType {
        self.header().transfer_type
    }

    /// Color space of the color components.
    pub fn color_space(&self) -> &Arc<dyn ColorSpace> {
        &self.header().color_space
    }

    // Single-element pixel value for the packed kinds.
    fn packed_pixel(&self, pixel: &TransferData) -> Result<u32> {
        match self {
            Self::Direct(cm) => cm.packed().from_transfer(pixel),
            Self::Index(cm) => cm.pixel_of(pixel),
            Self::Component(_) => Err(Error::unsupported("packed_pixel", "component color model")),
        }
    }

    /// Red of a native pixel as 8-bit sRGB.
    pub fn get_red(&self, pixel: &TransferData) -> Result<u8> {
        match self {
            Self::Component(cm) => cm.get_red(pixel),
            Self::Direct(cm) => Ok(cm.get_red(self.packed_pixel(pixel)?)),
            Self::Index(cm) => Ok(cm.get_red(self.packed_pixel(pixel)?)),
        }
    }

    /// Green of a native pixel as 8-bit sRGB.
    pub fn get_green(&self, pixel: &TransferData) -> Result<u8> {
        match self {
            Self::Component(cm) => cm.get_green(pixel),
            Self::Direct(cm) => Ok(cm.get_green(self.packed_pixel(pixel)?)),
            Self::Index(cm) => Ok(cm.get_green(self.packed_pixel(pixel)?)),
        }
    }

    /// Blue of a native pixel as 8-bit sRGB.
    pub fn get_blue(&self, pixel: &TransferData) -> Result<u8> {
        match self {
            Self::Component(cm) => cm.get_blue(pixel),
            Self::Direct(cm) => Ok(cm.get_blue(self.packed_pixel(pixel)?)),
            Self::Index(cm) => Ok(cm.get_blue(self.packed_pixel(pixel)?)),
        }
    }

    /// Alpha of a native pixel scaled to `0..=255`.
    pub fn get_alpha(&self, pixel: &TransferData) -> Result<u8> {
        match self {
            Self::Component(cm) => cm.get_alpha(pixel),
            Self::Direct(cm) => Ok(cm.get_alpha(self.packed_pixel(pixel)?)),
            Self::Index(cm) => Ok(cm.get_alpha(self.packed_pixel(pixel)?)),
        }
    }

    /// Native pixel as non-premultiplied `0xAARRGGBB`.
    pub fn get_rgb(&self, pixel: &TransferData) -> Result<u32> {
        match self {
            Self::Component(cm) => cm.get_rgb(pixel),
            Self::Direct(cm) => Ok(cm.get_rgb(self.packed_pixel(pixel)?)),
            Self::Index(cm) => Ok(cm.get_rgb(self.packed_pixel(pixel)?)),
        }
    }

    /// Pixel given as a single integer, as non-premultiplied `0xAARRGGBB`.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedOperation`] for component models with more than
    /// one component.
    pub fn get_rgb_packed(&self, pixel: u32) -> Result<u32> {
        match self {
            Self::Component(cm) => cm.get_rgb_of(pixel),
            Self::Direct(cm) => Ok(cm.get_rgb(pixel)),
            Self::Index(cm) => Ok(cm.get_rgb(pixel)),
        }
    }

    /// Native pixel for a non-premultiplied `0xAARRGGBB` color.
    pub fn get_data_elements(&self, argb: u32) -> TransferData {
        match self {
            Self::Component(cm) => cm.get_data_elements(argb),
            Self::Direct(cm) => cm.packed().to_transfer(cm.get_data_element_for_rgb(argb)),
            Self::Index(cm) => cm.get_data_elements(argb),
        }
    }

    /// Unnormalized component values of a native pixel, alpha last.
    pub fn get_components(&self, pixel: &TransferData) -> Result<Vec<i32>> {
        match self {
            Self::Component(cm) => cm.get_components(pixel),
            Self::Direct(cm) => Ok(cm.get_components(self.packed_pixel(pixel)?)),
            Self::Index(cm) => Ok(cm.get_components(self.packed_pixel(pixel)?)),
        }
    }

    /// Native pixel holding the given unnormalized components.
    ///
    /// Index models return the closest palette entry.
    pub fn get_data_elements_from_components(&self, components: &[i32]) -> Result<TransferData> {
        let tt = self.transfer_type();
        match self {
            Self::Component(cm) => cm.get_data_elements_from_components(components),
            Self::Direct(cm) => Ok(cm.packed().to_transfer(cm.get_data_element(components)?)),
            Self::Index(cm) => Ok(TransferData::from_i32s(tt, &[cm.get_data_element_from_components(components)? as i32])),
        }
    }

    /// Components mapped onto the color space range, alpha onto `[0, 1]`.
    ///
    /// Packed and palette models divide each component by its maximum.
    pub fn get_normalized_components(&self, components: &[i32]) -> Result<Vec<f32>> {
        if let Self::Component(cm) = self {
            return cm.get_normalized_components(components);
        }
        let bits = self.component_sizes();
        if components.len() < bits.len() {
            return Err(Error::out_of_range("components", components.len() as i64, bits.len() as i64));
        }
        Ok(bits
            .iter()
            .zip(components)
            .map(|(&b, &c)| {
                let max = max_for_bits(b);
                if b == 0 { 0.0 } else { ((c as u32) as f64 / f64::from(max)) as f32 }
            })
            .collect())
    }

    /// Inverse of [`Self::get_normalized_components`], rounded to nearest.
    pub fn get_unnormalized_components(&self, normalized: &[f32]) -> Result<Vec<i32>> {
        if let Self::Component(cm) = self {
            return cm.get_unnormalized_components(normalized);
        }
        let bits = self.component_sizes();
        if normalized.len() < bits.len() {
            return Err(Error::out_of_range("components", normalized.len() as i64, bits.len() as i64));
        }
        Ok(bits
            .iter()
            .zip(normalized)
            .map(|(&b, &v)| {
                let max = max_for_bits(b);
                if b == 0 { 0 } else { to_sample(f64::from(v) * f64::from(max), max) }
            })
            .collect())
    }

    /// Premultiplies or un-premultiplies `raster` in place and returns the
    /// model describing the result.
    pub fn coerce_data(&self, raster: &Raster, premultiplied: bool) -> Result<ColorModel> {
        Ok(match self {
            Self::Component(cm) => cm.coerce_data(raster, premultiplied)?.into(),
            Self::Direct(cm) => cm.coerce_data(raster, premultiplied)?.into(),
            Self::Index(cm) => cm.coerce_data(raster, premultiplied)?.into(),
        })
    }

    /// True when `raster` can hold pixels of this model.
    pub fn is_compatible_raster(&self, raster: &Raster) -> bool {
        match self {
            Self::Component(cm) => cm.is_compatible_raster(raster),
            Self::Direct(cm) => cm.packed().is_compatible_raster(raster),
            Self::Index(cm) => cm.is_compatible_raster(raster),
        }
    }

    /// True when `sm` can lay out pixels of this model.
    pub fn is_compatible_sample_model(&self, sm: &SampleModel) -> bool {
        match self {
            Self::Component(cm) => cm.is_compatible_sample_model(sm),
            Self::Direct(cm) => cm.packed().is_compatible_sample_model(sm),
            Self::Index(cm) => cm.is_compatible_sample_model(sm),
        }
    }

    /// New raster of `width` x `height` compatible with this model.
    pub fn create_compatible_writable_raster(&self, width: i32, height: i32) -> Result<Raster> {
        match self {
            Self::Component(cm) => cm.create_compatible_writable_raster(width, height),
            Self::Direct(cm) => cm.packed().create_compatible_writable_raster(width, height),
            Self::Index(cm) => cm.create_compatible_writable_raster(width, height),
        }
    }

    /// New sample model of `width` x `height` compatible with this model.
    pub fn create_compatible_sample_model(&self, width: i32, height: i32) -> Result<SampleModel> {
        match self {
            Self::Component(cm) => cm.create_compatible_sample_model(width, height),
            Self::Direct(cm) => cm.packed().create_compatible_sample_model(width, height),
            Self::Index(cm) => cm.create_compatible_sample_model(width, height),
        }
    }

    /// Single-band view of the alpha samples of `raster`.
    ///
    /// `None` for models without alpha and for palettes, whose alpha is not
    /// stored in the raster.
    pub fn alpha_raster(&self, raster: &Raster) -> Result<Option<Raster>> {
        match self {
            Self::Component(cm) => cm.alpha_raster(raster),
            Self::Direct(cm) if cm.alpha_mask() != 0 => alpha_child(raster).map(Some),
            Self::Direct(_) | Self::Index(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorspace::srgb;

    #[test]
    fn test_rgb_default() {
        let cm = ColorModel::rgb_default();
        assert!(std::ptr::eq(cm, ColorModel::rgb_default()));
        let d = cm.as_direct().unwrap();
        assert_eq!(
            [d.red_mask(), d.green_mask(), d.blue_mask(), d.alpha_mask()],
            [0x00ff0000, 0x0000ff00, 0x000000ff, 0xff000000]
        );
        assert_eq!(cm.transfer_type(), DataType::Int);
        assert_eq!(cm.transparency(), Transparency::Translucent);
        assert!(cm.has_alpha());
        assert!(!cm.is_alpha_premultiplied());
        assert!(cm.color_space().is_srgb());
        assert_eq!(cm.component_sizes(), &[8, 8, 8, 8]);

        let px = cm.get_data_elements(0x80102030);
        assert_eq!(cm.get_rgb(&px).unwrap(), 0x80102030);
        assert_eq!(cm.get_red(&px).unwrap(), 0x10);
        assert_eq!(cm.get_alpha(&px).unwrap(), 0x80);
    }

    #[test]
    fn test_dispatch_component() {
        let cm: ColorModel = ComponentColorModel::with_defaults(srgb(), true, false, DataType::Byte).unwrap().into();
        assert_eq!(cm.kind_name(), "component");
        assert_eq!(cm.num_components(), 4);
        assert_eq!(cm.num_color_components(), 3);
        assert_eq!(cm.pixel_size(), 32);
        let px = cm.get_data_elements(0xff204060);
        assert_eq!(cm.get_components(&px).unwrap(), vec![0x20, 0x40, 0x60, 0xff]);
        assert!(cm.get_rgb_packed(0).unwrap_err().is_unsupported());
    }

    #[test]
    fn test_normalized_packed() {
        let cm: ColorModel = DirectColorModel::new(16, 0xf800, 0x07e0, 0x001f).unwrap().into();
        let norm = cm.get_normalized_components(&[31, 0, 21]).unwrap();
        assert_eq!(norm[0], 1.0);
        assert_eq!(norm[1], 0.0);
        assert!((norm[2] - 21.0 / 31.0).abs() < 1e-6);
        assert_eq!(cm.get_unnormalized_components(&norm).unwrap(), vec![31, 0, 21]);
        assert!(cm.get_normalized_components(&[1, 2]).unwrap_err().is_range_error());
    }

    #[test]
    fn test_components_round_trip_direct() {
        let cm: ColorModel = DirectColorModel::new(16, 0xf800, 0x07e0, 0x001f).unwrap().into();
        let px = cm.get_data_elements_from_components(&[3, 50, 9]).unwrap();
        assert_eq!(px.get(0).unwrap(), (3 << 11) | (50 << 5) | 9);
        assert_eq!(cm.get_components(&px).unwrap(), vec![3, 50, 9]);
    }

    #[test]
    fn test_index_dispatch() {
        let icm = IndexColorModel::new(2, 4, &[0, 255, 0, 0], &[0, 0, 255, 0], &[0, 0, 0, 255]).unwrap();
        let cm = ColorModel::from(icm);
        assert_eq!(cm.kind_name(), "index");
        let px = cm.get_data_elements(0xff00ff00);
        assert_eq!(px.get(0).unwrap(), 2);
        assert_eq!(cm.get_components(&px).unwrap(), vec![0, 255, 0]);
        assert_eq!(cm.get_normalized_components(&[255, 0, 0]).unwrap(), vec![1.0, 0.0, 0.0]);
        let r = cm.create_compatible_writable_raster(2, 2).unwrap();
        assert!(cm.is_compatible_raster(&r));
        assert!(cm.alpha_raster(&r).unwrap().is_none());
    }

    #[test]
    fn test_alpha_raster_direct() {
        let cm = ColorModel::rgb_default();
        let r = cm.create_compatible_writable_raster(3, 2).unwrap();
        r.set_data_elements_rect(0, 0, 1, 1, &cm.get_data_elements(0x7f000000)).unwrap();
        let alpha = cm.alpha_raster(&r).unwrap().unwrap();
        assert_eq!(alpha.num_bands(), 1);
        assert_eq!(alpha.get_sample(0, 0, 0).unwrap(), 0x7f);

        let opaque: ColorModel = DirectColorModel::new(24, 0xff0000, 0xff00, 0xff).unwrap().into();
        let r = opaque.create_compatible_writable_raster(1, 1).unwrap();
        assert!(opaque.alpha_raster(&r).unwrap().is_none());
    }

    #[test]
    fn test_coerce_dispatch() {
        let cm = ColorModel::rgb_default();
        let r = cm.create_compatible_writable_raster(1, 1).unwrap();
        r.set_data_elements_rect(0, 0, 1, 1, &cm.get_data_elements(0x80ff0000)).unwrap();
        let pre = cm.coerce_data(&r, true).unwrap();
        assert!(pre.is_alpha_premultiplied());
        assert_eq!(r.get_pixel(0, 0).unwrap(), vec![128, 0, 0, 128]);
        let back = pre.coerce_data(&r, false).unwrap();
        assert!(!back.is_alpha_premultiplied());
        assert_eq!(r.get_pixel(0, 0).unwrap(), vec![255, 0, 0, 128]);
    }
}
