//! Bit-field decomposition shared by packed color models.
//!
//! A packed model stores every component of a pixel in one element of its
//! transfer type. Each component occupies a contiguous run of bits given by
//! a mask; masks never overlap and must fit in the pixel width.

use std::sync::Arc;

use pixmodel_core::{DataType, Error, MaskField, Result, TransferData, validate_masks};
use pixmodel_raster::{Raster, create_packed_raster};
use pixmodel_sample::{PackedSampleModel, SampleModel};
use tracing::debug;

use crate::colorspace::{ColorSpace, ColorSpaceFamily};
use crate::header::{Header, Transparency, element_of};

const RGB_NAMES: [&str; 3] = ["red", "green", "blue"];

/// Color model whose components are bit fields of a single element.
#[derive(Debug, Clone)]
pub struct PackedColorModel {
    pub(crate) header: Header,
    fields: Vec<MaskField>,
    max_bits: u32,
}

impl PackedColorModel {
    /// Creates a packed model.
    ///
    /// `color_masks` holds one mask per color space component. An
    /// `alpha_mask` of zero means the model has no alpha.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] when a mask is non-contiguous,
    /// masks overlap, a mask exceeds `pixel_bits`, the mask count does not
    /// match the color space, or `pixel_bits` does not fit the transfer type.
    pub fn new(
        color_space: Arc<dyn ColorSpace>,
        pixel_bits: u32,
        color_masks: &[u32],
        alpha_mask: u32,
        premultiplied: bool,
        transparency: Transparency,
        transfer_type: DataType,
    ) -> Result<Self> {
        if !matches!(transfer_type, DataType::Byte | DataType::UShort | DataType::Int) {
            return Err(Error::invalid_config(format!(
                "packed color models need a BYTE, USHORT or INT transfer type, got {}",
                transfer_type.name()
            )));
        }
        if pixel_bits == 0 || pixel_bits > transfer_type.bits() {
            return Err(Error::invalid_config(format!(
                "{pixel_bits} pixel bits do not fit a {} element",
                transfer_type.name()
            )));
        }
        let n = color_space.num_components();
        if color_masks.len() != n {
            return Err(Error::invalid_config(format!(
                "{} color masks for a {n}-component color space",
                color_masks.len()
            )));
        }

        let generic: Vec<String> = (0..n).map(|i| format!("component {i}")).collect();
        let mut names: Vec<&str> = if color_space.family() == ColorSpaceFamily::Rgb && n == 3 {
            RGB_NAMES.to_vec()
        } else {
            generic.iter().map(String::as_str).collect()
        };
        let mut masks = color_masks.to_vec();
        let has_alpha = alpha_mask != 0;
        if has_alpha {
            masks.push(alpha_mask);
            names.push("alpha");
        }
        let fields = validate_masks(&masks, &names, pixel_bits)?;
        let max_bits = fields.iter().map(|f| f.bits).max().unwrap_or(0);

        let header = Header {
            color_space,
            bits: fields.iter().map(|f| f.bits).collect(),
            pixel_bits,
            has_alpha,
            premultiplied: premultiplied && has_alpha,
            transparency,
            transfer_type,
        };
        header.validate()?;
        debug!(pixel_bits, masks = ?masks, has_alpha, "PackedColorModel::new");
        Ok(Self { header, fields, max_bits })
    }

    /// 32-bit sRGB with 8-bit fields at `0xAARRGGBB`.
    pub(crate) fn argb(color_space: Arc<dyn ColorSpace>) -> Self {
        let field = |offset: u32| MaskField { mask: 0xffu32 << offset, offset, bits: 8 };
        let fields = vec![field(16), field(8), field(0), field(24)];
        let header = Header {
            color_space,
            bits: vec![8; 4],
            pixel_bits: 32,
            has_alpha: true,
            premultiplied: false,
            transparency: Transparency::Translucent,
            transfer_type: DataType::Int,
        };
        Self { header, fields, max_bits: 8 }
    }

    /// All masks, color components first, alpha last.
    pub fn masks(&self) -> Vec<u32> {
        self.fields.iter().map(|f| f.mask).collect()
    }

    /// Mask of component `index`.
    pub fn mask(&self, index: usize) -> Result<u32> {
        Ok(self.field(index)?.mask)
    }

    /// Bit offset of every component.
    pub fn mask_offsets(&self) -> Vec<u32> {
        self.fields.iter().map(|f| f.offset).collect()
    }

    /// Factors mapping every component onto `0..=255`.
    ///
    /// Zero-width components report 256.
    pub fn scale_factors(&self) -> Vec<f32> {
        self.fields.iter().map(MaskField::scale_factor).collect()
    }

    /// Widest component in bits.
    pub fn max_bits(&self) -> u32 {
        self.max_bits
    }

    /// Decomposed field of component `index`.
    pub fn field(&self, index: usize) -> Result<&MaskField> {
        self.fields
            .get(index)
            .ok_or_else(|| Error::out_of_range("component", index as i64, self.fields.len() as i64))
    }

    pub(crate) fn fields(&self) -> &[MaskField] {
        &self.fields
    }

    /// Raw component values of a packed pixel.
    pub fn components(&self, pixel: u32) -> Vec<i32> {
        self.fields.iter().map(|f| f.extract(pixel) as i32).collect()
    }

    /// Packs raw component values into one pixel.
    ///
    /// Values wider than their field are truncated to the field.
    pub fn pack(&self, components: &[i32]) -> Result<u32> {
        if components.len() < self.fields.len() {
            return Err(Error::out_of_range("components", components.len() as i64, self.fields.len() as i64));
        }
        Ok(self
            .fields
            .iter()
            .zip(components)
            .fold(0u32, |px, (f, &c)| f.insert(px, c as u32)))
    }

    /// Single-element native pixel holding `pixel`.
    pub fn to_transfer(&self, pixel: u32) -> TransferData {
        TransferData::from_i32s(self.header.transfer_type, &[pixel as i32])
    }

    /// Pixel value held by a native pixel.
    pub fn from_transfer(&self, pixel: &TransferData) -> Result<u32> {
        element_of(pixel, self.header.transfer_type)
    }

    /// Data type wide enough for the pixel bits.
    pub fn storage_type(&self) -> DataType {
        match self.header.pixel_bits {
            0..=8 => DataType::Byte,
            9..=16 => DataType::UShort,
            _ => DataType::Int,
        }
    }

    /// True when `raster` stores exactly this model's bit fields.
    pub fn is_compatible_raster(&self, raster: &Raster) -> bool {
        self.is_compatible_sample_model(raster.sample_model())
            && raster.sample_model().as_packed().is_some_and(|sm| {
                let used = sm
                    .bit_masks()
                    .iter()
                    .map(|&m| if m == 0 { 0 } else { 32 - m.leading_zeros() })
                    .max()
                    .unwrap_or(0);
                used == self.header.pixel_bits
            })
    }

    /// True for packed sample models with the same masks and transfer type.
    pub fn is_compatible_sample_model(&self, sm: &SampleModel) -> bool {
        sm.transfer_type() == self.header.transfer_type
            && sm.as_packed().is_some_and(|p| p.bit_masks() == self.masks())
    }

    /// Packed raster of `width` x `height` pixels with this model's masks.
    pub fn create_compatible_writable_raster(&self, width: i32, height: i32) -> Result<Raster> {
        create_packed_raster(self.storage_type(), width, height, &self.masks(), None)
    }

    /// Packed sample model with this model's masks and transfer type.
    pub fn create_compatible_sample_model(&self, width: i32, height: i32) -> Result<SampleModel> {
        Ok(PackedSampleModel::new(self.header.transfer_type, width, height, &self.masks())?.into())
    }
}
