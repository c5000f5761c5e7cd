//! Bit-mask decomposition for packed pixels.
//!
//! A packed layout stores several samples in one element. Each sample owns a
//! contiguous run of bits described by a mask. [`decompose_mask`] turns a mask
//! into its shift and width and rejects masks with gaps.
//!
//! ```text
//! mask   = 0b0000_0111_1110_0000
//!                   ^^^^^^
//! offset = 5, bits = 6
//! ```
//!
//! [`validate_masks`] additionally checks a whole set of masks for overlap and
//! for fitting within the pixel width.

use crate::error::{Error, Result};

/// Position and width of one packed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MaskField {
    /// The mask as given
    pub mask: u32,
    /// Trailing zero count (shift to extract the field)
    pub offset: u32,
    /// Number of contiguous set bits
    pub bits: u32,
}

impl MaskField {
    /// Extracts this field from a packed value.
    #[inline]
    pub const fn extract(&self, pixel: u32) -> u32 {
        if self.mask == 0 {
            0
        } else {
            (pixel & self.mask) >> self.offset
        }
    }

    /// Places `value` into this field, dropping bits that do not fit.
    #[inline]
    pub const fn insert(&self, pixel: u32, value: u32) -> u32 {
        if self.mask == 0 {
            return pixel;
        }
        (pixel & !self.mask) | ((value << self.offset) & self.mask)
    }

    /// Largest value the field holds.
    #[inline]
    pub const fn max_value(&self) -> u32 {
        if self.bits >= 32 {
            u32::MAX
        } else {
            (1u32 << self.bits) - 1
        }
    }

    /// Factor mapping the field range onto 0..=255.
    ///
    /// A zero-width field yields 256.0, a sentinel for "carries no data".
    #[inline]
    pub fn scale_factor(&self) -> f32 {
        if self.bits == 0 {
            256.0
        } else {
            255.0 / self.max_value() as f32
        }
    }
}

/// Splits a mask into offset and width.
///
/// `name` identifies the component ("red", "alpha", "band 2") in the error.
///
/// # Errors
///
/// [`Error::InvalidConfiguration`] if the set bits are not contiguous.
///
/// # Example
///
/// ```rust
/// use pixmodel_core::mask::decompose_mask;
///
/// let f = decompose_mask(0x0000_ff00, "green").unwrap();
/// assert_eq!((f.offset, f.bits), (8, 8));
/// assert!(decompose_mask(0b1010, "red").is_err());
/// ```
pub fn decompose_mask(mask: u32, name: &str) -> Result<MaskField> {
    if mask == 0 {
        return Ok(MaskField::default());
    }
    let offset = mask.trailing_zeros();
    let shifted = mask >> offset;
    let bits = shifted.trailing_ones();
    let rest = if bits >= 32 { 0 } else { shifted >> bits };
    if rest != 0 {
        return Err(Error::invalid_config(format!(
            "{name} mask {mask:#x} must be contiguous"
        )));
    }
    Ok(MaskField { mask, offset, bits })
}

/// Decomposes every mask and checks them as a set.
///
/// `names[i]` labels `masks[i]` in errors. Masks must not share bits and must
/// fit within `pixel_bits`.
pub fn validate_masks(masks: &[u32], names: &[&str], pixel_bits: u32) -> Result<Vec<MaskField>> {
    let mut seen = 0u32;
    let mut fields = Vec::with_capacity(masks.len());
    for (i, &mask) in masks.iter().enumerate() {
        let name = names.get(i).copied().unwrap_or("component");
        let field = decompose_mask(mask, name)?;
        if seen & mask != 0 {
            return Err(Error::invalid_config(format!(
                "{name} mask {mask:#x} overlaps another mask"
            )));
        }
        if field.bits > 0 && field.offset + field.bits > pixel_bits {
            return Err(Error::invalid_config(format!(
                "{name} mask {mask:#x} exceeds {pixel_bits} pixel bits"
            )));
        }
        seen |= mask;
        fields.push(field);
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_decompose() {
        let f = decompose_mask(0xff00_0000, "alpha").unwrap();
        assert_eq!((f.offset, f.bits), (24, 8));
        let f = decompose_mask(0xffff_ffff, "gray").unwrap();
        assert_eq!((f.offset, f.bits), (0, 32));
        assert_eq!(f.max_value(), u32::MAX);
        let f = decompose_mask(0x7e0, "green").unwrap();
        assert_eq!((f.offset, f.bits), (5, 6));
    }

    #[test]
    fn test_non_contiguous() {
        let err = decompose_mask(0b1010, "red").unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("red"));
    }

    #[test]
    fn test_scale_factor() {
        assert_relative_eq!(decompose_mask(0x1f, "b").unwrap().scale_factor(), 255.0 / 31.0);
        assert_relative_eq!(MaskField::default().scale_factor(), 256.0);
    }

    #[test]
    fn test_extract_insert() {
        let f = decompose_mask(0xf0, "x").unwrap();
        assert_eq!(f.extract(0xab), 0xa);
        assert_eq!(f.insert(0x0b, 0x1c), 0xcb);
        assert_eq!(MaskField::default().extract(0xffff), 0);
    }

    #[test]
    fn test_validate_masks() {
        assert!(validate_masks(&[0xf800, 0x7e0, 0x1f], &["r", "g", "b"], 16).is_ok());
        let err = validate_masks(&[0xff, 0x180], &["r", "g"], 16).unwrap_err();
        assert!(err.to_string().contains("overlaps"));
        let err = validate_masks(&[0xff00], &["r"], 8).unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }
}
