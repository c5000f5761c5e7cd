//! State shared by every color model, plus sample scaling helpers.

use std::fmt;
use std::sync::Arc;

use pixmodel_core::{DataType, Error, Result, TransferData};
use pixmodel_raster::Raster;
use rayon::prelude::*;
use tracing::debug;

use crate::colorspace::ColorSpace;

/// How a color model represents coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Transparency {
    /// Every pixel is fully opaque.
    #[default]
    Opaque,
    /// Pixels are either fully opaque or fully transparent.
    Bitmask,
    /// Alpha takes arbitrary values.
    Translucent,
}

/// Attributes common to all color models.
#[derive(Clone)]
pub(crate) struct Header {
    pub color_space: Arc<dyn ColorSpace>,
    pub bits: Vec<u32>,
    pub pixel_bits: u32,
    pub has_alpha: bool,
    pub premultiplied: bool,
    pub transparency: Transparency,
    pub transfer_type: DataType,
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Header")
            .field("color_space", &self.color_space.name())
            .field("bits", &self.bits)
            .field("pixel_bits", &self.pixel_bits)
            .field("has_alpha", &self.has_alpha)
            .field("premultiplied", &self.premultiplied)
            .field("transparency", &self.transparency)
            .field("transfer_type", &self.transfer_type)
            .finish()
    }
}

impl Header {
    pub fn num_components(&self) -> usize {
        self.bits.len()
    }

    pub fn num_color_components(&self) -> usize {
        self.bits.len() - usize::from(self.has_alpha)
    }

    pub fn component_size(&self, index: usize) -> Result<u32> {
        self.bits
            .get(index)
            .copied()
            .ok_or_else(|| Error::out_of_range("component", index as i64, self.bits.len() as i64))
    }

    /// Checks the invariant between alpha and transparency.
    pub fn validate(&self) -> Result<()> {
        if !self.has_alpha && self.transparency != Transparency::Opaque {
            return Err(Error::invalid_config(format!(
                "{:?} transparency needs an alpha component",
                self.transparency
            )));
        }
        Ok(())
    }

    /// Component values of a native pixel, one per component.
    pub fn components_of(&self, pixel: &TransferData) -> Result<Vec<i32>> {
        pixel.expect_shape(self.transfer_type, self.num_components())?;
        (0..self.num_components()).map(|i| pixel.get(i)).collect()
    }
}

/// Largest value a field of `bits` bits can hold.
#[inline]
pub(crate) fn max_for_bits(bits: u32) -> u32 {
    if bits >= 32 { u32::MAX } else { (1u32 << bits) - 1 }
}

/// Sample as a non-negative magnitude.
///
/// Signed 16-bit samples clamp negatives to zero; 32-bit samples are
/// reinterpreted as unsigned.
#[inline]
pub(crate) fn magnitude(sample: i32, data_type: DataType) -> f64 {
    match data_type {
        DataType::Short => f64::from(sample.max(0)),
        _ => f64::from(sample as u32),
    }
}

/// Rounds `v` to the nearest integer in `[0, max]` and stores it as a sample.
#[inline]
pub(crate) fn to_sample(v: f64, max: u32) -> i32 {
    (v + 0.5).clamp(0.0, f64::from(max)) as u32 as i32
}

/// Single-element pixel value.
pub(crate) fn element_of(pixel: &TransferData, transfer_type: DataType) -> Result<u32> {
    pixel.expect_shape(transfer_type, 1)?;
    Ok(pixel.get(0)? as u32)
}

/// Multiplies (or divides) every color band of `raster` by its normalized
/// alpha, in place.
///
/// The last band is alpha. `maxes[b]` is the largest value of band `b`.
/// A zero alpha zeroes the color bands in both directions; dividing clamps
/// to the band maximum.
pub(crate) fn coerce_raster(
    raster: &Raster,
    maxes: &[u32],
    data_type: DataType,
    premultiply: bool,
) -> Result<()> {
    let n = raster.num_bands();
    if n < 2 || maxes.len() < n {
        return Err(Error::format_mismatch(format!(
            "raster with {n} bands has no alpha band to coerce"
        )));
    }
    let b = raster.bounds();
    let alpha_max = f64::from(maxes[n - 1]);
    debug!(width = b.width, height = b.height, bands = n, premultiply, "coerce_raster");

    (b.y..b.y + b.height).into_par_iter().try_for_each(|y| -> Result<()> {
        let mut row = raster.get_pixels(b.x, y, b.width, 1)?;
        for px in row.chunks_mut(n) {
            let alpha = magnitude(px[n - 1], data_type) / alpha_max;
            for c in 0..n - 1 {
                let v = magnitude(px[c], data_type);
                px[c] = if alpha == 0.0 {
                    0
                } else if premultiply {
                    to_sample(v * alpha, maxes[c])
                } else {
                    to_sample(v / alpha, maxes[c])
                };
            }
        }
        raster.set_pixels(b.x, y, b.width, 1, &row)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixmodel_raster::create_interleaved_raster;

    #[test]
    fn test_max_for_bits() {
        assert_eq!(max_for_bits(1), 1);
        assert_eq!(max_for_bits(8), 255);
        assert_eq!(max_for_bits(31), i32::MAX as u32);
        assert_eq!(max_for_bits(32), u32::MAX);
    }

    #[test]
    fn test_to_sample() {
        assert_eq!(to_sample(127.5, 255), 128);
        assert_eq!(to_sample(300.0, 255), 255);
        assert_eq!(to_sample(-3.0, 255), 0);
        assert_eq!(to_sample(f64::from(u32::MAX), u32::MAX), -1);
    }

    #[test]
    fn test_magnitude() {
        assert_eq!(magnitude(-1, DataType::Int), f64::from(u32::MAX));
        assert_eq!(magnitude(-1, DataType::Short), 0.0);
        assert_eq!(magnitude(200, DataType::Byte), 200.0);
    }

    #[test]
    fn test_coerce_raster() {
        let r = create_interleaved_raster(DataType::Byte, 2, 1, 2, None).unwrap();
        r.set_pixels(0, 0, 2, 1, &[200, 51, 90, 0]).unwrap();
        coerce_raster(&r, &[255, 255], DataType::Byte, true).unwrap();
        assert_eq!(r.get_pixels(0, 0, 2, 1).unwrap(), vec![40, 51, 0, 0]);
        coerce_raster(&r, &[255, 255], DataType::Byte, false).unwrap();
        assert_eq!(r.get_pixels(0, 0, 2, 1).unwrap(), vec![200, 51, 0, 0]);

        let single = create_interleaved_raster(DataType::Byte, 2, 1, 1, None).unwrap();
        assert!(coerce_raster(&single, &[255], DataType::Byte, true).unwrap_err().is_format_mismatch());
    }
}
