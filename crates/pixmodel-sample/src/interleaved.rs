//! Pixel-interleaved layout: all bands of a pixel adjacent in one bank.

use pixmodel_core::{DataType, Error, Result};

use crate::component::{ComponentSampleModel, check_dimensions, to_i32};

/// Single-bank component layout with interleaved bands.
///
/// Requires `pixel_stride * width <= scanline_stride`, a band offset spread
/// no larger than the scanline stride, and a pixel stride at least as large
/// as the band offset spread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelInterleavedSampleModel {
    inner: ComponentSampleModel,
}

impl PixelInterleavedSampleModel {
    /// Creates an interleaved model.
    ///
    /// ```rust
    /// use pixmodel_core::DataType;
    /// use pixmodel_sample::PixelInterleavedSampleModel;
    ///
    /// // Packed BGR rows of 4 pixels.
    /// let sm = PixelInterleavedSampleModel::new(DataType::Byte, 4, 2, 3, 12, vec![2, 1, 0]).unwrap();
    /// assert_eq!(sm.as_component().offset(1, 1, 0), 12 + 3 + 2);
    /// ```
    pub fn new(
        data_type: DataType,
        width: i32,
        height: i32,
        pixel_stride: i32,
        scanline_stride: i32,
        band_offsets: Vec<i32>,
    ) -> Result<Self> {
        let inner = ComponentSampleModel::new(
            data_type,
            width,
            height,
            pixel_stride,
            scanline_stride,
            band_offsets,
        )?;
        let min = inner.band_offsets.iter().copied().min().unwrap_or(0);
        let max = inner.band_offsets.iter().copied().max().unwrap_or(0);
        let spread = i64::from(max) - i64::from(min);
        if spread > i64::from(scanline_stride) {
            return Err(Error::invalid_config(
                "offsets between bands must be less than the scanline stride",
            ));
        }
        if i64::from(pixel_stride) * i64::from(width) > i64::from(scanline_stride) {
            return Err(Error::invalid_config(
                "pixel stride times width must be <= the scanline stride",
            ));
        }
        if i64::from(pixel_stride) < spread {
            return Err(Error::invalid_config(
                "pixel stride must be >= the offsets between bands",
            ));
        }
        Ok(Self { inner })
    }

    /// The underlying stride/offset model.
    pub fn as_component(&self) -> &ComponentSampleModel {
        &self.inner
    }

    /// Same pixel stride at a new size, offsets rebased to start at 0.
    pub fn create_compatible(&self, width: i32, height: i32) -> Result<Self> {
        check_dimensions(width, height)?;
        let min = self.inner.band_offsets.iter().copied().min().unwrap_or(0);
        let offsets = if min > 0 {
            self.inner.band_offsets.iter().map(|&o| o - min).collect()
        } else {
            self.inner.band_offsets.clone()
        };
        let stride = to_i32(
            i64::from(self.inner.pixel_stride) * i64::from(width),
            "scanline stride",
        )?;
        Self::new(
            self.inner.data_type,
            width,
            height,
            self.inner.pixel_stride,
            stride,
            offsets,
        )
    }

    /// Selects `bands` into a new interleaved model with the same strides.
    pub fn create_subset(&self, bands: &[usize]) -> Result<Self> {
        let (_, band_offsets) = self.inner.select_bands(bands)?;
        Self::new(
            self.inner.data_type,
            self.inner.width,
            self.inner.height,
            self.inner.pixel_stride,
            self.inner.scanline_stride,
            band_offsets,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraints() {
        let new = |ps, ss, offs: Vec<i32>| PixelInterleavedSampleModel::new(DataType::Byte, 4, 2, ps, ss, offs);
        assert!(new(3, 12, vec![0, 1, 2]).is_ok());
        assert!(new(3, 11, vec![0, 1, 2]).unwrap_err().is_config_error());
        assert!(new(1, 12, vec![0, 1, 2]).unwrap_err().is_config_error());
        assert!(new(4, 16, vec![0, 20]).unwrap_err().is_config_error());
    }

    #[test]
    fn test_compatible_rebases() {
        let sm = PixelInterleavedSampleModel::new(DataType::Byte, 4, 2, 4, 20, vec![3, 1, 2]).unwrap();
        let c = sm.create_compatible(2, 5).unwrap();
        assert_eq!(c.as_component().band_offsets(), &[2, 0, 1]);
        assert_eq!(c.as_component().pixel_stride(), 4);
        assert_eq!(c.as_component().scanline_stride(), 8);
        assert_eq!(c.as_component().buffer_size(), 3 + 4 + 32);
    }

    #[test]
    fn test_subset() {
        let sm = PixelInterleavedSampleModel::new(DataType::UShort, 4, 2, 4, 16, vec![0, 1, 2, 3]).unwrap();
        let s = sm.create_subset(&[3]).unwrap();
        assert_eq!(s.as_component().band_offsets(), &[3]);
        assert_eq!(s.as_component().scanline_stride(), 16);
    }
}
