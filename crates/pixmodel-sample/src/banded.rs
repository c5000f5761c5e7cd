//! Band-sequential layout: each band in its own plane.
//!
//! A [`BandedSampleModel`] is a component layout with a pixel stride of 1.
//! By default band `b` lives at offset 0 of bank `b`, so the samples of one
//! band form a contiguous `scanline_stride * height` plane.

use pixmodel_core::{DataBuffer, DataType, Result};

use crate::component::{ComponentSampleModel, check_dimensions, order_bands};

/// Component layout with unit pixel stride.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandedSampleModel {
    inner: ComponentSampleModel,
}

impl BandedSampleModel {
    /// One bank per band, offsets 0, scanline stride `width`.
    pub fn new(data_type: DataType, width: i32, height: i32, num_bands: usize) -> Result<Self> {
        Self::with_layout(
            data_type,
            width,
            height,
            width,
            (0..num_bands).collect(),
            vec![0; num_bands],
        )
    }

    /// Explicit scanline stride, banks and offsets.
    pub fn with_layout(
        data_type: DataType,
        width: i32,
        height: i32,
        scanline_stride: i32,
        bank_indices: Vec<usize>,
        band_offsets: Vec<i32>,
    ) -> Result<Self> {
        let inner = ComponentSampleModel::with_banks(
            data_type,
            width,
            height,
            1,
            scanline_stride,
            bank_indices,
            band_offsets,
        )?;
        Ok(Self { inner })
    }

    /// The underlying stride/offset model.
    pub fn as_component(&self) -> &ComponentSampleModel {
        &self.inner
    }

    /// Same bands at a new size with scanline stride `width`.
    ///
    /// With a single bank the bands are placed in consecutive `width * height`
    /// planes in their original offset order; with several banks every band
    /// starts at offset 0 of its bank.
    pub fn create_compatible(&self, width: i32, height: i32) -> Result<Self> {
        check_dimensions(width, height)?;
        let offsets = if self.inner.num_banks == 1 {
            order_bands(
                &self.inner.band_offsets,
                i64::from(width) * i64::from(height),
            )?
        } else {
            vec![0; self.inner.num_bands()]
        };
        Self::with_layout(
            self.inner.data_type,
            width,
            height,
            width,
            self.inner.bank_indices.clone(),
            offsets,
        )
    }

    /// Selects `bands` into a new banded model sharing the same planes.
    pub fn create_subset(&self, bands: &[usize]) -> Result<Self> {
        let (bank_indices, band_offsets) = self.inner.select_bands(bands)?;
        Self::with_layout(
            self.inner.data_type,
            self.inner.width,
            self.inner.height,
            self.inner.scanline_stride,
            bank_indices,
            band_offsets,
        )
    }

    /// Allocates one bank per referenced bank index.
    ///
    /// Each bank holds at least `scanline_stride * height` elements, more if
    /// band offsets push addresses past that.
    pub fn create_data_buffer(&self) -> Result<DataBuffer> {
        let planes = i64::from(self.inner.scanline_stride) * i64::from(self.inner.height);
        let size = planes.max(self.inner.buffer_size());
        let size = crate::component::to_i32(size, "buffer size")?;
        DataBuffer::new(self.inner.data_type, size as usize, self.inner.num_banks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let sm = BandedSampleModel::new(DataType::UShort, 5, 3, 3).unwrap();
        let c = sm.as_component();
        assert_eq!(c.bank_indices(), &[0, 1, 2]);
        assert_eq!(c.band_offsets(), &[0, 0, 0]);
        assert_eq!((c.pixel_stride(), c.scanline_stride()), (1, 5));

        let buf = sm.create_data_buffer().unwrap();
        assert_eq!((buf.num_banks(), buf.size()), (3, 15));
        c.set_sample(4, 2, 1, 999, &buf).unwrap();
        assert_eq!(buf.elem(1, 14).unwrap(), 999);
    }

    #[test]
    fn test_compatible_single_bank() {
        let sm = BandedSampleModel::with_layout(DataType::Byte, 2, 2, 2, vec![0, 0], vec![4, 0])
            .unwrap();
        let c = sm.create_compatible(3, 3).unwrap();
        assert_eq!(c.as_component().band_offsets(), &[9, 0]);
        assert_eq!(c.as_component().scanline_stride(), 3);
    }

    #[test]
    fn test_compatible_multi_bank() {
        let sm = BandedSampleModel::with_layout(DataType::Byte, 2, 2, 4, vec![1, 0], vec![3, 1])
            .unwrap();
        let c = sm.create_compatible(6, 1).unwrap();
        assert_eq!(c.as_component().band_offsets(), &[0, 0]);
        assert_eq!(c.as_component().bank_indices(), &[1, 0]);
    }

    #[test]
    fn test_subset_shares_planes() {
        let sm = BandedSampleModel::new(DataType::Int, 2, 2, 4).unwrap();
        let s = sm.create_subset(&[3, 1]).unwrap();
        assert_eq!(s.as_component().bank_indices(), &[3, 1]);
        assert_eq!(s.as_component().num_banks(), 4);
        assert!(sm.create_subset(&[0, 1, 2, 3, 0]).unwrap_err().is_format_mismatch());
    }

    #[test]
    fn test_buffer_covers_offsets() {
        let sm = BandedSampleModel::with_layout(DataType::Byte, 2, 2, 2, vec![0], vec![5]).unwrap();
        let buf = sm.create_data_buffer().unwrap();
        assert_eq!(buf.size(), 9);
        assert!(sm.as_component().set_sample(1, 1, 0, 1, &buf).is_ok());
    }
}
