//! Raster constructors for the common layouts.
//!
//! Each layout comes in three forms: defaults (`create_*_raster`), explicit
//! strides and offsets (`*_with`), and over an existing buffer (`*_from`).
//! A `location` of `None` places the top-left pixel at (0, 0).

use std::sync::Arc;

use pixmodel_core::{DataBuffer, DataType, Error, Result};
use pixmodel_sample::{BandedSampleModel, PackedSampleModel, PixelInterleavedSampleModel, SampleModel};
use tracing::debug;

use crate::Raster;

fn buffer_len(size: i64) -> Result<usize> {
    if size <= 0 || size > i64::from(i32::MAX) {
        return Err(Error::invalid_config(format!(
            "buffer of {size} elements cannot be allocated"
        )));
    }
    Ok(size as usize)
}

fn max_offset(offsets: &[i32]) -> i64 {
    offsets.iter().copied().max().map_or(0, i64::from)
}

/// Pixel-interleaved raster with band `b` at offset `b`.
pub fn create_interleaved_raster(
    data_type: DataType,
    width: i32,
    height: i32,
    bands: usize,
    location: Option<(i32, i32)>,
) -> Result<Raster> {
    let n = i32::try_from(bands)
        .map_err(|_| Error::invalid_config(format!("{bands} bands is too many")))?;
    let scanline_stride = i64::from(width) * i64::from(n);
    let scanline_stride = i32::try_from(scanline_stride)
        .map_err(|_| Error::invalid_config("width * bands overflows"))?;
    create_interleaved_raster_with(
        data_type,
        width,
        height,
        scanline_stride,
        n,
        (0..n).collect(),
        location,
    )
}

/// Pixel-interleaved raster with explicit strides and offsets.
///
/// The buffer holds `max(offsets) + ss * (h - 1) + ps * (w - 1) + 1` elements.
#[allow(clippy::too_many_arguments)]
pub fn create_interleaved_raster_with(
    data_type: DataType,
    width: i32,
    height: i32,
    scanline_stride: i32,
    pixel_stride: i32,
    band_offsets: Vec<i32>,
    location: Option<(i32, i32)>,
) -> Result<Raster> {
    let size = max_offset(&band_offsets)
        + i64::from(scanline_stride) * (i64::from(height) - 1)
        + i64::from(pixel_stride) * (i64::from(width) - 1)
        + 1;
    let sm = PixelInterleavedSampleModel::new(
        data_type,
        width,
        height,
        pixel_stride,
        scanline_stride,
        band_offsets,
    )?;
    let buffer = Arc::new(DataBuffer::new(data_type, buffer_len(size)?, 1)?);
    debug!(%data_type, width, height, pixel_stride, scanline_stride, "create_interleaved_raster");
    Raster::new(sm.into(), buffer, location.unwrap_or((0, 0)))
}

/// Pixel-interleaved raster over bank 0 of an existing buffer.
pub fn create_interleaved_raster_from(
    buffer: Arc<DataBuffer>,
    width: i32,
    height: i32,
    scanline_stride: i32,
    pixel_stride: i32,
    band_offsets: Vec<i32>,
    location: Option<(i32, i32)>,
) -> Result<Raster> {
    let sm = PixelInterleavedSampleModel::new(
        buffer.data_type(),
        width,
        height,
        pixel_stride,
        scanline_stride,
        band_offsets,
    )?;
    Raster::new(sm.into(), buffer, location.unwrap_or((0, 0)))
}

/// Banded raster with one bank per band.
pub fn create_banded_raster(
    data_type: DataType,
    width: i32,
    height: i32,
    bands: usize,
    location: Option<(i32, i32)>,
) -> Result<Raster> {
    if bands == 0 {
        return Err(Error::invalid_config("number of bands must be > 0"));
    }
    create_banded_raster_with(
        data_type,
        width,
        height,
        width,
        (0..bands).collect(),
        vec![0; bands],
        location,
    )
}

/// Banded raster with explicit banks and offsets.
///
/// Allocates `max(bank_indices) + 1` banks of
/// `max(offsets) + ss * (h - 1) + w` elements.
#[allow(clippy::too_many_arguments)]
pub fn create_banded_raster_with(
    data_type: DataType,
    width: i32,
    height: i32,
    scanline_stride: i32,
    bank_indices: Vec<usize>,
    band_offsets: Vec<i32>,
    location: Option<(i32, i32)>,
) -> Result<Raster> {
    let banks = bank_indices.iter().copied().max().map_or(0, |b| b + 1);
    let size = max_offset(&band_offsets)
        + i64::from(scanline_stride) * (i64::from(height) - 1)
        + i64::from(width);
    let sm = BandedSampleModel::with_layout(
        data_type,
        width,
        height,
        scanline_stride,
        bank_indices,
        band_offsets,
    )?;
    let buffer = Arc::new(DataBuffer::new(data_type, buffer_len(size)?, banks)?);
    debug!(%data_type, width, height, scanline_stride, banks, "create_banded_raster");
    Raster::new(sm.into(), buffer, location.unwrap_or((0, 0)))
}

/// Banded raster over an existing buffer.
pub fn create_banded_raster_from(
    buffer: Arc<DataBuffer>,
    width: i32,
    height: i32,
    scanline_stride: i32,
    bank_indices: Vec<usize>,
    band_offsets: Vec<i32>,
    location: Option<(i32, i32)>,
) -> Result<Raster> {
    let sm = BandedSampleModel::with_layout(
        buffer.data_type(),
        width,
        height,
        scanline_stride,
        bank_indices,
        band_offsets,
    )?;
    Raster::new(sm.into(), buffer, location.unwrap_or((0, 0)))
}

/// Single-element packed raster with one band per mask.
pub fn create_packed_raster(
    data_type: DataType,
    width: i32,
    height: i32,
    bit_masks: &[u32],
    location: Option<(i32, i32)>,
) -> Result<Raster> {
    let sm = PackedSampleModel::new(data_type, width, height, bit_masks)?;
    Raster::with_new_buffer(sm.into(), location.unwrap_or((0, 0)))
}

/// Packed raster of `bands` equal-width fields, band 0 in the highest bits.
///
/// # Errors
///
/// [`Error::InvalidConfiguration`] if `bands` or `bits_per_band` is zero or
/// the fields do not fit the data type. [`Error::UnsupportedOperation`] for a
/// single band, which would need several pixels per element.
pub fn create_packed_raster_bits(
    data_type: DataType,
    width: i32,
    height: i32,
    bands: usize,
    bits_per_band: u32,
    location: Option<(i32, i32)>,
) -> Result<Raster> {
    if bands == 0 {
        return Err(Error::invalid_config(format!("number of bands ({bands}) must be greater than 0")));
    }
    if bits_per_band == 0 {
        return Err(Error::invalid_config("bits per band must be greater than 0"));
    }
    if bands == 1 {
        return Err(Error::unsupported(
            "create_packed_raster_bits",
            "one band per element needs a multi-pixel packed layout",
        ));
    }
    let total = (bands as u64) * u64::from(bits_per_band);
    if total > u64::from(data_type.bits()) {
        return Err(Error::invalid_config(format!(
            "bits per band ({bits_per_band}) * bands ({bands}) is greater than data type size"
        )));
    }
    let mask = (1u32 << bits_per_band) - 1;
    let mut shift = (bands as u32 - 1) * bits_per_band;
    let mut masks = Vec::with_capacity(bands);
    for _ in 0..bands {
        masks.push(mask << shift);
        shift = shift.saturating_sub(bits_per_band);
    }
    create_packed_raster(data_type, width, height, &masks, location)
}

/// Packed raster over an existing buffer.
pub fn create_packed_raster_from(
    buffer: Arc<DataBuffer>,
    width: i32,
    height: i32,
    scanline_stride: i32,
    bit_masks: &[u32],
    location: Option<(i32, i32)>,
) -> Result<Raster> {
    let sm = PackedSampleModel::with_stride(buffer.data_type(), width, height, scanline_stride, bit_masks)?;
    Raster::new(sm.into(), buffer, location.unwrap_or((0, 0)))
}

/// Raster binding `sample_model` to `buffer`.
pub fn create_raster(
    sample_model: SampleModel,
    buffer: Arc<DataBuffer>,
    location: Option<(i32, i32)>,
) -> Result<Raster> {
    Raster::new(sample_model, buffer, location.unwrap_or((0, 0)))
}

/// Raster over a fresh buffer created by `sample_model`.
pub fn create_writable_raster(sample_model: SampleModel, location: Option<(i32, i32)>) -> Result<Raster> {
    Raster::with_new_buffer(sample_model, location.unwrap_or((0, 0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interleaved_defaults() {
        let r = create_interleaved_raster(DataType::Byte, 3, 2, 4, Some((1, 1))).unwrap();
        let c = r.sample_model().as_component().unwrap();
        assert_eq!(c.pixel_stride(), 4);
        assert_eq!(c.scanline_stride(), 12);
        assert_eq!(c.band_offsets(), &[0, 1, 2, 3]);
        assert_eq!(r.data_buffer().size(), 24);
        r.set_pixel(3, 2, &[1, 2, 3, 4]).unwrap();
        assert_eq!(r.data_buffer().bank_to_vec(0).unwrap()[20..], [1, 2, 3, 4]);
    }

    #[test]
    fn test_interleaved_explicit_size() {
        let r = create_interleaved_raster_with(DataType::UShort, 4, 3, 20, 3, vec![2, 1, 0], None).unwrap();
        assert_eq!(r.data_buffer().size(), 2 + 40 + 9 + 1);
        assert_eq!(r.transfer_type(), DataType::UShort);
    }

    #[test]
    fn test_banded() {
        let r = create_banded_raster(DataType::Int, 4, 2, 3, None).unwrap();
        assert_eq!(r.data_buffer().num_banks(), 3);
        assert_eq!(r.data_buffer().size(), 8);
        r.set_pixel(1, 1, &[-1, 7, 9]).unwrap();
        assert_eq!(r.data_buffer().elem(1, 5).unwrap(), 7);

        let r = create_banded_raster_with(DataType::Byte, 2, 2, 3, vec![2, 0], vec![1, 0], None).unwrap();
        assert_eq!(r.data_buffer().num_banks(), 3);
        assert_eq!(r.data_buffer().size(), 1 + 3 + 2);
        assert!(create_banded_raster(DataType::Byte, 2, 2, 0, None).unwrap_err().is_config_error());
    }

    #[test]
    fn test_packed_bits_per_band() {
        let r = create_packed_raster_bits(DataType::Int, 2, 2, 3, 8, None).unwrap();
        let p = r.sample_model().as_packed().unwrap();
        assert_eq!(p.bit_masks(), vec![0xff0000, 0xff00, 0xff]);

        let r = create_packed_raster_bits(DataType::UShort, 2, 2, 4, 4, None).unwrap();
        assert_eq!(r.sample_model().as_packed().unwrap().bit_masks(), vec![0xf000, 0x0f00, 0x00f0, 0x000f]);

        assert!(create_packed_raster_bits(DataType::Byte, 2, 2, 3, 3, None).unwrap_err().is_config_error());
        assert!(create_packed_raster_bits(DataType::Byte, 2, 2, 0, 3, None).unwrap_err().is_config_error());
        assert!(create_packed_raster_bits(DataType::Byte, 2, 2, 2, 0, None).unwrap_err().is_config_error());
        assert!(create_packed_raster_bits(DataType::Byte, 2, 2, 1, 1, None).unwrap_err().is_unsupported());
    }

    #[test]
    fn test_from_buffer() {
        let buffer = Arc::new(DataBuffer::from_u8_banks(vec![(0..12).collect()]).unwrap());
        let r = create_interleaved_raster_from(Arc::clone(&buffer), 2, 2, 6, 3, vec![0, 1, 2], None).unwrap();
        assert_eq!(r.get_pixel(1, 1).unwrap(), vec![9, 10, 11]);

        let r = create_packed_raster_from(Arc::clone(&buffer), 3, 4, 3, &[0xf0, 0x0f], None).unwrap();
        assert_eq!(r.get_pixel(2, 3).unwrap(), vec![0, 11]);

        let r = create_banded_raster_from(buffer, 3, 2, 3, vec![0, 0], vec![0, 6], None).unwrap();
        assert_eq!(r.get_pixel(0, 1).unwrap(), vec![3, 9]);
        assert!(create_banded_raster_from(
            Arc::new(DataBuffer::new(DataType::Byte, 4, 1).unwrap()),
            3,
            2,
            3,
            vec![0],
            vec![0],
            None
        )
        .unwrap_err()
        .is_format_mismatch());
    }
}
