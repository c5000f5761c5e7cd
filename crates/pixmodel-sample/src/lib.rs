//! # pixmodel-sample
//!
//! Sample models: where the samples of a pixel live inside a [`DataBuffer`].
//!
//! A sample model knows nothing about color. It maps `(x, y, band)` to a bank
//! and element index (or to a bitfield of an element) and moves integer
//! samples in and out of the buffer.
//!
//! # Variants
//!
//! | Variant | Layout |
//! |---------|--------|
//! | [`SampleModel::Component`] | arbitrary pixel/scanline strides, per-band bank and offset |
//! | [`SampleModel::Banded`] | pixel stride 1, bands in separate planes |
//! | [`SampleModel::PixelInterleaved`] | one bank, bands adjacent per pixel |
//! | [`SampleModel::Packed`] | one element per pixel, bands as bitfields |
//!
//! # Usage
//!
//! ```rust
//! use pixmodel_core::DataType;
//! use pixmodel_sample::{PixelInterleavedSampleModel, SampleModel};
//!
//! let sm: SampleModel =
//!     PixelInterleavedSampleModel::new(DataType::Byte, 4, 4, 3, 12, vec![0, 1, 2]).unwrap().into();
//! let buf = sm.create_data_buffer().unwrap();
//!
//! sm.set_pixel(1, 2, &[10, 20, 30], &buf).unwrap();
//! assert_eq!(sm.get_pixel(1, 2, &buf).unwrap(), vec![10, 20, 30]);
//!
//! let bgr = sm.create_subset_sample_model(&[2, 1, 0]).unwrap();
//! assert_eq!(bgr.get_pixel(1, 2, &buf).unwrap(), vec![30, 20, 10]);
//! ```
//!
//! # Dependencies
//!
//! - `pixmodel-core` - Buffers, data types and errors
//! - [`tracing`] - Construction events
//!
//! # Used By
//!
//! - `pixmodel-raster` - Every raster owns one sample model
//! - `pixmodel-color` - Compatible layouts for color models

#![warn(missing_docs)]

pub mod banded;
pub mod component;
pub mod interleaved;
pub mod packed;

pub use banded::BandedSampleModel;
pub use component::{ComponentSampleModel, Layout, compatible_layout, order_bands};
pub use interleaved::PixelInterleavedSampleModel;
pub use packed::PackedSampleModel;

use pixmodel_core::{DataBuffer, DataType, Error, Result, TransferData, ensure_len};

/// Numeric types samples can be read and written as.
///
/// Integer samples widen exactly. Writes from floating point truncate toward
/// zero before the element width is applied.
pub trait SampleValue: Copy + Default {
    /// Converts a stored sample.
    fn from_sample(sample: i32) -> Self;
    /// Converts to a sample for storage.
    fn to_sample(self) -> i32;
}

impl SampleValue for i32 {
    #[inline]
    fn from_sample(sample: i32) -> Self {
        sample
    }
    #[inline]
    fn to_sample(self) -> i32 {
        self
    }
}

impl SampleValue for f32 {
    #[inline]
    fn from_sample(sample: i32) -> Self {
        sample as f32
    }
    #[inline]
    fn to_sample(self) -> i32 {
        self as i32
    }
}

impl SampleValue for f64 {
    #[inline]
    fn from_sample(sample: i32) -> Self {
        f64::from(sample)
    }
    #[inline]
    fn to_sample(self) -> i32 {
        self as i32
    }
}

/// Element addressing shared by the variants.
enum Addressing<'a> {
    Component(&'a ComponentSampleModel),
    Packed(&'a PackedSampleModel),
}

/// How the samples of a pixel region are laid out in a data buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleModel {
    /// General stride/offset layout.
    Component(ComponentSampleModel),
    /// Planar layout.
    Banded(BandedSampleModel),
    /// Interleaved single-bank layout.
    PixelInterleaved(PixelInterleavedSampleModel),
    /// Bitfield-per-band layout.
    Packed(PackedSampleModel),
}

impl From<ComponentSampleModel> for SampleModel {
    fn from(sm: ComponentSampleModel) -> Self {
        Self::Component(sm)
    }
}

impl From<BandedSampleModel> for SampleModel {
    fn from(sm: BandedSampleModel) -> Self {
        Self::Banded(sm)
    }
}

impl From<PixelInterleavedSampleModel> for SampleModel {
    fn from(sm: PixelInterleavedSampleModel) -> Self {
        Self::PixelInterleaved(sm)
    }
}

impl From<PackedSampleModel> for SampleModel {
    fn from(sm: PackedSampleModel) -> Self {
        Self::Packed(sm)
    }
}

impl SampleModel {
    /// Stride/offset view of component-style models; `None` for packed.
    pub fn as_component(&self) -> Option<&ComponentSampleModel> {
        match self {
            Self::Component(c) => Some(c),
            Self::Banded(b) => Some(b.as_component()),
            Self::PixelInterleaved(p) => Some(p.as_component()),
            Self::Packed(_) => None,
        }
    }

    /// The packed model, if this is one.
    pub fn as_packed(&self) -> Option<&PackedSampleModel> {
        match self {
            Self::Packed(p) => Some(p),
            _ => None,
        }
    }

    /// Variant name, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Component(_) => "component",
            Self::Banded(_) => "banded",
            Self::PixelInterleaved(_) => "pixel-interleaved",
            Self::Packed(_) => "packed",
        }
    }

    /// Element type of the data buffer.
    pub fn data_type(&self) -> DataType {
        match self.addressing() {
            Addressing::Packed(p) => p.data_type(),
            Addressing::Component(c) => c.data_type(),
        }
    }

    /// Element type used by [`get_data_elements`](Self::get_data_elements).
    ///
    /// Always equal to [`data_type`](Self::data_type).
    pub fn transfer_type(&self) -> DataType {
        self.data_type()
    }

    /// Width in pixels.
    pub fn width(&self) -> i32 {
        match self.addressing() {
            Addressing::Packed(p) => p.width(),
            Addressing::Component(c) => c.width(),
        }
    }

    /// Height in pixels.
    pub fn height(&self) -> i32 {
        match self.addressing() {
            Addressing::Packed(p) => p.height(),
            Addressing::Component(c) => c.height(),
        }
    }

    /// Number of bands.
    pub fn num_bands(&self) -> usize {
        match self.addressing() {
            Addressing::Packed(p) => p.num_bands(),
            Addressing::Component(c) => c.num_bands(),
        }
    }

    /// Elements per pixel in the native transfer representation.
    pub fn num_data_elements(&self) -> usize {
        match self {
            Self::Packed(_) => 1,
            _ => self.num_bands(),
        }
    }

    /// Significant bits of `band`.
    pub fn sample_size(&self, band: usize) -> Result<u32> {
        match self.addressing() {
            Addressing::Packed(p) => Ok(p.field(band)?.bits),
            _ if band < self.num_bands() => Ok(self.data_type().bits()),
            _ => Err(Error::out_of_range(
                "band",
                band as i64,
                self.num_bands() as i64,
            )),
        }
    }

    /// Significant bits of every band.
    pub fn sample_sizes(&self) -> Vec<u32> {
        (0..self.num_bands())
            .map(|b| self.sample_size(b).unwrap_or(0))
            .collect()
    }

    /// Minimum elements per bank for [`create_data_buffer`](Self::create_data_buffer).
    pub fn buffer_size(&self) -> i64 {
        match self.addressing() {
            Addressing::Packed(p) => p.buffer_size(),
            Addressing::Component(c) => c.buffer_size(),
        }
    }

    fn addressing(&self) -> Addressing<'_> {
        match self {
            Self::Component(c) => Addressing::Component(c),
            Self::Banded(b) => Addressing::Component(b.as_component()),
            Self::PixelInterleaved(p) => Addressing::Component(p.as_component()),
            Self::Packed(p) => Addressing::Packed(p),
        }
    }

    fn check_rect(&self, x: i32, y: i32, w: i32, h: i32) -> Result<usize> {
        if w < 0 {
            return Err(Error::out_of_range("w", w.into(), self.width().into()));
        }
        if h < 0 {
            return Err(Error::out_of_range("h", h.into(), self.height().into()));
        }
        if x < 0 || i64::from(x) + i64::from(w) > i64::from(self.width()) {
            return Err(Error::out_of_range("x", x.into(), self.width().into()));
        }
        if y < 0 || i64::from(y) + i64::from(h) > i64::from(self.height()) {
            return Err(Error::out_of_range("y", y.into(), self.height().into()));
        }
        Ok(w as usize * h as usize)
    }

    // ------------------------------------------------------------------
    // Single samples
    // ------------------------------------------------------------------

    /// Reads the sample of `band` at (x, y).
    #[inline]
    pub fn get_sample(&self, x: i32, y: i32, band: usize, data: &DataBuffer) -> Result<i32> {
        match self.addressing() {
            Addressing::Packed(p) => p.get_sample(x, y, band, data),
            Addressing::Component(c) => c.get_sample(x, y, band, data),
        }
    }

    /// Writes the sample of `band` at (x, y).
    #[inline]
    pub fn set_sample(&self, x: i32, y: i32, band: usize, value: i32, data: &DataBuffer) -> Result<()> {
        match self.addressing() {
            Addressing::Packed(p) => p.set_sample(x, y, band, value, data),
            Addressing::Component(c) => c.set_sample(x, y, band, value, data),
        }
    }

    /// Reads one sample as `f32`.
    pub fn get_sample_f32(&self, x: i32, y: i32, band: usize, data: &DataBuffer) -> Result<f32> {
        self.get_sample(x, y, band, data).map(f32::from_sample)
    }

    /// Reads one sample as `f64`.
    pub fn get_sample_f64(&self, x: i32, y: i32, band: usize, data: &DataBuffer) -> Result<f64> {
        self.get_sample(x, y, band, data).map(f64::from_sample)
    }

    /// Writes one sample from `f32`, truncating toward zero.
    pub fn set_sample_f32(&self, x: i32, y: i32, band: usize, value: f32, data: &DataBuffer) -> Result<()> {
        self.set_sample(x, y, band, value.to_sample(), data)
    }

    /// Writes one sample from `f64`, truncating toward zero.
    pub fn set_sample_f64(&self, x: i32, y: i32, band: usize, value: f64, data: &DataBuffer) -> Result<()> {
        self.set_sample(x, y, band, value.to_sample(), data)
    }

    // ------------------------------------------------------------------
    // Pixels
    // ------------------------------------------------------------------

    /// Reads all bands of pixel (x, y) into `out[..num_bands]`.
    pub fn get_pixel_into<T: SampleValue>(&self, x: i32, y: i32, out: &mut [T], data: &DataBuffer) -> Result<()> {
        ensure_len(self.num_bands(), out.len())?;
        for (band, slot) in out.iter_mut().take(self.num_bands()).enumerate() {
            *slot = T::from_sample(self.get_sample(x, y, band, data)?);
        }
        Ok(())
    }

    /// Reads all bands of pixel (x, y).
    pub fn get_pixel(&self, x: i32, y: i32, data: &DataBuffer) -> Result<Vec<i32>> {
        self.get_pixel_as(x, y, data)
    }

    /// Reads all bands of pixel (x, y) as `f32`.
    pub fn get_pixel_f32(&self, x: i32, y: i32, data: &DataBuffer) -> Result<Vec<f32>> {
        self.get_pixel_as(x, y, data)
    }

    /// Reads all bands of pixel (x, y) as `f64`.
    pub fn get_pixel_f64(&self, x: i32, y: i32, data: &DataBuffer) -> Result<Vec<f64>> {
        self.get_pixel_as(x, y, data)
    }

    fn get_pixel_as<T: SampleValue>(&self, x: i32, y: i32, data: &DataBuffer) -> Result<Vec<T>> {
        let mut out = vec![T::default(); self.num_bands()];
        self.get_pixel_into(x, y, &mut out, data)?;
        Ok(out)
    }

    /// Writes all bands of pixel (x, y) from `pixel[..num_bands]`.
    pub fn set_pixel<T: SampleValue>(&self, x: i32, y: i32, pixel: &[T], data: &DataBuffer) -> Result<()> {
        ensure_len(self.num_bands(), pixel.len())?;
        for (band, &value) in pixel.iter().take(self.num_bands()).enumerate() {
            self.set_sample(x, y, band, value.to_sample(), data)?;
        }
        Ok(())
    }

    /// Reads a `w x h` region into `out`, laid out
    /// `out[(row * w + col) * num_bands + band]`.
    pub fn get_pixels_into<T: SampleValue>(
        &self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        out: &mut [T],
        data: &DataBuffer,
    ) -> Result<()> {
        let bands = self.num_bands();
        let count = self.check_rect(x, y, w, h)?;
        ensure_len(count * bands, out.len())?;
        let mut i = 0;
        for py in y..y + h {
            for px in x..x + w {
                self.get_pixel_into(px, py, &mut out[i..i + bands], data)?;
                i += bands;
            }
        }
        Ok(())
    }

    /// Reads a `w x h` region, pixel-major.
    pub fn get_pixels(&self, x: i32, y: i32, w: i32, h: i32, data: &DataBuffer) -> Result<Vec<i32>> {
        self.get_pixels_as(x, y, w, h, data)
    }

    /// Reads a region as `f32`.
    pub fn get_pixels_f32(&self, x: i32, y: i32, w: i32, h: i32, data: &DataBuffer) -> Result<Vec<f32>> {
        self.get_pixels_as(x, y, w, h, data)
    }

    /// Reads a region as `f64`.
    pub fn get_pixels_f64(&self, x: i32, y: i32, w: i32, h: i32, data: &DataBuffer) -> Result<Vec<f64>> {
        self.get_pixels_as(x, y, w, h, data)
    }

    fn get_pixels_as<T: SampleValue>(&self, x: i32, y: i32, w: i32, h: i32, data: &DataBuffer) -> Result<Vec<T>> {
        let count = self.check_rect(x, y, w, h)?;
        let mut out = vec![T::default(); count * self.num_bands()];
        self.get_pixels_into(x, y, w, h, &mut out, data)?;
        Ok(out)
    }

    /// Writes a `w x h` region from pixel-major `pixels`.
    pub fn set_pixels<T: SampleValue>(
        &self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        pixels: &[T],
        data: &DataBuffer,
    ) -> Result<()> {
        let bands = self.num_bands();
        let count = self.check_rect(x, y, w, h)?;
        ensure_len(count * bands, pixels.len())?;
        let mut i = 0;
        for py in y..y + h {
            for px in x..x + w {
                self.set_pixel(px, py, &pixels[i..i + bands], data)?;
                i += bands;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Single-band regions
    // ------------------------------------------------------------------

    /// Reads `band` over a `w x h` region into `out[row * w + col]`.
    #[allow(clippy::too_many_arguments)]
    pub fn get_samples_into<T: SampleValue>(
        &self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        band: usize,
        out: &mut [T],
        data: &DataBuffer,
    ) -> Result<()> {
        let count = self.check_rect(x, y, w, h)?;
        ensure_len(count, out.len())?;
        let mut i = 0;
        for py in y..y + h {
            for px in x..x + w {
                out[i] = T::from_sample(self.get_sample(px, py, band, data)?);
                i += 1;
            }
        }
        Ok(())
    }

    /// Reads `band` over a region.
    pub fn get_samples(&self, x: i32, y: i32, w: i32, h: i32, band: usize, data: &DataBuffer) -> Result<Vec<i32>> {
        self.get_samples_as(x, y, w, h, band, data)
    }

    /// Reads `band` over a region as `f32`.
    pub fn get_samples_f32(&self, x: i32, y: i32, w: i32, h: i32, band: usize, data: &DataBuffer) -> Result<Vec<f32>> {
        self.get_samples_as(x, y, w, h, band, data)
    }

    /// Reads `band` over a region as `f64`.
    pub fn get_samples_f64(&self, x: i32, y: i32, w: i32, h: i32, band: usize, data: &DataBuffer) -> Result<Vec<f64>> {
        self.get_samples_as(x, y, w, h, band, data)
    }

    fn get_samples_as<T: SampleValue>(
        &self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        band: usize,
        data: &DataBuffer,
    ) -> Result<Vec<T>> {
        let count = self.check_rect(x, y, w, h)?;
        let mut out = vec![T::default(); count];
        self.get_samples_into(x, y, w, h, band, &mut out, data)?;
        Ok(out)
    }

    /// Writes `band` over a `w x h` region from `samples[row * w + col]`.
    #[allow(clippy::too_many_arguments)]
    pub fn set_samples<T: SampleValue>(
        &self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        band: usize,
        samples: &[T],
        data: &DataBuffer,
    ) -> Result<()> {
        let count = self.check_rect(x, y, w, h)?;
        ensure_len(count, samples.len())?;
        let mut i = 0;
        for py in y..y + h {
            for px in x..x + w {
                self.set_sample(px, py, band, samples[i].to_sample(), data)?;
                i += 1;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Native transfer
    // ------------------------------------------------------------------

    fn get_data_element(&self, x: i32, y: i32, i: usize, data: &DataBuffer) -> Result<i32> {
        match self.addressing() {
            Addressing::Packed(p) => p.get_element(x, y, data),
            Addressing::Component(c) => c.get_sample(x, y, i, data),
        }
    }

    fn set_data_element(&self, x: i32, y: i32, i: usize, value: i32, data: &DataBuffer) -> Result<()> {
        match self.addressing() {
            Addressing::Packed(p) => p.set_element(x, y, value, data),
            Addressing::Component(c) => c.set_sample(x, y, i, value, data),
        }
    }

    /// Reads pixel (x, y) in native form into the start of `out`.
    ///
    /// `out` must use the transfer type and hold at least
    /// [`num_data_elements`](Self::num_data_elements) elements.
    pub fn get_data_elements_into(&self, x: i32, y: i32, out: &mut TransferData, data: &DataBuffer) -> Result<()> {
        let n = self.num_data_elements();
        out.expect_shape(self.transfer_type(), n)?;
        for i in 0..n {
            out.set(i, self.get_data_element(x, y, i, data)?)?;
        }
        Ok(())
    }

    /// Reads pixel (x, y) in native form.
    pub fn get_data_elements(&self, x: i32, y: i32, data: &DataBuffer) -> Result<TransferData> {
        let mut out = TransferData::new(self.transfer_type(), self.num_data_elements());
        self.get_data_elements_into(x, y, &mut out, data)?;
        Ok(out)
    }

    /// Writes pixel (x, y) from native form.
    pub fn set_data_elements(&self, x: i32, y: i32, pixel: &TransferData, data: &DataBuffer) -> Result<()> {
        let n = self.num_data_elements();
        pixel.expect_shape(self.transfer_type(), n)?;
        for i in 0..n {
            self.set_data_element(x, y, i, pixel.get(i)?, data)?;
        }
        Ok(())
    }

    /// Reads a `w x h` region in native form, pixel-major.
    pub fn get_data_elements_rect(&self, x: i32, y: i32, w: i32, h: i32, data: &DataBuffer) -> Result<TransferData> {
        let n = self.num_data_elements();
        let count = self.check_rect(x, y, w, h)?;
        let mut out = TransferData::new(self.transfer_type(), count * n);
        let mut i = 0;
        for py in y..y + h {
            for px in x..x + w {
                for e in 0..n {
                    out.set(i, self.get_data_element(px, py, e, data)?)?;
                    i += 1;
                }
            }
        }
        Ok(out)
    }

    /// Writes a `w x h` region from pixel-major native data.
    pub fn set_data_elements_rect(
        &self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        pixels: &TransferData,
        data: &DataBuffer,
    ) -> Result<()> {
        let n = self.num_data_elements();
        let count = self.check_rect(x, y, w, h)?;
        pixels.expect_shape(self.transfer_type(), count * n)?;
        let mut i = 0;
        for py in y..y + h {
            for px in x..x + w {
                for e in 0..n {
                    self.set_data_element(px, py, e, pixels.get(i)?, data)?;
                    i += 1;
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Derived models
    // ------------------------------------------------------------------

    /// Same variant, band count and data type at a new size.
    ///
    /// Strides and offsets are recomputed to the most compact layout that
    /// keeps the relative order of bands.
    pub fn create_compatible_sample_model(&self, width: i32, height: i32) -> Result<SampleModel> {
        Ok(match self {
            Self::Component(c) => c.create_compatible(width, height)?.into(),
            Self::Banded(b) => b.create_compatible(width, height)?.into(),
            Self::PixelInterleaved(p) => p.create_compatible(width, height)?.into(),
            Self::Packed(p) => p.create_compatible(width, height)?.into(),
        })
    }

    /// Model exposing `bands` (indices into the current bands, in order).
    ///
    /// The subset addresses the same buffer as `self`.
    pub fn create_subset_sample_model(&self, bands: &[usize]) -> Result<SampleModel> {
        Ok(match self {
            Self::Component(c) => c.create_subset(bands)?.into(),
            Self::Banded(b) => b.create_subset(bands)?.into(),
            Self::PixelInterleaved(p) => p.create_subset(bands)?.into(),
            Self::Packed(p) => p.create_subset(bands)?.into(),
        })
    }

    /// Allocates a zeroed buffer large enough for every address of this model.
    pub fn create_data_buffer(&self) -> Result<DataBuffer> {
        match self {
            Self::Component(c) => c.create_data_buffer(),
            Self::Banded(b) => b.create_data_buffer(),
            Self::PixelInterleaved(p) => p.as_component().create_data_buffer(),
            Self::Packed(p) => p.create_data_buffer(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn interleaved() -> SampleModel {
        PixelInterleavedSampleModel::new(DataType::Byte, 3, 2, 3, 9, vec![0, 1, 2])
            .unwrap()
            .into()
    }

    #[test]
    fn test_pixels_layout() {
        let sm = interleaved();
        let buf = sm.create_data_buffer().unwrap();
        let src: Vec<i32> = (0..18).collect();
        sm.set_pixels(0, 0, 3, 2, &src, &buf).unwrap();
        assert_eq!(buf.bank_to_vec(0).unwrap(), src);
        assert_eq!(sm.get_pixels(1, 1, 2, 1, &buf).unwrap(), vec![12, 13, 14, 15, 16, 17]);
        assert_eq!(sm.get_samples(0, 0, 3, 2, 1, &buf).unwrap(), vec![1, 4, 7, 10, 13, 16]);
    }

    #[test]
    fn test_region_bounds() {
        let sm = interleaved();
        let buf = sm.create_data_buffer().unwrap();
        assert!(sm.get_pixels(2, 0, 2, 1, &buf).unwrap_err().is_range_error());
        assert!(sm.get_pixels(0, 0, -1, 1, &buf).unwrap_err().is_range_error());
        assert!(sm.get_pixels(0, 0, 0, 0, &buf).unwrap().is_empty());
        let mut short = [0i32; 2];
        assert_eq!(
            sm.get_pixel_into(0, 0, &mut short, &buf),
            Err(Error::buffer_too_small(3, 2))
        );
        assert!(sm.set_pixels(0, 0, 3, 2, &[0i32; 17], &buf).unwrap_err().is_range_error());
    }

    #[test]
    fn test_float_access() {
        let sm = interleaved();
        let buf = sm.create_data_buffer().unwrap();
        sm.set_sample_f32(0, 0, 0, 99.75, &buf).unwrap();
        sm.set_pixel(1, 0, &[1.9f64, 2.1, 300.0], &buf).unwrap();
        assert_eq!(sm.get_sample(0, 0, 0, &buf).unwrap(), 99);
        assert_eq!(sm.get_pixel(1, 0, &buf).unwrap(), vec![1, 2, 44]);
        assert_abs_diff_eq!(sm.get_sample_f64(1, 0, 1, &buf).unwrap(), 2.0);
        assert_eq!(sm.get_pixel_f32(1, 0, &buf).unwrap(), vec![1.0, 2.0, 44.0]);
    }

    #[test]
    fn test_data_elements_component() {
        let sm = interleaved();
        let buf = sm.create_data_buffer().unwrap();
        sm.set_pixel(2, 1, &[7, 8, 9], &buf).unwrap();
        let px = sm.get_data_elements(2, 1, &buf).unwrap();
        assert_eq!(px, TransferData::Byte(vec![7, 8, 9]));

        let other = sm.create_data_buffer().unwrap();
        sm.set_data_elements(0, 0, &px, &other).unwrap();
        assert_eq!(sm.get_pixel(0, 0, &other).unwrap(), vec![7, 8, 9]);

        let wrong = TransferData::Int(vec![0; 3]);
        assert!(sm.set_data_elements(0, 0, &wrong, &other).unwrap_err().is_format_mismatch());
    }

    #[test]
    fn test_data_elements_packed() {
        let sm: SampleModel = PackedSampleModel::new(DataType::Int, 2, 2, &[0xff0000, 0xff00, 0xff])
            .unwrap()
            .into();
        assert_eq!(sm.num_data_elements(), 1);
        assert_eq!(sm.sample_sizes(), vec![8, 8, 8]);
        let buf = sm.create_data_buffer().unwrap();
        sm.set_pixel(1, 0, &[0x12, 0x34, 0x56], &buf).unwrap();
        assert_eq!(sm.get_data_elements(1, 0, &buf).unwrap(), TransferData::Int(vec![0x123456]));

        let rect = sm.get_data_elements_rect(0, 0, 2, 1, &buf).unwrap();
        assert_eq!(rect, TransferData::Int(vec![0, 0x123456]));
        sm.set_data_elements_rect(0, 1, 2, 1, &rect, &buf).unwrap();
        assert_eq!(sm.get_pixel(1, 1, &buf).unwrap(), vec![0x12, 0x34, 0x56]);
    }

    #[test]
    fn test_sample_size() {
        let sm: SampleModel = BandedSampleModel::new(DataType::UShort, 2, 2, 2).unwrap().into();
        assert_eq!(sm.sample_size(1).unwrap(), 16);
        assert!(sm.sample_size(2).unwrap_err().is_range_error());
        assert_eq!(sm.kind_name(), "banded");
        assert!(sm.as_packed().is_none());
        assert_eq!(sm.as_component().map(|c| c.num_banks()), Some(2));
    }
}
