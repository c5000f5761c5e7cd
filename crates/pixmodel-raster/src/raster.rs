//! The [`Raster`] type: pixel-coordinate access to a shared buffer.
//!
//! # Coordinate spaces
//!
//! A raster covers `bounds` in raster space. Its sample model works in its
//! own zero-based space. Every access subtracts the sample model translation:
//!
//! ```text
//! model_x = x - translate_x
//! model_y = y - translate_y
//! ```
//!
//! Child rasters share the parent's [`DataBuffer`] and differ only in bounds,
//! translation and (optionally) band selection.

use std::sync::Arc;

use pixmodel_core::{DataBuffer, DataType, Error, Rect, Result, TransferData};
use pixmodel_sample::{SampleModel, SampleValue};
use tracing::{debug, trace};

/// A sample model bound to a data buffer over a rectangle of pixels.
///
/// Writes go through shared references: the data buffer stores elements in
/// atomic cells, so a raster and all of its children may be used from
/// several threads.
#[derive(Debug, Clone)]
pub struct Raster {
    sample_model: SampleModel,
    data_buffer: Arc<DataBuffer>,
    bounds: Rect,
    translate_x: i32,
    translate_y: i32,
    parent: Option<Arc<Raster>>,
}

fn shifted(value: i32, by: i64, what: &'static str) -> Result<i32> {
    let v = i64::from(value) + by;
    i32::try_from(v).map_err(|_| Error::out_of_range(what, v, i64::from(i32::MAX)))
}

impl Raster {
    /// Raster over the whole sample model with its top-left pixel at `origin`.
    ///
    /// # Errors
    ///
    /// [`Error::FormatMismatch`] if the buffer's element type, bank count or
    /// bank size cannot serve the sample model.
    pub fn new(sample_model: SampleModel, data_buffer: Arc<DataBuffer>, origin: (i32, i32)) -> Result<Self> {
        let bounds = Rect::new(origin.0, origin.1, sample_model.width(), sample_model.height());
        Self::from_parts(sample_model, data_buffer, bounds, origin, None)
    }

    /// Raster over the whole sample model with a freshly allocated buffer.
    pub fn with_new_buffer(sample_model: SampleModel, origin: (i32, i32)) -> Result<Self> {
        let data_buffer = Arc::new(sample_model.create_data_buffer()?);
        Self::new(sample_model, data_buffer, origin)
    }

    fn from_parts(
        sample_model: SampleModel,
        data_buffer: Arc<DataBuffer>,
        bounds: Rect,
        translate: (i32, i32),
        parent: Option<Arc<Raster>>,
    ) -> Result<Self> {
        if data_buffer.data_type() != sample_model.data_type() {
            return Err(Error::format_mismatch(format!(
                "{} data buffer for a {} sample model",
                data_buffer.data_type(),
                sample_model.data_type()
            )));
        }
        let banks = sample_model.as_component().map_or(1, |c| c.num_banks());
        if data_buffer.num_banks() < banks {
            return Err(Error::format_mismatch(format!(
                "data buffer has {} banks, sample model needs {banks}",
                data_buffer.num_banks()
            )));
        }
        if (data_buffer.size() as i64) < sample_model.buffer_size() {
            return Err(Error::format_mismatch(format!(
                "data buffer holds {} elements per bank, sample model needs {}",
                data_buffer.size(),
                sample_model.buffer_size()
            )));
        }
        if bounds.right() - 1 > i64::from(i32::MAX) || bounds.bottom() - 1 > i64::from(i32::MAX) {
            return Err(Error::format_mismatch(format!("raster bounds {bounds} overflow")));
        }
        trace!(
            kind = sample_model.kind_name(),
            x = bounds.x,
            y = bounds.y,
            width = bounds.width,
            height = bounds.height,
            "Raster::new"
        );
        Ok(Self {
            sample_model,
            data_buffer,
            bounds,
            translate_x: translate.0,
            translate_y: translate.1,
            parent,
        })
    }

    /// Bounds in raster coordinates.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Left edge.
    pub fn min_x(&self) -> i32 {
        self.bounds.x
    }

    /// Top edge.
    pub fn min_y(&self) -> i32 {
        self.bounds.y
    }

    /// Width in pixels.
    pub fn width(&self) -> i32 {
        self.bounds.width
    }

    /// Height in pixels.
    pub fn height(&self) -> i32 {
        self.bounds.height
    }

    /// Number of bands.
    pub fn num_bands(&self) -> usize {
        self.sample_model.num_bands()
    }

    /// Elements per pixel in native transfer form.
    pub fn num_data_elements(&self) -> usize {
        self.sample_model.num_data_elements()
    }

    /// Element type used for native transfers.
    pub fn transfer_type(&self) -> DataType {
        self.sample_model.transfer_type()
    }

    /// The layout of this raster.
    pub fn sample_model(&self) -> &SampleModel {
        &self.sample_model
    }

    /// The shared storage.
    pub fn data_buffer(&self) -> &Arc<DataBuffer> {
        &self.data_buffer
    }

    /// Translation from sample model space to raster space.
    pub fn sample_model_translate(&self) -> (i32, i32) {
        (self.translate_x, self.translate_y)
    }

    /// The raster this one was derived from, if any.
    pub fn parent(&self) -> Option<&Raster> {
        self.parent.as_deref()
    }

    fn to_model(&self, x: i32, y: i32) -> Result<(i32, i32)> {
        if x < self.bounds.x || i64::from(x) >= self.bounds.right() {
            return Err(Error::out_of_range("x", x.into(), self.bounds.right()));
        }
        if y < self.bounds.y || i64::from(y) >= self.bounds.bottom() {
            return Err(Error::out_of_range("y", y.into(), self.bounds.bottom()));
        }
        Ok((
            shifted(x, -i64::from(self.translate_x), "x")?,
            shifted(y, -i64::from(self.translate_y), "y")?,
        ))
    }

    fn region_to_model(&self, x: i32, y: i32, w: i32, h: i32) -> Result<(i32, i32)> {
        let region = Rect::new(x, y, w, h);
        if w < 0 || h < 0 || !self.bounds.contains_rect(&region) {
            return Err(Error::out_of_range("x", x.into(), self.bounds.right()));
        }
        Ok((
            shifted(x, -i64::from(self.translate_x), "x")?,
            shifted(y, -i64::from(self.translate_y), "y")?,
        ))
    }

    // ------------------------------------------------------------------
    // Samples
    // ------------------------------------------------------------------

    /// Reads one sample.
    pub fn get_sample(&self, x: i32, y: i32, band: usize) -> Result<i32> {
        let (mx, my) = self.to_model(x, y)?;
        self.sample_model.get_sample(mx, my, band, &self.data_buffer)
    }

    /// Reads one sample as `f32`.
    pub fn get_sample_f32(&self, x: i32, y: i32, band: usize) -> Result<f32> {
        let (mx, my) = self.to_model(x, y)?;
        self.sample_model.get_sample_f32(mx, my, band, &self.data_buffer)
    }

    /// Reads one sample as `f64`.
    pub fn get_sample_f64(&self, x: i32, y: i32, band: usize) -> Result<f64> {
        let (mx, my) = self.to_model(x, y)?;
        self.sample_model.get_sample_f64(mx, my, band, &self.data_buffer)
    }

    /// Writes one sample.
    pub fn set_sample(&self, x: i32, y: i32, band: usize, value: i32) -> Result<()> {
        let (mx, my) = self.to_model(x, y)?;
        self.sample_model.set_sample(mx, my, band, value, &self.data_buffer)
    }

    /// Writes one sample from `f32`, truncating toward zero.
    pub fn set_sample_f32(&self, x: i32, y: i32, band: usize, value: f32) -> Result<()> {
        let (mx, my) = self.to_model(x, y)?;
        self.sample_model.set_sample_f32(mx, my, band, value, &self.data_buffer)
    }

    /// Writes one sample from `f64`, truncating toward zero.
    pub fn set_sample_f64(&self, x: i32, y: i32, band: usize, value: f64) -> Result<()> {
        let (mx, my) = self.to_model(x, y)?;
        self.sample_model.set_sample_f64(mx, my, band, value, &self.data_buffer)
    }

    /// Reads `band` over a region, row-major.
    pub fn get_samples(&self, x: i32, y: i32, w: i32, h: i32, band: usize) -> Result<Vec<i32>> {
        let (mx, my) = self.region_to_model(x, y, w, h)?;
        self.sample_model.get_samples(mx, my, w, h, band, &self.data_buffer)
    }

    /// Reads `band` over a region as `f32`.
    pub fn get_samples_f32(&self, x: i32, y: i32, w: i32, h: i32, band: usize) -> Result<Vec<f32>> {
        let (mx, my) = self.region_to_model(x, y, w, h)?;
        self.sample_model.get_samples_f32(mx, my, w, h, band, &self.data_buffer)
    }

    /// Reads `band` over a region as `f64`.
    pub fn get_samples_f64(&self, x: i32, y: i32, w: i32, h: i32, band: usize) -> Result<Vec<f64>> {
        let (mx, my) = self.region_to_model(x, y, w, h)?;
        self.sample_model.get_samples_f64(mx, my, w, h, band, &self.data_buffer)
    }

    /// Reads `band` over a region into `out`.
    pub fn get_samples_into<T: SampleValue>(
        &self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        band: usize,
        out: &mut [T],
    ) -> Result<()> {
        let (mx, my) = self.region_to_model(x, y, w, h)?;
        self.sample_model.get_samples_into(mx, my, w, h, band, out, &self.data_buffer)
    }

    /// Writes `band` over a region from row-major `samples`.
    pub fn set_samples<T: SampleValue>(&self, x: i32, y: i32, w: i32, h: i32, band: usize, samples: &[T]) -> Result<()> {
        let (mx, my) = self.region_to_model(x, y, w, h)?;
        self.sample_model.set_samples(mx, my, w, h, band, samples, &self.data_buffer)
    }

    // ------------------------------------------------------------------
    // Pixels
    // ------------------------------------------------------------------

    /// Reads all bands of one pixel.
    pub fn get_pixel(&self, x: i32, y: i32) -> Result<Vec<i32>> {
        let (mx, my) = self.to_model(x, y)?;
        self.sample_model.get_pixel(mx, my, &self.data_buffer)
    }

    /// Reads all bands of one pixel as `f32`.
    pub fn get_pixel_f32(&self, x: i32, y: i32) -> Result<Vec<f32>> {
        let (mx, my) = self.to_model(x, y)?;
        self.sample_model.get_pixel_f32(mx, my, &self.data_buffer)
    }

    /// Reads all bands of one pixel as `f64`.
    pub fn get_pixel_f64(&self, x: i32, y: i32) -> Result<Vec<f64>> {
        let (mx, my) = self.to_model(x, y)?;
        self.sample_model.get_pixel_f64(mx, my, &self.data_buffer)
    }

    /// Reads all bands of one pixel into `out`.
    pub fn get_pixel_into<T: SampleValue>(&self, x: i32, y: i32, out: &mut [T]) -> Result<()> {
        let (mx, my) = self.to_model(x, y)?;
        self.sample_model.get_pixel_into(mx, my, out, &self.data_buffer)
    }

    /// Writes all bands of one pixel.
    pub fn set_pixel<T: SampleValue>(&self, x: i32, y: i32, pixel: &[T]) -> Result<()> {
        let (mx, my) = self.to_model(x, y)?;
        self.sample_model.set_pixel(mx, my, pixel, &self.data_buffer)
    }

    /// Reads a region, pixel-major and band-interleaved.
    pub fn get_pixels(&self, x: i32, y: i32, w: i32, h: i32) -> Result<Vec<i32>> {
        let (mx, my) = self.region_to_model(x, y, w, h)?;
        self.sample_model.get_pixels(mx, my, w, h, &self.data_buffer)
    }

    /// Reads a region as `f32`.
    pub fn get_pixels_f32(&self, x: i32, y: i32, w: i32, h: i32) -> Result<Vec<f32>> {
        let (mx, my) = self.region_to_model(x, y, w, h)?;
        self.sample_model.get_pixels_f32(mx, my, w, h, &self.data_buffer)
    }

    /// Reads a region as `f64`.
    pub fn get_pixels_f64(&self, x: i32, y: i32, w: i32, h: i32) -> Result<Vec<f64>> {
        let (mx, my) = self.region_to_model(x, y, w, h)?;
        self.sample_model.get_pixels_f64(mx, my, w, h, &self.data_buffer)
    }

    /// Reads a region into `out`.
    pub fn get_pixels_into<T: SampleValue>(&self, x: i32, y: i32, w: i32, h: i32, out: &mut [T]) -> Result<()> {
        let (mx, my) = self.region_to_model(x, y, w, h)?;
        self.sample_model.get_pixels_into(mx, my, w, h, out, &self.data_buffer)
    }

    /// Writes a region from pixel-major `pixels`.
    pub fn set_pixels<T: SampleValue>(&self, x: i32, y: i32, w: i32, h: i32, pixels: &[T]) -> Result<()> {
        let (mx, my) = self.region_to_model(x, y, w, h)?;
        self.sample_model.set_pixels(mx, my, w, h, pixels, &self.data_buffer)
    }

    // ------------------------------------------------------------------
    // Native transfer
    // ------------------------------------------------------------------

    /// Reads one pixel in native form.
    pub fn get_data_elements(&self, x: i32, y: i32) -> Result<TransferData> {
        let (mx, my) = self.to_model(x, y)?;
        self.sample_model.get_data_elements(mx, my, &self.data_buffer)
    }

    /// Reads one pixel in native form into `out`.
    pub fn get_data_elements_into(&self, x: i32, y: i32, out: &mut TransferData) -> Result<()> {
        let (mx, my) = self.to_model(x, y)?;
        self.sample_model.get_data_elements_into(mx, my, out, &self.data_buffer)
    }

    /// Writes one pixel from native form.
    pub fn set_data_elements(&self, x: i32, y: i32, pixel: &TransferData) -> Result<()> {
        let (mx, my) = self.to_model(x, y)?;
        self.sample_model.set_data_elements(mx, my, pixel, &self.data_buffer)
    }

    /// Reads a region in native form.
    pub fn get_data_elements_rect(&self, x: i32, y: i32, w: i32, h: i32) -> Result<TransferData> {
        let (mx, my) = self.region_to_model(x, y, w, h)?;
        self.sample_model.get_data_elements_rect(mx, my, w, h, &self.data_buffer)
    }

    /// Writes a region from native form.
    pub fn set_data_elements_rect(&self, x: i32, y: i32, w: i32, h: i32, pixels: &TransferData) -> Result<()> {
        let (mx, my) = self.region_to_model(x, y, w, h)?;
        self.sample_model.set_data_elements_rect(mx, my, w, h, pixels, &self.data_buffer)
    }

    // ------------------------------------------------------------------
    // Derived rasters
    // ------------------------------------------------------------------

    /// A view sharing this raster's buffer.
    ///
    /// The region `(parent_x, parent_y, width, height)` of this raster is
    /// exposed with its top-left pixel at `(child_min_x, child_min_y)`. With
    /// `bands`, only the listed bands are visible, in the listed order.
    ///
    /// # Errors
    ///
    /// [`Error::FormatMismatch`] if the region is empty or not inside this
    /// raster's bounds; band subset errors from the sample model.
    #[allow(clippy::too_many_arguments)]
    pub fn create_child(
        &self,
        parent_x: i32,
        parent_y: i32,
        width: i32,
        height: i32,
        child_min_x: i32,
        child_min_y: i32,
        bands: Option<&[usize]>,
    ) -> Result<Raster> {
        if parent_x < self.bounds.x {
            return Err(Error::format_mismatch("parent_x lies outside raster"));
        }
        if parent_y < self.bounds.y {
            return Err(Error::format_mismatch("parent_y lies outside raster"));
        }
        if i64::from(parent_x) + i64::from(width) > self.bounds.right() {
            return Err(Error::format_mismatch("(parent_x + width) is outside raster"));
        }
        if i64::from(parent_y) + i64::from(height) > self.bounds.bottom() {
            return Err(Error::format_mismatch("(parent_y + height) is outside raster"));
        }
        if width <= 0 || height <= 0 {
            return Err(Error::format_mismatch(format!(
                "child region {width}x{height} is empty"
            )));
        }

        // The child keeps the parent strides; only the band list narrows.
        let sample_model = match bands {
            Some(bands) => self.sample_model.create_subset_sample_model(bands)?,
            None => self.sample_model.clone(),
        };
        let dx = i64::from(child_min_x) - i64::from(parent_x);
        let dy = i64::from(child_min_y) - i64::from(parent_y);
        let translate = (
            shifted(self.translate_x, dx, "translate_x")?,
            shifted(self.translate_y, dy, "translate_y")?,
        );
        debug!(parent_x, parent_y, width, height, child_min_x, child_min_y, "Raster::create_child");
        Self::from_parts(
            sample_model,
            Arc::clone(&self.data_buffer),
            Rect::new(child_min_x, child_min_y, width, height),
            translate,
            Some(Arc::new(self.clone())),
        )
    }

    /// Same pixels, bands and buffer at a different location.
    pub fn create_translated_child(&self, child_min_x: i32, child_min_y: i32) -> Result<Raster> {
        self.create_child(
            self.bounds.x,
            self.bounds.y,
            self.bounds.width,
            self.bounds.height,
            child_min_x,
            child_min_y,
            None,
        )
    }

    /// Empty raster of the same size and layout at (0, 0).
    pub fn create_compatible_writable_raster(&self) -> Result<Raster> {
        if self.sample_model.width() == self.width() && self.sample_model.height() == self.height() {
            Self::with_new_buffer(self.sample_model.clone(), (0, 0))
        } else {
            self.create_compatible_writable_raster_sized(self.width(), self.height())
        }
    }

    /// Empty raster of the same layout at a new size, at (0, 0).
    ///
    /// # Errors
    ///
    /// [`Error::FormatMismatch`] if `width` or `height` is not positive.
    pub fn create_compatible_writable_raster_sized(&self, width: i32, height: i32) -> Result<Raster> {
        if width <= 0 || height <= 0 {
            let which = if width <= 0 { "width" } else { "height" };
            return Err(Error::format_mismatch(format!("negative {which}")));
        }
        let sm = self.sample_model.create_compatible_sample_model(width, height)?;
        Self::with_new_buffer(sm, (0, 0))
    }

    /// Empty raster of the same layout covering `(x, y, width, height)`.
    pub fn create_compatible_writable_raster_at(&self, x: i32, y: i32, width: i32, height: i32) -> Result<Raster> {
        let raster = self.create_compatible_writable_raster_sized(width, height)?;
        raster.create_child(0, 0, width, height, x, y, None)
    }
}
