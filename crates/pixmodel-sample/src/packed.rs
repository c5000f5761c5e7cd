//! Single-element packed layout: every band is a bitfield of one element.
//!
//! ```text
//! element = data[y * scanline_stride + x]
//! sample  = (element & mask[band]) >> offset[band]
//! ```

use pixmodel_core::{DataBuffer, DataType, Error, MaskField, Result, validate_masks};
use tracing::debug;

use crate::component::{check_dimensions, to_i32};

/// Layout packing all bands of a pixel into one data element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedSampleModel {
    data_type: DataType,
    width: i32,
    height: i32,
    scanline_stride: i32,
    fields: Vec<MaskField>,
}

fn band_names(n: usize) -> Vec<String> {
    (0..n).map(|b| format!("band {b}")).collect()
}

impl PackedSampleModel {
    /// Packed model with scanline stride `width`.
    pub fn new(data_type: DataType, width: i32, height: i32, bit_masks: &[u32]) -> Result<Self> {
        Self::with_stride(data_type, width, height, width, bit_masks)
    }

    /// Packed model with an explicit scanline stride.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] for a signed 16-bit data type, no
    /// masks, a non-contiguous or overlapping mask, or a mask wider than the
    /// data type.
    pub fn with_stride(
        data_type: DataType,
        width: i32,
        height: i32,
        scanline_stride: i32,
        bit_masks: &[u32],
    ) -> Result<Self> {
        check_dimensions(width, height)?;
        if data_type == DataType::Short {
            return Err(Error::invalid_config(
                "packed samples need a byte, ushort or int data type",
            ));
        }
        if scanline_stride < 0 {
            return Err(Error::invalid_config("scanline stride must be >= 0"));
        }
        if bit_masks.is_empty() {
            return Err(Error::invalid_config("must have at least one band"));
        }
        let names = band_names(bit_masks.len());
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let fields = validate_masks(bit_masks, &names, data_type.bits())?;
        let model = Self {
            data_type,
            width,
            height,
            scanline_stride,
            fields,
        };
        to_i32(model.buffer_size(), "buffer size")?;
        debug!(%data_type, width, height, scanline_stride, bands = bit_masks.len(), "PackedSampleModel::new");
        Ok(model)
    }

    /// Element type holding each pixel.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Width in pixels.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of bands.
    pub fn num_bands(&self) -> usize {
        self.fields.len()
    }

    /// Elements between vertically adjacent pixels.
    pub fn scanline_stride(&self) -> i32 {
        self.scanline_stride
    }

    /// Mask of each band.
    pub fn bit_masks(&self) -> Vec<u32> {
        self.fields.iter().map(|f| f.mask).collect()
    }

    /// Shift of each band.
    pub fn bit_offsets(&self) -> Vec<u32> {
        self.fields.iter().map(|f| f.offset).collect()
    }

    /// Decomposed field of `band`.
    pub fn field(&self, band: usize) -> Result<&MaskField> {
        self.fields
            .get(band)
            .ok_or_else(|| Error::out_of_range("band", band as i64, self.fields.len() as i64))
    }

    /// Element index of pixel (x, y) without range checks.
    #[inline]
    pub fn offset(&self, x: i32, y: i32) -> i64 {
        i64::from(y) * i64::from(self.scanline_stride) + i64::from(x)
    }

    /// `scanline_stride * (height - 1) + width`.
    pub fn buffer_size(&self) -> i64 {
        i64::from(self.scanline_stride) * i64::from(self.height - 1) + i64::from(self.width)
    }

    #[inline]
    pub(crate) fn locate(&self, x: i32, y: i32) -> Result<usize> {
        if x < 0 || x >= self.width {
            return Err(Error::out_of_range("x", x.into(), self.width.into()));
        }
        if y < 0 || y >= self.height {
            return Err(Error::out_of_range("y", y.into(), self.height.into()));
        }
        let offset = self.offset(x, y);
        usize::try_from(offset)
            .map_err(|_| Error::out_of_range("element index", offset, i64::from(i32::MAX)))
    }

    /// Raw element of pixel (x, y).
    #[inline]
    pub fn get_element(&self, x: i32, y: i32, data: &DataBuffer) -> Result<i32> {
        data.elem(0, self.locate(x, y)?)
    }

    /// Writes the raw element of pixel (x, y).
    #[inline]
    pub fn set_element(&self, x: i32, y: i32, value: i32, data: &DataBuffer) -> Result<()> {
        data.set_elem(0, self.locate(x, y)?, value)
    }

    /// Reads one band's field.
    #[inline]
    pub fn get_sample(&self, x: i32, y: i32, band: usize, data: &DataBuffer) -> Result<i32> {
        let field = self.field(band)?;
        let element = self.get_element(x, y, data)?;
        Ok(field.extract(element as u32) as i32)
    }

    /// Replaces one band's field, leaving the other bands untouched.
    #[inline]
    pub fn set_sample(&self, x: i32, y: i32, band: usize, value: i32, data: &DataBuffer) -> Result<()> {
        let field = self.field(band)?;
        let index = self.locate(x, y)?;
        let element = data.elem(0, index)? as u32;
        data.set_elem(0, index, field.insert(element, value as u32) as i32)
    }

    /// Same masks at a new size with stride `width`.
    pub fn create_compatible(&self, width: i32, height: i32) -> Result<Self> {
        Self::new(self.data_type, width, height, &self.bit_masks())
    }

    /// Selects `bands` into a new packed model.
    ///
    /// Requesting more bands than exist is a format error.
    pub fn create_subset(&self, bands: &[usize]) -> Result<Self> {
        if bands.len() > self.num_bands() {
            return Err(Error::format_mismatch(format!(
                "there are only {} bands",
                self.num_bands()
            )));
        }
        let masks = bands
            .iter()
            .map(|&b| self.field(b).map(|f| f.mask))
            .collect::<Result<Vec<_>>>()?;
        Self::with_stride(self.data_type, self.width, self.height, self.scanline_stride, &masks)
    }

    /// Allocates a single-bank buffer of [`buffer_size`](Self::buffer_size).
    pub fn create_data_buffer(&self) -> Result<DataBuffer> {
        let size = to_i32(self.buffer_size(), "buffer size")?;
        DataBuffer::new(self.data_type, size as usize, 1)
    }
}
