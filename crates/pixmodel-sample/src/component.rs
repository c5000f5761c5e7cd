//! One-element-per-sample layouts addressed by stride arithmetic.
//!
//! # Addressing
//!
//! ```text
//! bank   = bank_indices[band]
//! offset = y * scanline_stride + x * pixel_stride + band_offsets[band]
//! ```
//!
//! Banded and pixel-interleaved layouts are constrained forms of this model
//! and reuse it for every access (see [`crate::banded`] and
//! [`crate::interleaved`]).
//!
//! # Compatible layouts
//!
//! [`compatible_layout`] picks strides for a resized copy of a model by
//! ranking the magnitudes of the pixel stride, the scanline stride and the
//! band offset spread. The largest of the three becomes the outermost
//! dimension in the new layout and the relative order of bands is kept with
//! [`order_bands`].

use pixmodel_core::{DataBuffer, DataType, Error, Result};
use tracing::debug;

/// Layout where every sample occupies one data element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSampleModel {
    pub(crate) data_type: DataType,
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) pixel_stride: i32,
    pub(crate) scanline_stride: i32,
    pub(crate) band_offsets: Vec<i32>,
    pub(crate) bank_indices: Vec<usize>,
    pub(crate) num_banks: usize,
}

/// Converts an `i64` intermediate to `i32`, failing with a configuration error.
pub(crate) fn to_i32(value: i64, what: &str) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| Error::invalid_config(format!("{what} {value} exceeds the addressable range")))
}

/// Checks model dimensions shared by every sample model kind.
pub(crate) fn check_dimensions(width: i32, height: i32) -> Result<()> {
    if width <= 0 || height <= 0 {
        return Err(Error::invalid_config(format!(
            "width ({width}) and height ({height}) must be > 0"
        )));
    }
    if i64::from(width) * i64::from(height) > i64::from(i32::MAX) {
        return Err(Error::invalid_config(format!(
            "dimensions {width}x{height} are too large"
        )));
    }
    Ok(())
}

impl ComponentSampleModel {
    /// Single-bank model: every band lives in bank 0.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] for non-positive dimensions, negative
    /// strides, zero bands or a buffer size beyond `i32::MAX` elements.
    pub fn new(
        data_type: DataType,
        width: i32,
        height: i32,
        pixel_stride: i32,
        scanline_stride: i32,
        band_offsets: Vec<i32>,
    ) -> Result<Self> {
        let bank_indices = vec![0; band_offsets.len()];
        Self::with_banks(
            data_type,
            width,
            height,
            pixel_stride,
            scanline_stride,
            bank_indices,
            band_offsets,
        )
    }

    /// Model with an explicit bank per band.
    ///
    /// `bank_indices` and `band_offsets` must have one entry per band. The
    /// number of banks is `max(bank_indices) + 1`.
    pub fn with_banks(
        data_type: DataType,
        width: i32,
        height: i32,
        pixel_stride: i32,
        scanline_stride: i32,
        bank_indices: Vec<usize>,
        band_offsets: Vec<i32>,
    ) -> Result<Self> {
        check_dimensions(width, height)?;
        if pixel_stride < 0 {
            return Err(Error::invalid_config("pixel stride must be >= 0"));
        }
        if scanline_stride < 0 {
            return Err(Error::invalid_config("scanline stride must be >= 0"));
        }
        if band_offsets.is_empty() {
            return Err(Error::invalid_config("must have at least one band"));
        }
        if band_offsets.len() != bank_indices.len() {
            return Err(Error::invalid_config(format!(
                "{} band offsets for {} bank indices",
                band_offsets.len(),
                bank_indices.len()
            )));
        }
        let max_bank = bank_indices.iter().copied().max().unwrap_or(0);
        if max_bank > i32::MAX as usize {
            return Err(Error::invalid_config(format!("bank index {max_bank} exceeds {}", i32::MAX)));
        }
        let num_banks = max_bank
            .checked_add(1)
            .ok_or_else(|| Error::invalid_config(format!("bank index {max_bank} is too large")))?;
        let model = Self {
            data_type,
            width,
            height,
            pixel_stride,
            scanline_stride,
            band_offsets,
            bank_indices,
            num_banks,
        };
        to_i32(model.buffer_size(), "buffer size")?;
        debug!(
            %data_type,
            width,
            height,
            pixel_stride,
            scanline_stride,
            bands = model.band_offsets.len(),
            banks = num_banks,
            "ComponentSampleModel::new"
        );
        Ok(model)
    }

    /// Element type of samples.
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
        self.band_offsets.len()
    }

    /// Elements between the same band of horizontally adjacent pixels.
    pub fn pixel_stride(&self) -> i32 {
        self.pixel_stride
    }

    /// Elements between the same band of vertically adjacent pixels.
    pub fn scanline_stride(&self) -> i32 {
        self.scanline_stride
    }

    /// Offset of each band's first sample within its bank.
    pub fn band_offsets(&self) -> &[i32] {
        &self.band_offsets
    }

    /// Bank holding each band.
    pub fn bank_indices(&self) -> &[usize] {
        &self.bank_indices
    }

    /// Number of banks a data buffer for this model needs.
    pub fn num_banks(&self) -> usize {
        self.num_banks
    }

    /// Element offset of `band` for pixel (x, y), without range checks.
    ///
    /// ```rust
    /// use pixmodel_core::DataType;
    /// use pixmodel_sample::ComponentSampleModel;
    ///
    /// let sm = ComponentSampleModel::new(DataType::Byte, 10, 5, 2, 20, vec![0, 1, 2]).unwrap();
    /// assert_eq!(sm.offset(3, 4, 1), 87);
    /// ```
    #[inline]
    pub fn offset(&self, x: i32, y: i32, band: usize) -> i64 {
        let band_offset = self.band_offsets.get(band).copied().unwrap_or(0);
        i64::from(y) * i64::from(self.scanline_stride)
            + i64::from(x) * i64::from(self.pixel_stride)
            + i64::from(band_offset)
    }

    /// Minimum bank size covering every address this model produces.
    pub fn buffer_size(&self) -> i64 {
        let max_band_offset = self.band_offsets.iter().copied().max().unwrap_or(0);
        let mut size = 0i64;
        if max_band_offset >= 0 {
            size += i64::from(max_band_offset) + 1;
        }
        if self.pixel_stride > 0 {
            size += i64::from(self.pixel_stride) * i64::from(self.width - 1);
        }
        if self.scanline_stride > 0 {
            size += i64::from(self.scanline_stride) * i64::from(self.height - 1);
        }
        size
    }

    /// Resolves (x, y, band) to a checked (bank, element index) pair.
    #[inline]
    pub(crate) fn locate(&self, x: i32, y: i32, band: usize) -> Result<(usize, usize)> {
        if x < 0 || x >= self.width {
            return Err(Error::out_of_range("x", x.into(), self.width.into()));
        }
        if y < 0 || y >= self.height {
            return Err(Error::out_of_range("y", y.into(), self.height.into()));
        }
        let bank = *self
            .bank_indices
            .get(band)
            .ok_or_else(|| Error::out_of_range("band", band as i64, self.num_bands() as i64))?;
        let offset = self.offset(x, y, band);
        let index = usize::try_from(offset)
            .map_err(|_| Error::out_of_range("element index", offset, i64::from(i32::MAX)))?;
        Ok((bank, index))
    }

    /// Reads one sample.
    #[inline]
    pub fn get_sample(&self, x: i32, y: i32, band: usize, data: &DataBuffer) -> Result<i32> {
        let (bank, index) = self.locate(x, y, band)?;
        data.elem(bank, index)
    }

    /// Writes one sample, wrapping it to the element width.
    #[inline]
    pub fn set_sample(&self, x: i32, y: i32, band: usize, value: i32, data: &DataBuffer) -> Result<()> {
        let (bank, index) = self.locate(x, y, band)?;
        data.set_elem(bank, index, value)
    }

    /// Allocates a zeroed buffer of [`buffer_size`](Self::buffer_size) elements
    /// in each of [`num_banks`](Self::num_banks) banks.
    pub fn create_data_buffer(&self) -> Result<DataBuffer> {
        let size = to_i32(self.buffer_size(), "buffer size")?;
        DataBuffer::new(self.data_type, size as usize, self.num_banks)
    }

    /// Same band topology at a new size, with compacted strides.
    ///
    /// Bank assignments are kept: bands of a multi-bank model stay in their
    /// own banks and never alias after compaction.
    pub fn create_compatible(&self, width: i32, height: i32) -> Result<Self> {
        check_dimensions(width, height)?;
        let layout = compatible_layout(
            self.pixel_stride,
            self.scanline_stride,
            &self.band_offsets,
            width,
            height,
        )?;
        Self::with_banks(
            self.data_type,
            width,
            height,
            layout.pixel_stride,
            layout.scanline_stride,
            self.bank_indices.clone(),
            layout.band_offsets,
        )
    }

    /// Selects `bands` (by current band index) into a new model with the same
    /// strides.
    ///
    /// More requested bands than there are bank indices is a format error,
    /// even when the indices themselves are valid. Duplicates are allowed
    /// within that bound.
    pub fn create_subset(&self, bands: &[usize]) -> Result<Self> {
        let (bank_indices, band_offsets) = self.select_bands(bands)?;
        Self::with_banks(
            self.data_type,
            self.width,
            self.height,
            self.pixel_stride,
            self.scanline_stride,
            bank_indices,
            band_offsets,
        )
    }

    pub(crate) fn select_bands(&self, bands: &[usize]) -> Result<(Vec<usize>, Vec<i32>)> {
        if bands.len() > self.bank_indices.len() {
            return Err(Error::format_mismatch(format!(
                "there are only {} bands",
                self.bank_indices.len()
            )));
        }
        let mut bank_indices = Vec::with_capacity(bands.len());
        let mut band_offsets = Vec::with_capacity(bands.len());
        for &b in bands {
            if b >= self.num_bands() {
                return Err(Error::out_of_range("band", b as i64, self.num_bands() as i64));
            }
            bank_indices.push(self.bank_indices[b]);
            band_offsets.push(self.band_offsets[b]);
        }
        Ok((bank_indices, band_offsets))
    }
}

/// Strides and band offsets chosen for a resized layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// New pixel stride
    pub pixel_stride: i32,
    /// New scanline stride
    pub scanline_stride: i32,
    /// New band offsets
    pub band_offsets: Vec<i32>,
}

/// Assigns offsets `0, step, 2*step, ...` in ascending order of `orig`.
///
/// The band with the smallest original offset receives 0, the next smallest
/// receives `step`, and so on.
///
/// ```rust
/// use pixmodel_sample::order_bands;
///
/// assert_eq!(order_bands(&[5, 1, 3], 10).unwrap(), vec![20, 0, 10]);
/// ```
pub fn order_bands(orig: &[i32], step: i64) -> Result<Vec<i32>> {
    let n = orig.len();
    let mut map: Vec<usize> = (0..n).collect();
    let mut ret = vec![0i32; n];
    for i in 0..n {
        let mut index = i;
        for j in i + 1..n {
            if orig[map[index]] > orig[map[j]] {
                index = j;
            }
        }
        ret[map[index]] = to_i32(i as i64 * step, "band offset")?;
        map[index] = map[i];
    }
    Ok(ret)
}

/// Chooses strides for a `width x height` copy of a component layout.
///
/// The absolute pixel stride, scanline stride and band offset spread are
/// ranked. Whichever is largest in the source becomes the outermost
/// dimension of the new layout:
///
/// | ordering | new layout |
/// |----------|------------|
/// | pixel > line > band | offsets rebased to 0, line = spread + 1, pixel = line * h |
/// | pixel > band > line | bands in planes of `line * h`, pixel = bands * line * h |
/// | band > pixel > line | pixel = line * h, bands in planes of `pixel * w` |
/// | line > pixel > band | offsets rebased to 0, pixel = spread + 1, line = pixel * w |
/// | line > band > pixel | bands in rows of `pixel * w`, line = bands * pixel * w |
/// | band > line > pixel | line = pixel * w, bands in planes of `line * h` |
///
/// Negative source strides yield negative strides with a base offset added
/// to every band so that all addresses in the region stay non-negative.
pub fn compatible_layout(
    pixel_stride: i32,
    scanline_stride: i32,
    band_offsets: &[i32],
    width: i32,
    height: i32,
) -> Result<Layout> {
    let min_off = band_offsets.iter().copied().min().unwrap_or(0);
    let max_off = band_offsets.iter().copied().max().unwrap_or(0);
    let bands = band_offsets.len() as i64;
    let (w, h) = (i64::from(width), i64::from(height));

    let mut p = i64::from(pixel_stride).abs();
    let mut l = i64::from(scanline_stride).abs();
    let b = (i64::from(max_off) - i64::from(min_off)).abs();
    let rebased = || -> Vec<i64> {
        band_offsets
            .iter()
            .map(|&o| i64::from(o) - i64::from(min_off))
            .collect()
    };
    let ordered = |step: i64| -> Result<Vec<i64>> {
        Ok(order_bands(band_offsets, step)?.into_iter().map(i64::from).collect())
    };

    let mut offsets: Vec<i64>;
    if p > l {
        if p > b {
            if l > b {
                offsets = rebased();
                l = b + 1;
                p = l * h;
            } else {
                offsets = ordered(l * h)?;
                p = bands * l * h;
            }
        } else {
            p = l * h;
            offsets = ordered(p * w)?;
        }
    } else if p > b {
        offsets = rebased();
        p = b + 1;
        l = p * w;
    } else if l > b {
        offsets = ordered(p * w)?;
        l = bands * p * w;
    } else {
        l = p * w;
        offsets = ordered(l * h)?;
    }

    let mut base = 0i64;
    if scanline_stride < 0 {
        base += l * h;
        l = -l;
    }
    if pixel_stride < 0 {
        base += p * w;
        p = -p;
    }
    for o in &mut offsets {
        *o += base;
    }

    Ok(Layout {
        pixel_stride: to_i32(p, "pixel stride")?,
        scanline_stride: to_i32(l, "scanline stride")?,
        band_offsets: offsets
            .into_iter()
            .map(|o| to_i32(o, "band offset"))
            .collect::<Result<_>>()?,
    })
}
