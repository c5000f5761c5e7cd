//! Palette color model.
//!
//! Pixels are indices into a table of `0xAARRGGBB` entries. Mapping a color
//! back to an index is a linear nearest-color search, so recent answers are
//! kept in a small lock-free cache.

use std::fmt;
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};

use pixmodel_core::{DataType, Error, Result, TransferData, ensure_len};
use pixmodel_raster::{Raster, create_interleaved_raster};
use pixmodel_sample::{PixelInterleavedSampleModel, SampleModel};
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::colorspace::srgb;
use crate::direct::DirectColorModel;
use crate::header::{Header, Transparency, element_of};
use crate::model::ColorModel;

const CACHE_SIZE: usize = 20;

/// Palette-based color model.
///
/// # Example
///
/// ```rust
/// use pixmodel_color::IndexColorModel;
///
/// let cm = IndexColorModel::new(2, 3, &[255, 0, 0], &[0, 255, 0], &[0, 0, 255]).unwrap();
/// assert_eq!(cm.get_rgb(1), 0xff00ff00);
/// assert_eq!(cm.get_data_element(0xff0000f0), 2);
/// ```
pub struct IndexColorModel {
    header: Header,
    map_size: usize,
    rgb: Box<[u32]>,
    transparent_index: AtomicI32,
    valid_bits: Option<Box<[bool]>>,
    all_gray_opaque: bool,
    // (argb << 32) | !index; zero marks an empty slot
    cache: [AtomicU64; CACHE_SIZE],
}

impl fmt::Debug for IndexColorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexColorModel")
            .field("header", &self.header)
            .field("map_size", &self.map_size)
            .field("transparent_pixel", &self.transparent_pixel())
            .field("has_valid_bits", &self.valid_bits.is_some())
            .field("all_gray_opaque", &self.all_gray_opaque)
            .finish_non_exhaustive()
    }
}

impl Clone for IndexColorModel {
    fn clone(&self) -> Self {
        Self {
            header: self.header.clone(),
            map_size: self.map_size,
            rgb: self.rgb.clone(),
            transparent_index: AtomicI32::new(self.transparent_index.load(Ordering::Relaxed)),
            valid_bits: self.valid_bits.clone(),
            all_gray_opaque: self.all_gray_opaque,
            cache: std::array::from_fn(|i| AtomicU64::new(self.cache[i].load(Ordering::Relaxed))),
        }
    }
}

fn check_bits(bits: u32, max: u32) -> Result<()> {
    if bits == 0 || bits > max {
        return Err(Error::invalid_config(format!("number of bits must be between 1 and {max}, got {bits}")));
    }
    Ok(())
}

fn check_size(size: usize) -> Result<()> {
    if size == 0 {
        return Err(Error::invalid_config("map size must be >= 1"));
    }
    Ok(())
}

fn check_transfer_type(transfer_type: DataType) -> Result<()> {
    match transfer_type {
        DataType::Byte | DataType::UShort => Ok(()),
        other => Err(Error::invalid_config(format!(
            "index color models need a BYTE or USHORT transfer type, got {}",
            other.name()
        ))),
    }
}

fn default_transfer_type(bits: u32) -> DataType {
    if bits <= 8 { DataType::Byte } else { DataType::UShort }
}

#[inline]
fn argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    (u32::from(a) << 24) | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

impl IndexColorModel {
    /// Opaque palette from red, green and blue arrays.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] unless `1 <= bits <= 16` and
    /// `size >= 1`; [`Error::BufferTooSmall`] if an array is shorter than `size`.
    pub fn new(bits: u32, size: usize, r: &[u8], g: &[u8], b: &[u8]) -> Result<Self> {
        Self::from_channels(bits, size, r, g, b, None, None)
    }

    /// Opaque palette whose entry `trans` is fully transparent.
    ///
    /// An out-of-range `trans` is ignored.
    pub fn with_transparent(bits: u32, size: usize, r: &[u8], g: &[u8], b: &[u8], trans: usize) -> Result<Self> {
        Self::from_channels(bits, size, r, g, b, None, Some(trans))
    }

    /// Palette with per-entry alpha.
    pub fn with_alpha(bits: u32, size: usize, r: &[u8], g: &[u8], b: &[u8], a: &[u8]) -> Result<Self> {
        Self::from_channels(bits, size, r, g, b, Some(a), None)
    }

    fn from_channels(
        bits: u32,
        size: usize,
        r: &[u8],
        g: &[u8],
        b: &[u8],
        a: Option<&[u8]>,
        trans: Option<usize>,
    ) -> Result<Self> {
        check_bits(bits, 16)?;
        check_size(size)?;
        for len in [r.len(), g.len(), b.len()] {
            ensure_len(size, len)?;
        }
        if let Some(a) = a {
            ensure_len(size, a.len())?;
        }
        let rgb = (0..size)
            .map(|i| argb(a.map_or(0xff, |a| a[i]), r[i], g[i], b[i]))
            .collect();
        Self::build(bits, default_transfer_type(bits), rgb, trans, None)
    }

    /// Palette from interleaved `RGB` or `RGBA` bytes starting at `start`.
    pub fn from_packed_bytes(
        bits: u32,
        size: usize,
        cmap: &[u8],
        start: usize,
        has_alpha: bool,
        trans: Option<usize>,
    ) -> Result<Self> {
        check_bits(bits, 16)?;
        check_size(size)?;
        let stride = if has_alpha { 4 } else { 3 };
        let end = size
            .checked_mul(stride)
            .and_then(|n| n.checked_add(start))
            .ok_or_else(|| Error::invalid_config(format!("map of {size} entries is too large")))?;
        ensure_len(end, cmap.len())?;
        let rgb = cmap[start..end]
            .chunks_exact(stride)
            .map(|c| argb(if has_alpha { c[3] } else { 0xff }, c[0], c[1], c[2]))
            .collect();
        Self::build(bits, default_transfer_type(bits), rgb, trans, None)
    }

    /// Palette from `0xAARRGGBB` words starting at `start`.
    ///
    /// Without `has_alpha` every entry is made opaque.
    pub fn from_argb(
        bits: u32,
        size: usize,
        cmap: &[u32],
        start: usize,
        has_alpha: bool,
        trans: Option<usize>,
        transfer_type: DataType,
    ) -> Result<Self> {
        check_bits(bits, 16)?;
        check_size(size)?;
        check_transfer_type(transfer_type)?;
        let end = start
            .checked_add(size)
            .ok_or_else(|| Error::invalid_config(format!("map of {size} entries is too large")))?;
        ensure_len(end, cmap.len())?;
        let rgb = cmap[start..end]
            .iter()
            .map(|&c| if has_alpha { c } else { c | 0xff00_0000 })
            .collect();
        Self::build(bits, transfer_type, rgb, trans, None)
    }

    /// Palette of `0xAARRGGBB` words where only entries flagged in
    /// `valid_bits` may be chosen by color lookups.
    ///
    /// Accepts pixel widths up to 32 bits. Entries beyond the end of
    /// `valid_bits` are invalid; `None` makes every entry valid.
    pub fn from_argb_with_validity(
        bits: u32,
        size: usize,
        cmap: &[u32],
        start: usize,
        transfer_type: DataType,
        valid_bits: Option<&[bool]>,
    ) -> Result<Self> {
        check_bits(bits, 32)?;
        check_size(size)?;
        check_transfer_type(transfer_type)?;
        let end = start
            .checked_add(size)
            .ok_or_else(|| Error::invalid_config(format!("map of {size} entries is too large")))?;
        ensure_len(end, cmap.len())?;
        let valid = valid_bits.map(|v| (0..size).map(|i| v.get(i).copied().unwrap_or(false)).collect());
        Self::build(bits, transfer_type, cmap[start..end].to_vec(), None, valid)
    }

    fn build(
        bits: u32,
        transfer_type: DataType,
        mut rgb: Vec<u32>,
        trans: Option<usize>,
        valid_bits: Option<Box<[bool]>>,
    ) -> Result<Self> {
        let map_size = rgb.len();
        let mut transparency = Transparency::Opaque;
        for &c in &rgb {
            let alpha = c >> 24;
            if alpha != 0xff && transparency != Transparency::Translucent {
                transparency = if alpha == 0 { Transparency::Bitmask } else { Transparency::Translucent };
            }
        }

        let trans = trans.filter(|&t| t < map_size);
        if let Some(t) = trans {
            rgb[t] &= 0x00ff_ffff;
            if transparency == Transparency::Opaque {
                transparency = Transparency::Bitmask;
            }
        }

        let all_gray_opaque = trans.is_none()
            && transparency != Transparency::Translucent
            && rgb.iter().filter(|&&c| c != 0).all(|&c| {
                let (r, g, b) = ((c >> 16) & 0xff, (c >> 8) & 0xff, c & 0xff);
                c >> 24 == 0xff && r == g && g == b
            });

        let has_alpha = transparency != Transparency::Opaque;
        let header = Header {
            color_space: srgb(),
            bits: vec![8; if has_alpha { 4 } else { 3 }],
            pixel_bits: bits,
            has_alpha,
            premultiplied: false,
            transparency,
            transfer_type,
        };
        debug!(bits, map_size, ?transparency, ?trans, "IndexColorModel::new");
        Ok(Self {
            header,
            map_size,
            rgb: rgb.into_boxed_slice(),
            transparent_index: AtomicI32::new(trans.map_or(-1, |t| t as i32)),
            valid_bits,
            all_gray_opaque,
            cache: std::array::from_fn(|_| AtomicU64::new(0)),
        })
    }

    pub(crate) fn header(&self) -> &Header {
        &self.header
    }

    /// Number of palette entries.
    pub fn map_size(&self) -> usize {
        self.map_size
    }

    /// Index of the fully transparent entry, if one is designated.
    pub fn transparent_pixel(&self) -> Option<usize> {
        usize::try_from(self.transparent_index.load(Ordering::Relaxed)).ok()
    }

    /// True when every non-zero entry is an opaque gray.
    pub fn is_all_gray_opaque(&self) -> bool {
        self.all_gray_opaque
    }

    /// Entry `pixel` as `0xAARRGGBB`; indices past the palette read as
    /// transparent black.
    #[inline]
    pub fn get_rgb(&self, pixel: u32) -> u32 {
        self.rgb.get(pixel as usize).copied().unwrap_or(0)
    }

    /// Red of entry `pixel`.
    pub fn get_red(&self, pixel: u32) -> u8 {
        (self.get_rgb(pixel) >> 16) as u8
    }

    /// Green of entry `pixel`.
    pub fn get_green(&self, pixel: u32) -> u8 {
        (self.get_rgb(pixel) >> 8) as u8
    }

    /// Blue of entry `pixel`.
    pub fn get_blue(&self, pixel: u32) -> u8 {
        self.get_rgb(pixel) as u8
    }

    /// Alpha of entry `pixel`.
    pub fn get_alpha(&self, pixel: u32) -> u8 {
        (self.get_rgb(pixel) >> 24) as u8
    }

    /// Red of every entry.
    pub fn reds(&self) -> Vec<u8> {
        self.rgb.iter().map(|&c| (c >> 16) as u8).collect()
    }

    /// Green of every entry.
    pub fn greens(&self) -> Vec<u8> {
        self.rgb.iter().map(|&c| (c >> 8) as u8).collect()
    }

    /// Blue of every entry.
    pub fn blues(&self) -> Vec<u8> {
        self.rgb.iter().map(|&c| c as u8).collect()
    }

    /// Alpha of every entry.
    pub fn alphas(&self) -> Vec<u8> {
        self.rgb.iter().map(|&c| (c >> 24) as u8).collect()
    }

    /// The palette as `0xAARRGGBB` words.
    pub fn rgbs(&self) -> &[u32] {
        &self.rgb
    }

    /// True when `pixel` is a palette index that lookups may return.
    pub fn is_valid(&self, pixel: usize) -> bool {
        pixel < self.map_size && self.valid_bits.as_ref().is_none_or(|v| v[pixel])
    }

    /// True when every index in the palette is valid.
    pub fn is_valid_all(&self) -> bool {
        self.valid_bits.as_ref().is_none_or(|v| v.iter().all(|&b| b))
    }

    /// Validity flag of every entry.
    pub fn valid_bits(&self) -> Vec<bool> {
        (0..self.map_size).map(|i| self.is_valid(i)).collect()
    }

    fn cache_lookup(&self, argb: u32) -> Option<u32> {
        for slot in &self.cache {
            let v = slot.load(Ordering::Relaxed);
            if v == 0 {
                break;
            }
            if (v >> 32) as u32 == argb {
                return Some(!(v as u32));
            }
        }
        None
    }

    // Newest entry first; the oldest falls off the end.
    fn cache_insert(&self, argb: u32, pixel: u32) {
        for i in (1..CACHE_SIZE).rev() {
            self.cache[i].store(self.cache[i - 1].load(Ordering::Relaxed), Ordering::Relaxed);
        }
        self.cache[0].store((u64::from(argb) << 32) | u64::from(!pixel), Ordering::Relaxed);
    }

    fn transparent_match(&self) -> Option<u32> {
        if let Some(t) = self.transparent_pixel() {
            return Some(t as u32);
        }
        let found = (0..self.map_size).find(|&i| self.is_valid(i) && self.rgb[i] >> 24 == 0)?;
        self.transparent_index.store(found as i32, Ordering::Relaxed);
        Some(found as u32)
    }

    // Alpha distance first, then RGB distance among entries no worse in alpha.
    fn closest(&self, argb: u32) -> u32 {
        let a = (argb >> 24) as i32;
        let r = ((argb >> 16) & 0xff) as i32;
        let g = ((argb >> 8) & 0xff) as i32;
        let b = (argb & 0xff) as i32;

        let mut smallest_error = 255 * 255 * 255;
        let mut smallest_alpha_error = 255;
        let mut pix = 0u32;
        for (i, &c) in self.rgb.iter().enumerate() {
            if !self.is_valid(i) {
                continue;
            }
            let alpha_error = ((c >> 24) as i32 - a).abs();
            if alpha_error > smallest_alpha_error {
                continue;
            }
            smallest_alpha_error = alpha_error;
            let dr = ((c >> 16) & 0xff) as i32 - r;
            let dg = ((c >> 8) & 0xff) as i32 - g;
            let db = (c & 0xff) as i32 - b;
            let error = dr * dr + dg * dg + db * db;
            if error < smallest_error {
                pix = i as u32;
                smallest_error = error;
            }
        }
        pix
    }

    /// Palette index for `0xAARRGGBB`.
    ///
    /// Fully transparent colors map to the transparent entry (adopting the
    /// first zero-alpha entry when none is designated), or to index 0 when
    /// the palette has no zero-alpha entry. Other colors take
    /// the entry closest in alpha, then closest in RGB, earliest index on
    /// ties. Invalid entries are never returned unless nothing is valid.
    pub fn get_data_element(&self, argb: u32) -> u32 {
        if let Some(pix) = self.cache_lookup(argb) {
            return pix;
        }
        let pix = if argb >> 24 == 0 {
            self.transparent_match().unwrap_or(0)
        } else {
            self.closest(argb)
        };
        trace!(argb = format_args!("{argb:#010x}"), pix, "palette cache miss");
        self.cache_insert(argb, pix);
        pix
    }

    /// Native pixel for `0xAARRGGBB`.
    pub fn get_data_elements(&self, argb: u32) -> TransferData {
        TransferData::from_i32s(self.header.transfer_type, &[self.get_data_element(argb) as i32])
    }

    /// Index held by a native pixel.
    pub fn pixel_of(&self, pixel: &TransferData) -> Result<u32> {
        element_of(pixel, self.header.transfer_type)
    }

    /// Red, green, blue and (with alpha) alpha of entry `pixel`.
    pub fn get_components(&self, pixel: u32) -> Vec<i32> {
        let c = self.get_rgb(pixel);
        let mut out = vec![((c >> 16) & 0xff) as i32, ((c >> 8) & 0xff) as i32, (c & 0xff) as i32];
        if self.header.has_alpha {
            out.push((c >> 24) as i32);
        }
        out
    }

    /// Palette index closest to the given component values.
    pub fn get_data_element_from_components(&self, components: &[i32]) -> Result<u32> {
        let n = self.header.num_components();
        ensure_len(n, components.len())?;
        let c = |i: usize| (components[i] as u32) & 0xff;
        let alpha = if self.header.has_alpha { c(3) << 24 } else { 0xff00_0000 };
        Ok(self.get_data_element(alpha | (c(0) << 16) | (c(1) << 8) | c(2)))
    }

    /// Palette colors never carry premultiplied alpha.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedOperation`] when premultiplication is requested
    /// for a palette with alpha.
    pub fn coerce_data(&self, _raster: &Raster, premultiplied: bool) -> Result<Self> {
        if premultiplied && self.header.has_alpha {
            return Err(Error::unsupported("coerce_data", "index color models cannot premultiply"));
        }
        Ok(self.clone())
    }

    /// True for single-band rasters of the transfer type whose samples can
    /// address every entry.
    pub fn is_compatible_raster(&self, raster: &Raster) -> bool {
        let size = raster.sample_model().sample_size(0).unwrap_or(0);
        raster.transfer_type() == self.header.transfer_type
            && raster.num_bands() == 1
            && (1u64 << size.min(63)) >= self.map_size as u64
    }

    /// True for single-band component sample models of the transfer type.
    pub fn is_compatible_sample_model(&self, sm: &SampleModel) -> bool {
        sm.as_component().is_some() && sm.transfer_type() == self.header.transfer_type && sm.num_bands() == 1
    }

    /// Single-band raster wide enough for the pixel bits.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedOperation`] above 16 pixel bits.
    pub fn create_compatible_writable_raster(&self, width: i32, height: i32) -> Result<Raster> {
        let data_type = match self.header.pixel_bits {
            0..=8 => DataType::Byte,
            9..=16 => DataType::UShort,
            _ => {
                return Err(Error::unsupported(
                    "create_compatible_writable_raster",
                    "pixel bits above 16",
                ));
            }
        };
        create_interleaved_raster(data_type, width, height, 1, None)
    }

    /// Single-band sample model of the transfer type.
    pub fn create_compatible_sample_model(&self, width: i32, height: i32) -> Result<SampleModel> {
        Ok(PixelInterleavedSampleModel::new(self.header.transfer_type, width, height, 1, width, vec![0])?.into())
    }

    /// Expands an index raster into a packed ARGB raster.
    ///
    /// The target model is the default ARGB model when `force_argb` is set
    /// or the palette is translucent, a 25-bit RGB plus one alpha bit model
    /// for bitmask palettes, and a 24-bit RGB model otherwise. The returned
    /// raster starts at (0, 0).
    pub fn convert_to_int_discrete(&self, raster: &Raster, force_argb: bool) -> Result<(ColorModel, Raster)> {
        let cm = if force_argb || self.header.transparency == Transparency::Translucent {
            ColorModel::rgb_default().clone()
        } else if self.header.transparency == Transparency::Bitmask {
            ColorModel::Direct(DirectColorModel::with_alpha(25, 0xff0000, 0x00ff00, 0x0000ff, 0x0100_0000)?)
        } else {
            ColorModel::Direct(DirectColorModel::new(24, 0xff0000, 0x00ff00, 0x0000ff)?)
        };
        let (w, h) = (raster.width(), raster.height());
        let out = cm.create_compatible_writable_raster(w, h)?;
        let (rx, ry) = (raster.min_x(), raster.min_y());
        debug!(width = w, height = h, force_argb, "convert_to_int_discrete");

        (0..h).into_par_iter().try_for_each(|y| -> Result<()> {
            let row = raster.get_data_elements_rect(rx, ry + y, w, 1)?;
            let argb: Vec<i32> = row.to_i32s().iter().map(|&p| self.get_rgb(p as u32) as i32).collect();
            out.set_data_elements_rect(0, y, w, 1, &TransferData::from_i32s(out.transfer_type(), &argb))
        })?;
        Ok((cm, out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb_palette() -> IndexColorModel {
        // transparent red, opaque green, opaque blue
        IndexColorModel::from_argb(8, 3, &[0x00ff0000, 0xff00ff00, 0xff0000ff], 0, true, None, DataType::Byte).unwrap()
    }

    #[test]
    fn test_lookup_prefers_transparent_entry() {
        let cm = rgb_palette();
        assert_eq!(cm.transparent_pixel(), None);
        assert_eq!(cm.get_data_element(0x00000000), 0);
        assert_eq!(cm.transparent_pixel(), Some(0));
        assert_eq!(cm.get_data_element(0xff00ff00), 1);
        assert_eq!(cm.get_data_elements(0xff0000ff).to_i32s(), vec![2]);
    }

    #[test]
    fn test_transparent_lookup_without_transparent_entry() {
        let cm = IndexColorModel::new(8, 3, &[10, 0, 250], &[10, 0, 250], &[10, 0, 250]).unwrap();
        // black is the closest color, but a transparent request never searches colors
        assert_eq!(cm.get_data_element(0x0000_0000), 0);
        assert_eq!(cm.get_data_element(0x00fa_fafa), 0);
        assert_eq!(cm.transparent_pixel(), None);
        assert_eq!(cm.get_data_element(0xff00_0000), 1);
    }

    #[test]
    fn test_cache() {
        let cm = rgb_palette();
        assert_eq!(cm.cache_lookup(0xff00ff00), None);
        assert_eq!(cm.get_data_element(0xff00ff00), 1);
        assert_eq!(cm.cache_lookup(0xff00ff00), Some(1));
        assert_eq!(cm.get_data_element(0xff00ff00), 1);

        for i in 0..CACHE_SIZE as u32 {
            cm.get_data_element(0xff000000 | (i + 1));
        }
        // Evicted by the 20 newer colors.
        assert_eq!(cm.cache_lookup(0xff00ff00), None);
        assert_eq!(cm.cache_lookup(0xff000001), Some(2));
    }

    #[test]
    fn test_alpha_dominates_color() {
        // Opaque red first, then nearly opaque green.
        let cm = IndexColorModel::from_argb(8, 2, &[0xffff0000, 0xfe00ff00], 0, true, None, DataType::Byte).unwrap();
        assert_eq!(cm.get_data_element(0xff00ff00), 0);

        // Same entries, reverse order: green wins first and red never beats it.
        let cm = IndexColorModel::from_argb(8, 2, &[0xfe00ff00, 0xffff0000], 0, true, None, DataType::Byte).unwrap();
        assert_eq!(cm.get_data_element(0xff00ff00), 0);
    }

    #[test]
    fn test_ties_keep_first_index() {
        let cm = IndexColorModel::new(2, 3, &[10, 30, 30], &[0, 0, 0], &[0, 0, 0]).unwrap();
        assert_eq!(cm.get_data_element(0xff140000), 0);
    }

    #[test]
    fn test_transparency() {
        let opaque = IndexColorModel::new(2, 2, &[0, 255], &[0, 255], &[0, 255]).unwrap();
        assert_eq!(opaque.header().transparency, Transparency::Opaque);
        assert!(!opaque.header().has_alpha);
        assert!(opaque.is_all_gray_opaque());

        let trans = IndexColorModel::with_transparent(2, 2, &[0, 255], &[0, 0], &[0, 0], 1).unwrap();
        assert_eq!(trans.header().transparency, Transparency::Bitmask);
        assert_eq!(trans.transparent_pixel(), Some(1));
        assert_eq!(trans.get_rgb(1), 0x00ff0000);
        assert!(!trans.is_all_gray_opaque());
        assert_eq!(trans.get_data_element(0x00123456), 1);

        let ignored = IndexColorModel::with_transparent(2, 2, &[0, 255], &[0, 0], &[0, 0], 9).unwrap();
        assert_eq!(ignored.transparent_pixel(), None);
        assert_eq!(ignored.header().transparency, Transparency::Opaque);

        let alpha = IndexColorModel::with_alpha(1, 2, &[0, 255], &[0, 0], &[0, 0], &[255, 128]).unwrap();
        assert_eq!(alpha.header().transparency, Transparency::Translucent);
        assert_eq!(alpha.get_components(1), vec![255, 0, 0, 128]);
        assert!(!IndexColorModel::new(1, 2, &[0, 255], &[0, 0], &[0, 0]).unwrap().is_all_gray_opaque());
    }

    #[test]
    fn test_packed_bytes() {
        let cmap = [9, 9, 1, 2, 3, 4, 5, 6, 7, 8];
        let cm = IndexColorModel::from_packed_bytes(4, 2, &cmap, 2, true, None).unwrap();
        assert_eq!(cm.rgbs(), &[0x04010203, 0x08050607]);
        assert_eq!(cm.reds(), vec![1, 5]);
        assert_eq!(cm.alphas(), vec![4, 8]);

        let rgb = IndexColorModel::from_packed_bytes(4, 3, &cmap, 1, false, Some(0)).unwrap();
        assert_eq!(rgb.get_rgb(0), 0x00090102);
        assert_eq!(rgb.greens(), vec![1, 4, 7]);
        assert!(IndexColorModel::from_packed_bytes(4, 3, &cmap, 2, true, None).unwrap_err().is_range_error());
    }

    #[test]
    fn test_validity() {
        let cm = IndexColorModel::from_argb_with_validity(
            20,
            3,
            &[0xff00ff00, 0xff00ff00, 0xff000000],
            0,
            DataType::UShort,
            Some(&[false, true]),
        )
        .unwrap();
        assert!(!cm.is_valid(0));
        assert!(cm.is_valid(1));
        assert!(!cm.is_valid(2));
        assert!(!cm.is_valid(3));
        assert!(!cm.is_valid_all());
        assert_eq!(cm.valid_bits(), vec![false, true, false]);
        assert_eq!(cm.get_data_element(0xff00ff00), 1);
        assert_eq!(cm.get_data_element(0xff000000), 1);
        assert!(cm.create_compatible_writable_raster(2, 2).unwrap_err().is_unsupported());
    }

    #[test]
    fn test_construction_errors() {
        assert!(IndexColorModel::new(0, 2, &[0, 0], &[0, 0], &[0, 0]).unwrap_err().is_config_error());
        assert!(IndexColorModel::new(17, 2, &[0, 0], &[0, 0], &[0, 0]).unwrap_err().is_config_error());
        assert!(IndexColorModel::new(8, 0, &[], &[], &[]).unwrap_err().is_config_error());
        assert!(IndexColorModel::new(8, 3, &[0, 0], &[0, 0, 0], &[0, 0, 0]).unwrap_err().is_range_error());
        assert!(
            IndexColorModel::from_argb(8, 1, &[0], 0, false, None, DataType::Int)
                .unwrap_err()
                .is_config_error()
        );
        assert!(IndexColorModel::from_argb_with_validity(32, 1, &[0], 0, DataType::Byte, None).is_ok());
    }

    #[test]
    fn test_out_of_palette_pixel() {
        let cm = rgb_palette();
        assert_eq!(cm.get_rgb(200), 0);
        assert_eq!(cm.get_components(200), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_components_lookup() {
        let cm = rgb_palette();
        assert_eq!(cm.get_data_element_from_components(&[0, 0, 250, 255]).unwrap(), 2);
        assert!(cm.get_data_element_from_components(&[0, 0, 250]).is_err());
        let p = cm.get_data_elements(0xff0000ff);
        assert_eq!(cm.pixel_of(&p).unwrap(), 2);
    }

    #[test]
    fn test_compatibility() {
        let cm = rgb_palette();
        let r = cm.create_compatible_writable_raster(4, 4).unwrap();
        assert_eq!(r.transfer_type(), DataType::Byte);
        assert!(cm.is_compatible_raster(&r));
        assert!(cm.is_compatible_sample_model(r.sample_model()));
        let sm = cm.create_compatible_sample_model(3, 3).unwrap();
        assert!(cm.is_compatible_sample_model(&sm));

        let wide = IndexColorModel::new(12, 2, &[0, 1], &[0, 1], &[0, 1]).unwrap();
        let r16 = wide.create_compatible_writable_raster(2, 2).unwrap();
        assert_eq!(r16.transfer_type(), DataType::UShort);
        assert!(wide.is_compatible_raster(&r16));
        assert!(!cm.is_compatible_raster(&r16));
    }

    #[test]
    fn test_coerce_data() {
        let cm = rgb_palette();
        let r = cm.create_compatible_writable_raster(1, 1).unwrap();
        assert!(cm.coerce_data(&r, false).is_ok());
        assert!(cm.coerce_data(&r, true).unwrap_err().is_unsupported());
        let opaque = IndexColorModel::new(1, 2, &[0, 1], &[0, 1], &[0, 1]).unwrap();
        assert!(opaque.coerce_data(&r, true).is_ok());
    }

    #[test]
    fn test_convert_to_int_discrete() {
        let cm = rgb_palette();
        let src = create_interleaved_raster(DataType::Byte, 3, 1, 1, Some((5, 7))).unwrap();
        src.set_samples(5, 7, 3, 1, 0, &[1, 2, 0]).unwrap();

        let (out_cm, out) = cm.convert_to_int_discrete(&src, false).unwrap();
        let direct = out_cm.as_direct().unwrap();
        assert_eq!(direct.alpha_mask(), 0x0100_0000);
        assert_eq!((out.min_x(), out.min_y()), (0, 0));
        assert_eq!(out.transfer_type(), DataType::Int);
        let rgbs: Vec<u32> = (0..3)
            .map(|x| direct.get_rgb(out.get_data_elements(x, 0).unwrap().get(0).unwrap() as u32))
            .collect();
        assert_eq!(rgbs, vec![0xff00ff00, 0xff0000ff, 0x00ff0000]);

        let (argb_cm, argb) = cm.convert_to_int_discrete(&src, true).unwrap();
        assert_eq!(argb_cm.as_direct().unwrap().alpha_mask(), 0xff00_0000);
        assert_eq!(argb.get_data_elements(2, 0).unwrap().get(0).unwrap() as u32, 0x00ff0000);
    }
}
