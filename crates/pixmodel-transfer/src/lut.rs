//! Integer lookup tables between sample encodings and 8-bit sRGB.
//!
//! Color models on linear RGB or gray spaces convert every pixel through
//! these tables instead of evaluating transfer curves per sample.
//!
//! | Table | Entries | Maps |
//! |-------|---------|------|
//! | [`linear8_to_srgb8`] | 256 | linear 8-bit -> sRGB 8-bit |
//! | [`linear16_to_srgb8`] | 65536 | linear 16-bit -> sRGB 8-bit |
//! | [`srgb8_to_linear8`] | 256 | sRGB 8-bit -> linear 8-bit |
//! | [`srgb8_to_linear16`] | 256 | sRGB 8-bit -> linear 16-bit |
//! | [`to_srgb8_table`] | `2^bits` | any curve -> sRGB 8-bit |
//! | [`from_linear16_table`] | 65536 | linear 16-bit -> any curve |
//!
//! The fixed sRGB tables are built once per process on first use. Gray
//! tables depend on the gamma and bit depth of a model and are built by the
//! model that owns them. Tables of 65536 entries are filled in parallel.

use std::sync::OnceLock;

use rayon::prelude::*;
use tracing::debug;

use crate::curve::TransferCurve;

/// Luma weights applied to linear RGB when compositing gray.
pub const LUMA_WEIGHTS: [f32; 3] = [0.2125, 0.7154, 0.0721];

#[inline]
fn quantize(v: f32, max: f32) -> f32 {
    (v.clamp(0.0, 1.0) * max + 0.5).floor()
}

fn build<T, F>(len: usize, f: F) -> Box<[T]>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    if len > 4096 {
        (0..len).into_par_iter().map(f).collect::<Vec<_>>().into_boxed_slice()
    } else {
        (0..len).map(f).collect::<Vec<_>>().into_boxed_slice()
    }
}

/// Samples of `bits` width encoded with `curve` to sRGB 8-bit, `2^bits`
/// entries.
///
/// `bits` is clamped to `1..=16`.
pub fn to_srgb8_table(curve: TransferCurve, bits: u32) -> Box<[u8]> {
    let bits = bits.clamp(1, 16);
    let len = 1usize << bits;
    let max = (len - 1) as f32;
    debug!(?curve, bits, len, "lut: -> sRGB8");
    build(len, |i| quantize(curve.convert(i as f32 / max, TransferCurve::Srgb), 255.0) as u8)
}

/// 256-entry linear 8-bit to sRGB 8-bit table.
pub fn linear8_to_srgb8() -> &'static [u8] {
    static TABLE: OnceLock<Box<[u8]>> = OnceLock::new();
    TABLE.get_or_init(|| to_srgb8_table(TransferCurve::LINEAR, 8))
}

/// 65536-entry linear 16-bit to sRGB 8-bit table.
pub fn linear16_to_srgb8() -> &'static [u8] {
    static TABLE: OnceLock<Box<[u8]>> = OnceLock::new();
    TABLE.get_or_init(|| to_srgb8_table(TransferCurve::LINEAR, 16))
}

/// 256-entry sRGB 8-bit to linear 8-bit table.
pub fn srgb8_to_linear8() -> &'static [u8] {
    static TABLE: OnceLock<Box<[u8]>> = OnceLock::new();
    TABLE.get_or_init(|| {
        debug!("lut: sRGB8 -> linear8");
        build(256, |i| quantize(TransferCurve::Srgb.decode(i as f32 / 255.0), 255.0) as u8)
    })
}

/// 256-entry sRGB 8-bit to linear 16-bit table.
pub fn srgb8_to_linear16() -> &'static [u16] {
    static TABLE: OnceLock<Box<[u16]>> = OnceLock::new();
    TABLE.get_or_init(|| {
        debug!("lut: sRGB8 -> linear16");
        build(256, |i| quantize(TransferCurve::Srgb.decode(i as f32 / 255.0), 65535.0) as u16)
    })
}

/// Linear 16-bit values to samples of `bits` width encoded with `curve`.
///
/// `bits` is clamped to `1..=16`.
pub fn from_linear16_table(curve: TransferCurve, bits: u32) -> Box<[u16]> {
    let bits = bits.clamp(1, 16);
    let max = ((1u32 << bits) - 1) as f32;
    debug!(?curve, bits, "lut: linear16 ->");
    build(65536, |i| quantize(curve.encode(i as f32 / 65535.0), max) as u16)
}

/// Linear 16-bit luminance of an sRGB 8-bit color.
#[inline]
pub fn luminance16(r: u8, g: u8, b: u8) -> u16 {
    let lin = srgb8_to_linear16();
    let y = LUMA_WEIGHTS[0] * f32::from(lin[r as usize])
        + LUMA_WEIGHTS[1] * f32::from(lin[g as usize])
        + LUMA_WEIGHTS[2] * f32::from(lin[b as usize]);
    (y + 0.5).clamp(0.0, 65535.0) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sizes() {
        assert_eq!(linear8_to_srgb8().len(), 256);
        assert_eq!(linear16_to_srgb8().len(), 65536);
        assert_eq!(srgb8_to_linear8().len(), 256);
        assert_eq!(srgb8_to_linear16().len(), 256);
        assert_eq!(to_srgb8_table(TransferCurve::LINEAR, 12).len(), 4096);
        assert_eq!(from_linear16_table(TransferCurve::Gamma(2.2), 8).len(), 65536);
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(linear8_to_srgb8()[0], 0);
        assert_eq!(linear8_to_srgb8()[255], 255);
        assert_eq!(linear16_to_srgb8()[65535], 255);
        assert_eq!(srgb8_to_linear16()[255], 65535);
        assert_eq!(srgb8_to_linear8()[0], 0);
        assert_eq!(to_srgb8_table(TransferCurve::Gamma(2.2), 8)[255], 255);
        assert_eq!(from_linear16_table(TransferCurve::LINEAR, 16)[65535], 65535);
    }

    #[test]
    fn test_monotonic() {
        let t = linear16_to_srgb8();
        assert!(t.windows(2).all(|w| w[0] <= w[1]));
        let t = srgb8_to_linear16();
        assert!(t.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_known_values() {
        // Linear mid-gray is sRGB ~188.
        assert_eq!(linear8_to_srgb8()[128], 188);
        // sRGB 128 is ~21.6% linear.
        assert_eq!(srgb8_to_linear8()[128], 55);
    }

    #[test]
    fn test_srgb_round_trip_8bit() {
        let to_lin = srgb8_to_linear16();
        let to_srgb = linear16_to_srgb8();
        for v in 0..=255usize {
            assert_eq!(to_srgb[to_lin[v] as usize] as usize, v);
        }
    }

    #[test]
    fn test_linear_gray_is_identity() {
        let t = from_linear16_table(TransferCurve::LINEAR, 16);
        assert_eq!(t[1234], 1234);
        let t = to_srgb8_table(TransferCurve::LINEAR, 8);
        assert_eq!(&t[..], linear8_to_srgb8());
        let t = to_srgb8_table(TransferCurve::Srgb, 8);
        assert!(t.iter().enumerate().all(|(i, &v)| usize::from(v) == i));
    }

    #[test]
    fn test_luminance() {
        assert_eq!(luminance16(0, 0, 0), 0);
        assert_eq!(luminance16(255, 255, 255), 65535);
        assert!(luminance16(0, 255, 0) > luminance16(255, 0, 0));
    }
}
