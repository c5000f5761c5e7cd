//! Integration tests for pixmodel crates.
//!
//! The tests under `tests/` exercise sample models, rasters, color models and
//! the ICC engine together. This library only holds shared fixtures.

use pixmodel_raster::Raster;

/// Deterministic sample for `(x, y, band)` that fits in `bits` bits.
pub fn pattern(x: i32, y: i32, band: usize, bits: u32) -> i32 {
    let modulus = 1i64 << bits.min(15);
    ((i64::from(x) * 7 + i64::from(y) * 13 + band as i64 * 3) % modulus) as i32
}

/// Fills every sample of `raster` with [`pattern`].
pub fn fill_pattern(raster: &Raster) -> pixmodel_core::Result<()> {
    let b = raster.bounds();
    for band in 0..raster.num_bands() {
        let bits = raster.sample_model().sample_size(band)?;
        let samples: Vec<i32> = (b.y..b.y + b.height)
            .flat_map(|y| (b.x..b.x + b.width).map(move |x| pattern(x, y, band, bits)))
            .collect();
        raster.set_samples(b.x, b.y, b.width, b.height, band, &samples)?;
    }
    Ok(())
}
