//! Transfer curves between encoded samples and linear light.
//!
//! Color spaces and lookup tables only ever need two shapes: the sRGB
//! piecewise curve and a pure power law (gray spaces, where a gamma of 1.0
//! is linear light). Both work on normalized values; inputs are clamped to
//! `[0, 1]` first.

/// Shape of a transfer curve.
///
/// # Example
///
/// ```rust
/// use pixmodel_transfer::TransferCurve;
///
/// let linear = TransferCurve::Srgb.decode(0.5);
/// assert!((linear - 0.214).abs() < 0.01);
/// assert_eq!(TransferCurve::LINEAR.decode(0.25), 0.25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransferCurve {
    /// IEC 61966-2-1: linear below `0.04045`, a 2.4 power above.
    Srgb,
    /// `v^gamma`. The gamma must be positive.
    Gamma(f32),
}

impl TransferCurve {
    /// Identity curve.
    pub const LINEAR: Self = Self::Gamma(1.0);

    /// Whether encoding leaves values unchanged.
    pub fn is_linear(self) -> bool {
        self == Self::LINEAR
    }

    /// Encoded value to linear light.
    #[inline]
    pub fn decode(self, v: f32) -> f32 {
        let v = v.clamp(0.0, 1.0);
        match self {
            Self::Srgb if v <= 0.04045 => v / 12.92,
            Self::Srgb => ((v + 0.055) / 1.055).powf(2.4),
            Self::Gamma(g) if g == 1.0 => v,
            Self::Gamma(g) => v.powf(g),
        }
    }

    /// Linear light to encoded value.
    #[inline]
    pub fn encode(self, l: f32) -> f32 {
        let l = l.clamp(0.0, 1.0);
        match self {
            Self::Srgb if l <= 0.0031308 => l * 12.92,
            Self::Srgb => 1.055 * l.powf(1.0 / 2.4) - 0.055,
            Self::Gamma(g) if g == 1.0 => l,
            Self::Gamma(g) => l.powf(1.0 / g),
        }
    }

    /// [`decode`](Self::decode) on each channel.
    #[inline]
    pub fn decode_rgb(self, rgb: [f32; 3]) -> [f32; 3] {
        rgb.map(|c| self.decode(c))
    }

    /// [`encode`](Self::encode) on each channel.
    #[inline]
    pub fn encode_rgb(self, rgb: [f32; 3]) -> [f32; 3] {
        rgb.map(|c| self.encode(c))
    }

    /// Re-encodes a value of this curve into `target`.
    #[inline]
    pub fn convert(self, v: f32, target: TransferCurve) -> f32 {
        target.encode(self.decode(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_round_trip() {
        for curve in [TransferCurve::Srgb, TransferCurve::LINEAR, TransferCurve::Gamma(1.8), TransferCurve::Gamma(2.2)] {
            for i in 0..=50 {
                let v = i as f32 / 50.0;
                assert_abs_diff_eq!(curve.encode(curve.decode(v)), v, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_srgb_segments() {
        assert_eq!(TransferCurve::Srgb.decode(0.0), 0.0);
        assert_abs_diff_eq!(TransferCurve::Srgb.decode(1.0), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(TransferCurve::Srgb.decode(0.04), 0.04 / 12.92, epsilon = 1e-7);
        assert_abs_diff_eq!(TransferCurve::Srgb.encode(0.001), 0.01292, epsilon = 1e-7);
    }

    #[test]
    fn test_clamps() {
        assert_eq!(TransferCurve::Gamma(2.2).decode(-0.5), 0.0);
        assert_eq!(TransferCurve::Srgb.encode(-1.0), 0.0);
        assert_abs_diff_eq!(TransferCurve::Srgb.encode(1.5), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_convert() {
        assert!(TransferCurve::LINEAR.is_linear());
        assert!(!TransferCurve::Gamma(2.2).is_linear());
        // linear mid-gray lands near sRGB 188/255
        assert_abs_diff_eq!(TransferCurve::LINEAR.convert(0.5, TransferCurve::Srgb) * 255.0, 188.0, epsilon = 0.5);
        let rgb = TransferCurve::Srgb.decode_rgb([0.0, 0.5, 1.0]);
        assert_abs_diff_eq!(TransferCurve::Srgb.encode_rgb(rgb)[1], 0.5, epsilon = 1e-5);
    }
}
