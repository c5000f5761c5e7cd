//! Color spaces: what the components of a color model mean.
//!
//! A [`ColorSpace`] converts normalized component vectors to and from two
//! reference spaces: 8-bit-range sRGB (`[0, 1]` per channel) and the
//! D50-adapted CIE XYZ connection space used by ICC profiles.
//!
//! # Built-in spaces
//!
//! | Constructor | Family | Components |
//! |-------------|--------|------------|
//! | [`srgb`] | `Rgb` | R, G, B (sRGB curve) |
//! | [`linear_rgb`] | `Rgb` | R, G, B (sRGB primaries, linear) |
//! | [`cie_xyz`] | `Xyz` | X, Y, Z |
//! | [`linear_gray`] | `Gray` | Gray (linear) |
//! | [`gray`] | `Gray` | Gray (power curve) |
//!
//! Color models recognize built-in spaces through [`ColorSpace::standard`]
//! and switch to lookup-table fast paths. User spaces implement the trait and
//! take the generic path.

use std::fmt;
use std::sync::{Arc, OnceLock};

use pixmodel_core::{Error, Result};
use pixmodel_transfer::{TransferCurve, lut::LUMA_WEIGHTS};

/// Coarse classification of a color space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorSpaceFamily {
    /// Three-component RGB.
    Rgb,
    /// Single-component gray.
    Gray,
    /// CIE XYZ.
    Xyz,
    /// Anything else.
    #[default]
    Other,
}

/// Identity of a built-in color space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StandardSpace {
    /// IEC 61966-2-1 sRGB.
    Srgb,
    /// sRGB primaries with a linear transfer.
    LinearRgb,
    /// D50 CIE XYZ.
    CieXyz,
    /// Gray with a power-law transfer; `gamma == 1.0` is linear.
    Gray {
        /// Transfer exponent.
        gamma: f32,
    },
}

/// Component semantics for a color model.
///
/// All vectors are normalized: each component lies in
/// `[min_value(i), max_value(i)]`, and sRGB values lie in `[0, 1]`.
pub trait ColorSpace: Send + Sync + fmt::Debug {
    /// Human-readable name.
    fn name(&self) -> &str;

    /// Coarse classification.
    fn family(&self) -> ColorSpaceFamily;

    /// Number of color components.
    fn num_components(&self) -> usize;

    /// Name of component `index`.
    fn component_name(&self, index: usize) -> Result<&str>;

    /// Smallest normalized value of component `index`.
    fn min_value(&self, _index: usize) -> f32 {
        0.0
    }

    /// Largest normalized value of component `index`.
    fn max_value(&self, _index: usize) -> f32 {
        1.0
    }

    /// Converts components to sRGB.
    fn to_rgb(&self, components: &[f32]) -> [f32; 3];

    /// Converts sRGB to components.
    fn from_rgb(&self, rgb: &[f32; 3]) -> Vec<f32>;

    /// Converts components to D50 CIE XYZ.
    fn to_ciexyz(&self, components: &[f32]) -> [f32; 3];

    /// Converts D50 CIE XYZ to components.
    fn from_ciexyz(&self, xyz: &[f32; 3]) -> Vec<f32>;

    /// Identity of a built-in space, `None` for user spaces.
    fn standard(&self) -> Option<StandardSpace> {
        None
    }

    /// True for sRGB itself.
    fn is_srgb(&self) -> bool {
        matches!(self.standard(), Some(StandardSpace::Srgb))
    }
}

/// Linear sRGB to D50 XYZ (Bradford-adapted).
pub const SRGB_TO_XYZ_D50: [[f32; 3]; 3] = [
    [0.436_074_7, 0.385_064_9, 0.143_080_4],
    [0.222_504_5, 0.716_878_6, 0.060_616_9],
    [0.013_932_2, 0.097_104_5, 0.714_173_3],
];

/// D50 XYZ to linear sRGB.
pub const XYZ_D50_TO_SRGB: [[f32; 3]; 3] = [
    [3.133_856_1, -1.616_866_7, -0.490_614_6],
    [-0.978_768_4, 1.916_141_5, 0.033_454_0],
    [0.071_945_3, -0.228_991_4, 1.405_242_7],
];

/// D50 reference white.
pub const D50_WHITE: [f32; 3] = [0.9642, 1.0, 0.8249];

/// Upper bound of each XYZ component.
pub const XYZ_MAX: f32 = 1.0 + 32767.0 / 32768.0;

#[inline]
fn mul3(m: &[[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

#[inline]
fn clamp01(v: [f32; 3]) -> [f32; 3] {
    [v[0].clamp(0.0, 1.0), v[1].clamp(0.0, 1.0), v[2].clamp(0.0, 1.0)]
}

#[inline]
fn first3(c: &[f32]) -> [f32; 3] {
    [
        c.first().copied().unwrap_or(0.0),
        c.get(1).copied().unwrap_or(0.0),
        c.get(2).copied().unwrap_or(0.0),
    ]
}

/// A built-in color space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardColorSpace {
    kind: StandardSpace,
}

impl StandardColorSpace {
    /// Space of the given kind.
    pub const fn new(kind: StandardSpace) -> Self {
        Self { kind }
    }

    /// Kind of this space.
    pub const fn kind(&self) -> StandardSpace {
        self.kind
    }

    fn linear_from_srgb(&self, rgb: &[f32; 3]) -> [f32; 3] {
        TransferCurve::Srgb.decode_rgb(clamp01(*rgb))
    }
}

impl ColorSpace for StandardColorSpace {
    fn name(&self) -> &str {
        match self.kind {
            StandardSpace::Srgb => "sRGB",
            StandardSpace::LinearRgb => "Linear RGB",
            StandardSpace::CieXyz => "CIE XYZ",
            StandardSpace::Gray { gamma } if gamma == 1.0 => "Linear Gray",
            StandardSpace::Gray { .. } => "Gray",
        }
    }

    fn family(&self) -> ColorSpaceFamily {
        match self.kind {
            StandardSpace::Srgb | StandardSpace::LinearRgb => ColorSpaceFamily::Rgb,
            StandardSpace::CieXyz => ColorSpaceFamily::Xyz,
            StandardSpace::Gray { .. } => ColorSpaceFamily::Gray,
        }
    }

    fn num_components(&self) -> usize {
        match self.kind {
            StandardSpace::Gray { .. } => 1,
            _ => 3,
        }
    }

    fn component_name(&self, index: usize) -> Result<&str> {
        let names: &[&'static str] = match self.kind {
            StandardSpace::Srgb | StandardSpace::LinearRgb => &["Red", "Green", "Blue"],
            StandardSpace::CieXyz => &["X", "Y", "Z"],
            StandardSpace::Gray { .. } => &["Gray"],
        };
        names
            .get(index)
            .copied()
            .ok_or_else(|| Error::out_of_range("component", index as i64, names.len() as i64))
    }

    fn max_value(&self, _index: usize) -> f32 {
        match self.kind {
            StandardSpace::CieXyz => XYZ_MAX,
            _ => 1.0,
        }
    }

    fn to_rgb(&self, c: &[f32]) -> [f32; 3] {
        match self.kind {
            StandardSpace::Srgb => clamp01(first3(c)),
            StandardSpace::LinearRgb => TransferCurve::Srgb.encode_rgb(clamp01(first3(c))),
            StandardSpace::CieXyz => {
                TransferCurve::Srgb.encode_rgb(clamp01(mul3(&XYZ_D50_TO_SRGB, first3(c))))
            }
            StandardSpace::Gray { gamma } => {
                let v = TransferCurve::Gamma(gamma).convert(c.first().copied().unwrap_or(0.0), TransferCurve::Srgb);
                [v, v, v]
            }
        }
    }

    fn from_rgb(&self, rgb: &[f32; 3]) -> Vec<f32> {
        match self.kind {
            StandardSpace::Srgb => clamp01(*rgb).to_vec(),
            StandardSpace::LinearRgb => self.linear_from_srgb(rgb).to_vec(),
            StandardSpace::CieXyz => mul3(&SRGB_TO_XYZ_D50, self.linear_from_srgb(rgb)).to_vec(),
            StandardSpace::Gray { gamma } => {
                let lin = self.linear_from_srgb(rgb);
                let y = LUMA_WEIGHTS[0] * lin[0] + LUMA_WEIGHTS[1] * lin[1] + LUMA_WEIGHTS[2] * lin[2];
                vec![TransferCurve::Gamma(gamma).encode(y)]
            }
        }
    }

    fn to_ciexyz(&self, c: &[f32]) -> [f32; 3] {
        match self.kind {
            StandardSpace::Srgb => mul3(&SRGB_TO_XYZ_D50, TransferCurve::Srgb.decode_rgb(clamp01(first3(c)))),
            StandardSpace::LinearRgb => mul3(&SRGB_TO_XYZ_D50, clamp01(first3(c))),
            StandardSpace::CieXyz => first3(c),
            StandardSpace::Gray { gamma } => {
                let y = TransferCurve::Gamma(gamma).decode(c.first().copied().unwrap_or(0.0));
                [D50_WHITE[0] * y, D50_WHITE[1] * y, D50_WHITE[2] * y]
            }
        }
    }

    fn from_ciexyz(&self, xyz: &[f32; 3]) -> Vec<f32> {
        match self.kind {
            StandardSpace::Srgb => TransferCurve::Srgb.encode_rgb(clamp01(mul3(&XYZ_D50_TO_SRGB, *xyz))).to_vec(),
            StandardSpace::LinearRgb => clamp01(mul3(&XYZ_D50_TO_SRGB, *xyz)).to_vec(),
            StandardSpace::CieXyz => xyz.iter().map(|v| v.clamp(0.0, XYZ_MAX)).collect(),
            StandardSpace::Gray { gamma } => vec![TransferCurve::Gamma(gamma).encode(xyz[1])],
        }
    }

    fn standard(&self) -> Option<StandardSpace> {
        Some(self.kind)
    }
}

macro_rules! shared_space {
    ($(#[$doc:meta])* $name:ident, $kind:expr) => {
        $(#[$doc])*
        pub fn $name() -> Arc<dyn ColorSpace> {
            static SPACE: OnceLock<Arc<dyn ColorSpace>> = OnceLock::new();
            Arc::clone(SPACE.get_or_init(|| Arc::new(StandardColorSpace::new($kind))))
        }
    };
}

shared_space!(
    /// The shared sRGB space.
    srgb,
    StandardSpace::Srgb
);
shared_space!(
    /// The shared linear RGB space.
    linear_rgb,
    StandardSpace::LinearRgb
);
shared_space!(
    /// The shared CIE XYZ space.
    cie_xyz,
    StandardSpace::CieXyz
);
shared_space!(
    /// The shared linear gray space.
    linear_gray,
    StandardSpace::Gray { gamma: 1.0 }
);

/// Gray space with transfer exponent `gamma`.
///
/// # Errors
///
/// [`Error::InvalidConfiguration`] if `gamma` is not a positive finite number.
pub fn gray(gamma: f32) -> Result<Arc<dyn ColorSpace>> {
    if !(gamma.is_finite() && gamma > 0.0) {
        return Err(Error::invalid_config(format!("gray gamma must be > 0, got {gamma}")));
    }
    Ok(Arc::new(StandardColorSpace::new(StandardSpace::Gray { gamma })))
}
