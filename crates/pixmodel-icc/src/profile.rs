//! ICC profile wrapper.

use std::fmt;
use std::path::Path;

use lcms2::{CIExyY, CIExyYTRIPLE, ColorSpaceSignature, Profile as LcmsProfile, ToneCurve};
use tracing::debug;

use crate::{IccError, IccResult};

/// Color space class of a profile, as far as the engine cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    /// Three-channel RGB data.
    Rgb,
    /// Single-channel gray data.
    Gray,
    /// Anything else (CMYK, Lab, XYZ, ...).
    Other,
}

/// An ICC color profile.
///
/// # Example
///
/// ```rust
/// use pixmodel_icc::{IccProfile, ProfileKind};
///
/// let srgb = IccProfile::srgb();
/// assert_eq!(srgb.kind(), ProfileKind::Rgb);
/// assert_eq!(srgb.num_components(), 3);
/// ```
pub struct IccProfile {
    pub(crate) inner: LcmsProfile,
}

impl fmt::Debug for IccProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IccProfile")
            .field("kind", &self.kind())
            .field("description", &self.description())
            .finish()
    }
}

impl IccProfile {
    /// IEC 61966-2-1 sRGB.
    pub fn srgb() -> Self {
        Self { inner: LcmsProfile::new_srgb() }
    }

    /// sRGB primaries and white point with a linear transfer curve.
    pub fn linear_srgb() -> IccResult<Self> {
        let white = CIExyY { x: 0.3127, y: 0.3290, Y: 1.0 };
        let primaries = CIExyYTRIPLE {
            Red: CIExyY { x: 0.6400, y: 0.3300, Y: 1.0 },
            Green: CIExyY { x: 0.3000, y: 0.6000, Y: 1.0 },
            Blue: CIExyY { x: 0.1500, y: 0.0600, Y: 1.0 },
        };
        let curve = ToneCurve::new(1.0);
        let curves = [&curve, &curve, &curve];
        let inner =
            LcmsProfile::new_rgb(&white, &primaries, &curves).map_err(|e| IccError::CreateFailed(e.to_string()))?;
        Ok(Self { inner })
    }

    /// D50 gray with a power-law curve of `gamma`.
    pub fn gray(gamma: f64) -> IccResult<Self> {
        if !(gamma.is_finite() && gamma > 0.0) {
            return Err(IccError::CreateFailed(format!("gray gamma must be positive, got {gamma}")));
        }
        let d50 = CIExyY { x: 0.3457, y: 0.3585, Y: 1.0 };
        let curve = ToneCurve::new(gamma);
        let inner = LcmsProfile::new_gray(&d50, &curve).map_err(|e| IccError::CreateFailed(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Parses raw ICC data.
    pub fn from_bytes(data: &[u8]) -> IccResult<Self> {
        let inner = LcmsProfile::new_icc(data).map_err(|e| IccError::InvalidProfile(e.to_string()))?;
        debug!(bytes = data.len(), "IccProfile::from_bytes");
        Ok(Self { inner })
    }

    /// Loads an `.icc` / `.icm` file.
    pub fn from_file(path: &Path) -> IccResult<Self> {
        let data = std::fs::read(path)?;
        let inner = LcmsProfile::new_icc(&data).map_err(|e| IccError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "IccProfile::from_file");
        Ok(Self { inner })
    }

    /// Serializes the profile.
    pub fn to_bytes(&self) -> IccResult<Vec<u8>> {
        self.inner.icc().map_err(|e| IccError::InvalidProfile(e.to_string()))
    }

    /// Color space class.
    pub fn kind(&self) -> ProfileKind {
        match self.inner.color_space() {
            ColorSpaceSignature::RgbData => ProfileKind::Rgb,
            ColorSpaceSignature::GrayData => ProfileKind::Gray,
            _ => ProfileKind::Other,
        }
    }

    /// Color space signature, for messages.
    pub fn signature(&self) -> String {
        format!("{:?}", self.inner.color_space())
    }

    /// Channels of the profile's data color space.
    pub fn num_components(&self) -> usize {
        match self.inner.color_space() {
            ColorSpaceSignature::GrayData => 1,
            ColorSpaceSignature::CmykData => 4,
            _ => 3,
        }
    }

    /// Profile description, empty when absent.
    pub fn description(&self) -> String {
        self.inner
            .info(lcms2::InfoType::Description, lcms2::Locale::none())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(IccProfile::srgb().kind(), ProfileKind::Rgb);
        assert_eq!(IccProfile::linear_srgb().unwrap().kind(), ProfileKind::Rgb);
        let gray = IccProfile::gray(2.2).unwrap();
        assert_eq!(gray.kind(), ProfileKind::Gray);
        assert_eq!(gray.num_components(), 1);
        assert!(IccProfile::gray(0.0).is_err());
    }

    #[test]
    fn test_bytes_round_trip() {
        let bytes = IccProfile::srgb().to_bytes().unwrap();
        let back = IccProfile::from_bytes(&bytes).unwrap();
        assert_eq!(back.kind(), ProfileKind::Rgb);
        assert!(IccProfile::from_bytes(&[0u8; 16]).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = IccProfile::from_file(Path::new("/nonexistent/profile.icc")).unwrap_err();
        assert!(matches!(err, IccError::Io(_)));
    }
}
