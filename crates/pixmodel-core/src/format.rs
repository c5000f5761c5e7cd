//! Data element types and native pixel transfer arrays.
//!
//! # Types
//!
//! - [`DataType`] - Width and signedness class of a stored element
//! - [`TransferData`] - One typed array holding a pixel (or a run of pixels)
//!   in the native layout of a sample model
//!
//! # Usage
//!
//! ```rust
//! use pixmodel_core::format::{DataType, TransferData};
//!
//! assert_eq!(DataType::UShort.bits(), 16);
//! assert_eq!(DataType::Byte.wrap(300), 44);
//! assert_eq!(DataType::Short.wrap(0xffff), -1);
//!
//! let mut px = TransferData::new(DataType::Byte, 3);
//! px.set(1, 0x1ff).unwrap();
//! assert_eq!(px.get(1).unwrap(), 0xff);
//! ```

use crate::error::{Error, Result};

/// Element type of a data buffer.
///
/// The transfer type of every sample model in this workspace equals its data
/// type, so the same enum names both.
///
/// # Variants
///
/// - `Byte` - 8-bit unsigned [0, 255]
/// - `UShort` - 16-bit unsigned [0, 65535]
/// - `Short` - 16-bit signed [-32768, 32767]
/// - `Int` - 32-bit signed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataType {
    /// 8-bit unsigned.
    #[default]
    Byte,
    /// 16-bit unsigned.
    UShort,
    /// 16-bit signed.
    Short,
    /// 32-bit signed.
    Int,
}

impl DataType {
    /// Number of bits per element.
    #[inline]
    pub const fn bits(&self) -> u32 {
        match self {
            Self::Byte => 8,
            Self::UShort | Self::Short => 16,
            Self::Int => 32,
        }
    }

    /// Bytes per element.
    #[inline]
    pub const fn size_bytes(&self) -> usize {
        (self.bits() / 8) as usize
    }

    /// Whether stored values read back sign-extended.
    #[inline]
    pub const fn is_signed(&self) -> bool {
        matches!(self, Self::Short | Self::Int)
    }

    /// Reduces `value` to what an element of this type would read back.
    ///
    /// Byte and UShort keep the low bits unsigned, Short sign-extends the
    /// low 16 bits, Int is identity.
    #[inline]
    pub const fn wrap(&self, value: i32) -> i32 {
        match self {
            Self::Byte => value as u8 as i32,
            Self::UShort => value as u16 as i32,
            Self::Short => value as i16 as i32,
            Self::Int => value,
        }
    }

    /// Smallest element type holding `bits` bits.
    ///
    /// Returns `None` above 32 bits or at zero.
    #[inline]
    pub const fn for_bits(bits: u32) -> Option<Self> {
        match bits {
            1..=8 => Some(Self::Byte),
            9..=16 => Some(Self::UShort),
            17..=32 => Some(Self::Int),
            _ => None,
        }
    }

    /// Short lowercase name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::UShort => "ushort",
            Self::Short => "short",
            Self::Int => "int",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed primitive array carrying pixels in their native layout.
///
/// Used by `get_data_elements`/`set_data_elements` to copy pixels between
/// same-layout rasters without going through component values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferData {
    /// 8-bit elements.
    Byte(Vec<u8>),
    /// Unsigned 16-bit elements.
    UShort(Vec<u16>),
    /// Signed 16-bit elements.
    Short(Vec<i16>),
    /// 32-bit elements.
    Int(Vec<i32>),
}

impl TransferData {
    /// Zero-filled array of `len` elements.
    pub fn new(data_type: DataType, len: usize) -> Self {
        match data_type {
            DataType::Byte => Self::Byte(vec![0; len]),
            DataType::UShort => Self::UShort(vec![0; len]),
            DataType::Short => Self::Short(vec![0; len]),
            DataType::Int => Self::Int(vec![0; len]),
        }
    }

    /// Builds an array from integer values, wrapping each to the element width.
    pub fn from_i32s(data_type: DataType, values: &[i32]) -> Self {
        match data_type {
            DataType::Byte => Self::Byte(values.iter().map(|&v| v as u8).collect()),
            DataType::UShort => Self::UShort(values.iter().map(|&v| v as u16).collect()),
            DataType::Short => Self::Short(values.iter().map(|&v| v as i16).collect()),
            DataType::Int => Self::Int(values.to_vec()),
        }
    }

    /// Element type of this array.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Byte(_) => DataType::Byte,
            Self::UShort(_) => DataType::UShort,
            Self::Short(_) => DataType::Short,
            Self::Int(_) => DataType::Int,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Byte(v) => v.len(),
            Self::UShort(v) => v.len(),
            Self::Short(v) => v.len(),
            Self::Int(v) => v.len(),
        }
    }

    /// Returns `true` if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads element `i` widened to `i32`.
    pub fn get(&self, i: usize) -> Result<i32> {
        let len = self.len();
        let value = match self {
            Self::Byte(v) => v.get(i).map(|&e| i32::from(e)),
            Self::UShort(v) => v.get(i).map(|&e| i32::from(e)),
            Self::Short(v) => v.get(i).map(|&e| i32::from(e)),
            Self::Int(v) => v.get(i).copied(),
        };
        value.ok_or_else(|| Error::out_of_range("transfer index", i as i64, len as i64))
    }

    /// Writes element `i`, wrapping `value` to the element width.
    pub fn set(&mut self, i: usize, value: i32) -> Result<()> {
        let len = self.len();
        let slot = match self {
            Self::Byte(v) => v.get_mut(i).map(|e| *e = value as u8),
            Self::UShort(v) => v.get_mut(i).map(|e| *e = value as u16),
            Self::Short(v) => v.get_mut(i).map(|e| *e = value as i16),
            Self::Int(v) => v.get_mut(i).map(|e| *e = value),
        };
        slot.ok_or_else(|| Error::out_of_range("transfer index", i as i64, len as i64))
    }

    /// All elements widened to `i32`.
    pub fn to_i32s(&self) -> Vec<i32> {
        match self {
            Self::Byte(v) => v.iter().map(|&e| i32::from(e)).collect(),
            Self::UShort(v) => v.iter().map(|&e| i32::from(e)).collect(),
            Self::Short(v) => v.iter().map(|&e| i32::from(e)).collect(),
            Self::Int(v) => v.clone(),
        }
    }

    /// Checks that this array has `data_type` elements and at least `len` of them.
    pub fn expect_shape(&self, data_type: DataType, len: usize) -> Result<()> {
        if self.data_type() != data_type {
            return Err(Error::format_mismatch(format!(
                "transfer array holds {} elements, {} expected",
                self.data_type(),
                data_type
            )));
        }
        crate::error::ensure_len(len, self.len())
    }
}
