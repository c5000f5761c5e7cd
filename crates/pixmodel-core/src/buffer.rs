//! Banked element storage shared between rasters.
//!
//! A [`DataBuffer`] holds one or more equally sized banks of 8/16/32-bit
//! elements addressed by `(bank, index)`. Sample models never touch memory
//! directly; every read and write goes through this type.
//!
//! # Sharing
//!
//! Elements live in atomic cells, so a buffer wrapped in an [`Arc`] can be
//! read and written through shared references by a parent raster and all of
//! its child views. Accesses use relaxed ordering: the buffer never tears or
//! corrupts a single element, but unsynchronised writers to the same pixel
//! race at the pixel level. Callers that need ordering synchronise externally.
//!
//! # Usage
//!
//! ```rust
//! use pixmodel_core::{DataBuffer, DataType};
//!
//! let buf = DataBuffer::new(DataType::Byte, 16, 3).unwrap();
//! buf.set_elem(2, 5, 300).unwrap();
//! assert_eq!(buf.elem(2, 5).unwrap(), 44);
//! assert!(buf.elem(3, 0).is_err());
//! ```
//!
//! [`Arc`]: std::sync::Arc

use std::sync::atomic::{AtomicI16, AtomicI32, AtomicU8, AtomicU16, Ordering};

use tracing::trace;

use crate::error::{Error, Result};
use crate::format::DataType;

#[derive(Debug)]
enum Banks {
    Byte(Vec<Box<[AtomicU8]>>),
    UShort(Vec<Box<[AtomicU16]>>),
    Short(Vec<Box<[AtomicI16]>>),
    Int(Vec<Box<[AtomicI32]>>),
}

/// Fixed-size banked storage of numeric elements.
#[derive(Debug)]
pub struct DataBuffer {
    banks: Banks,
    size: usize,
}

fn cell<T>(banks: &[Box<[T]>], bank: usize, index: usize) -> Result<&T> {
    let b = banks
        .get(bank)
        .ok_or_else(|| Error::out_of_range("bank", bank as i64, banks.len() as i64))?;
    b.get(index)
        .ok_or_else(|| Error::out_of_range("element index", index as i64, b.len() as i64))
}

fn zeroed<T>(size: usize, num_banks: usize, zero: impl Fn() -> T) -> Vec<Box<[T]>> {
    (0..num_banks)
        .map(|_| (0..size).map(|_| zero()).collect())
        .collect()
}

fn from_vecs<T, A>(banks: Vec<Vec<T>>, wrap: impl Fn(T) -> A) -> Result<(Vec<Box<[A]>>, usize)> {
    let size = match banks.first() {
        Some(b) => b.len(),
        None => return Err(Error::invalid_config("data buffer needs at least one bank")),
    };
    if let Some(bad) = banks.iter().position(|b| b.len() != size) {
        return Err(Error::invalid_config(format!(
            "bank {bad} holds {} elements, bank 0 holds {size}",
            banks[bad].len()
        )));
    }
    let banks = banks
        .into_iter()
        .map(|b| b.into_iter().map(&wrap).collect())
        .collect();
    Ok((banks, size))
}

impl DataBuffer {
    /// Allocates `num_banks` zeroed banks of `size` elements each.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] if `num_banks` is zero.
    pub fn new(data_type: DataType, size: usize, num_banks: usize) -> Result<Self> {
        if num_banks == 0 {
            return Err(Error::invalid_config("data buffer needs at least one bank"));
        }
        trace!(%data_type, size, num_banks, "DataBuffer::new");
        let banks = match data_type {
            DataType::Byte => Banks::Byte(zeroed(size, num_banks, || AtomicU8::new(0))),
            DataType::UShort => Banks::UShort(zeroed(size, num_banks, || AtomicU16::new(0))),
            DataType::Short => Banks::Short(zeroed(size, num_banks, || AtomicI16::new(0))),
            DataType::Int => Banks::Int(zeroed(size, num_banks, || AtomicI32::new(0))),
        };
        Ok(Self { banks, size })
    }

    /// Wraps existing byte banks. All banks must have the same length.
    pub fn from_u8_banks(banks: Vec<Vec<u8>>) -> Result<Self> {
        let (banks, size) = from_vecs(banks, AtomicU8::new)?;
        Ok(Self {
            banks: Banks::Byte(banks),
            size,
        })
    }

    /// Wraps existing unsigned 16-bit banks.
    pub fn from_u16_banks(banks: Vec<Vec<u16>>) -> Result<Self> {
        let (banks, size) = from_vecs(banks, AtomicU16::new)?;
        Ok(Self {
            banks: Banks::UShort(banks),
            size,
        })
    }

    /// Wraps existing signed 16-bit banks.
    pub fn from_i16_banks(banks: Vec<Vec<i16>>) -> Result<Self> {
        let (banks, size) = from_vecs(banks, AtomicI16::new)?;
        Ok(Self {
            banks: Banks::Short(banks),
            size,
        })
    }

    /// Wraps existing 32-bit banks.
    pub fn from_i32_banks(banks: Vec<Vec<i32>>) -> Result<Self> {
        let (banks, size) = from_vecs(banks, AtomicI32::new)?;
        Ok(Self {
            banks: Banks::Int(banks),
            size,
        })
    }

    /// Element type of every bank.
    pub fn data_type(&self) -> DataType {
        match self.banks {
            Banks::Byte(_) => DataType::Byte,
            Banks::UShort(_) => DataType::UShort,
            Banks::Short(_) => DataType::Short,
            Banks::Int(_) => DataType::Int,
        }
    }

    /// Number of banks.
    pub fn num_banks(&self) -> usize {
        match &self.banks {
            Banks::Byte(b) => b.len(),
            Banks::UShort(b) => b.len(),
            Banks::Short(b) => b.len(),
            Banks::Int(b) => b.len(),
        }
    }

    /// Elements per bank.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Reads one element widened to `i32`.
    ///
    /// Byte and UShort elements read back unsigned, Short sign-extends.
    #[inline]
    pub fn elem(&self, bank: usize, index: usize) -> Result<i32> {
        Ok(match &self.banks {
            Banks::Byte(b) => i32::from(cell(b, bank, index)?.load(Ordering::Relaxed)),
            Banks::UShort(b) => i32::from(cell(b, bank, index)?.load(Ordering::Relaxed)),
            Banks::Short(b) => i32::from(cell(b, bank, index)?.load(Ordering::Relaxed)),
            Banks::Int(b) => cell(b, bank, index)?.load(Ordering::Relaxed),
        })
    }

    /// Writes one element, keeping the low bits that fit the element width.
    #[inline]
    pub fn set_elem(&self, bank: usize, index: usize, value: i32) -> Result<()> {
        match &self.banks {
            Banks::Byte(b) => cell(b, bank, index)?.store(value as u8, Ordering::Relaxed),
            Banks::UShort(b) => cell(b, bank, index)?.store(value as u16, Ordering::Relaxed),
            Banks::Short(b) => cell(b, bank, index)?.store(value as i16, Ordering::Relaxed),
            Banks::Int(b) => cell(b, bank, index)?.store(value, Ordering::Relaxed),
        }
        Ok(())
    }

    /// Reads one element as `f32`.
    #[inline]
    pub fn elem_f32(&self, bank: usize, index: usize) -> Result<f32> {
        Ok(self.elem(bank, index)? as f32)
    }

    /// Reads one element as `f64`.
    #[inline]
    pub fn elem_f64(&self, bank: usize, index: usize) -> Result<f64> {
        Ok(f64::from(self.elem(bank, index)?))
    }

    /// Writes a float value, truncating toward zero and then wrapping.
    ///
    /// Values beyond the `i32` range saturate before wrapping; NaN stores 0.
    #[inline]
    pub fn set_elem_f32(&self, bank: usize, index: usize, value: f32) -> Result<()> {
        self.set_elem(bank, index, value as i32)
    }

    /// Writes a double value, truncating toward zero and then wrapping.
    #[inline]
    pub fn set_elem_f64(&self, bank: usize, index: usize, value: f64) -> Result<()> {
        self.set_elem(bank, index, value as i32)
    }

    /// Snapshot of one bank widened to `i32`.
    pub fn bank_to_vec(&self, bank: usize) -> Result<Vec<i32>> {
        (0..self.size).map(|i| self.elem(bank, i)).collect()
    }
}
