//! Bounds-checked little-endian reading utilities.
//!
//! Every binary reader in the crate (pointer-table records, length prefixes, instruction
//! operands, legacy image records) goes through these helpers, so a malformed or truncated
//! buffer surfaces as [`crate::Error::OutOfBounds`] instead of a panic.
//!
//! # Key Components
//!
//! - [`crate::file::io::FasIO`] - Trait for primitives that can be decoded from raw bytes
//! - [`crate::file::io::read_le`] - Read a value from the start of a buffer
//! - [`crate::file::io::read_le_at`] - Read a value at an offset and advance the offset
//! - [`crate::file::io::read_le_at_width`] - Read a 0/1/2/4-byte unsigned operand
//!
//! # Examples
//!
//! ```rust
//! use fasscope::file::io::read_le_at;
//!
//! let data = [0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0x00, 0x00];
//! let mut offset = 0;
//!
//! let first: u16 = read_le_at(&data, &mut offset)?;
//! let second: u16 = read_le_at(&data, &mut offset)?;
//! let third: u32 = read_le_at(&data, &mut offset)?;
//!
//! assert_eq!((first, second, third), (1, 2, 3));
//! assert_eq!(offset, 8);
//! # Ok::<(), fasscope::Error>(())
//! ```

use crate::{Error::OutOfBounds, Result};

/// Trait for primitive types that can be read from little-endian byte sequences.
pub trait FasIO: Sized {
    /// Fixed-size byte array representation of the type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Decode the value from little-endian bytes.
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_fas_io {
    ($($ty:ty => $n:expr),* $(,)?) => {
        $(
            impl FasIO for $ty {
                type Bytes = [u8; $n];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_fas_io!(u8 => 1, i8 => 1, u16 => 2, i16 => 2, u32 => 4, i32 => 4, u64 => 8, f32 => 4);

/// Read a little-endian value from the start of `data`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `data` is shorter than `T`.
pub fn read_le<T: FasIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Read a little-endian value at `offset`, advancing `offset` past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than `size_of::<T>()` bytes remain.
pub fn read_le_at<T: FasIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}

/// Read an unsigned little-endian value of `width` bytes (0, 1, 2 or 4).
///
/// A width of 0 reads nothing and yields `0`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if not enough bytes remain, or
/// [`crate::Error::Malformed`] for an unsupported width.
pub fn read_le_at_width(data: &[u8], offset: &mut usize, width: usize) -> Result<u32> {
    match width {
        0 => Ok(0),
        1 => Ok(u32::from(read_le_at::<u8>(data, offset)?)),
        2 => Ok(u32::from(read_le_at::<u16>(data, offset)?)),
        4 => read_le_at::<u32>(data, offset),
        other => Err(malformed_error!("Unsupported operand width {}", other)),
    }
}
