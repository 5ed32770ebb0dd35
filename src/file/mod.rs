//! Input access for compiled-script containers.
//!
//! This module is the only place the crate touches the filesystem. An [`Input`] owns the raw
//! bytes of one container, either as an in-memory buffer or as a read-only memory map, and
//! hands them to [`crate::container::ContainerReader`] as a plain slice.
//!
//! # Key Components
//!
//! - [`Input`] - Owned input bytes, backed by memory or a mapped file
//! - [`Backend`] - Trait abstracting over the data source
//! - [`crate::file::parser::Parser`] - Cursor-based reader used by every binary stage
//! - [`crate::file::io`] - Bounds-checked little-endian primitives
//!
//! # Examples
//!
//! ```rust
//! use fasscope::file::Input;
//!
//! let input = Input::from_mem(b"FAS4-FILE\n1\nx".to_vec())?;
//! assert_eq!(input.len(), 13);
//! # Ok::<(), fasscope::Error>(())
//! ```

pub mod io;
pub mod parser;

mod memory;
mod physical;

use std::path::Path;

use crate::{Error::Empty, Result};
use memory::Memory;
use physical::Physical;

/// Backend trait for input data sources.
///
/// All implementations must be thread-safe, since the decoded stages may be evaluated on a
/// worker pool while the input is alive.
pub trait Backend: Send + Sync {
    /// Returns a slice of `len` bytes starting at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range exceeds the data.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the complete data.
    fn data(&self) -> &[u8];

    /// Returns the number of bytes available.
    fn len(&self) -> usize;
}

/// Raw bytes of one container file.
pub struct Input {
    data: Box<dyn Backend>,
}

impl Input {
    /// Memory-map the file at `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened, or
    /// [`crate::Error::Empty`] if it holds no bytes.
    pub fn from_file(path: &Path) -> Result<Input> {
        let input = Physical::new(path)?;

        Self::load(input)
    }

    /// Wrap an owned buffer.
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] if `data` is empty.
    pub fn from_mem(data: Vec<u8>) -> Result<Input> {
        let input = Memory::new(data);

        Self::load(input)
    }

    fn load<T: Backend + 'static>(data: T) -> Result<Input> {
        if data.len() == 0 {
            return Err(Empty);
        }

        Ok(Input {
            data: Box::new(data),
        })
    }

    /// Returns the complete input.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// Returns a slice of `len` bytes starting at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range exceeds the input.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.data.data_slice(offset, len)
    }

    /// Returns the input length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the input holds no bytes. Never the case for a loaded input.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }
}
