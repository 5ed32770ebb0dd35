//! Cursor-based byte stream parser.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a bounds-checked cursor over a
//! byte slice. It is used for the text envelope of the container (line oriented reads), for
//! the length/index records of recovered string tables, for instruction operands and for the
//! legacy image records.
//!
//! # Usage Examples
//!
//! ```rust
//! use fasscope::Parser;
//!
//! let data = b"FAS4-FILE\r\n4\r\nabcd";
//! let mut parser = Parser::new(data);
//!
//! assert_eq!(parser.read_line()?, b"FAS4-FILE");
//! assert_eq!(parser.read_line()?, b"4");
//! assert_eq!(parser.read_bytes(4)?, b"abcd");
//! assert!(!parser.has_more_data());
//! # Ok::<(), fasscope::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, read_le_at_width, FasIO},
    Result,
};

/// A generic binary data parser.
///
/// `Parser` maintains an internal position cursor and validates every read against the
/// underlying slice, so truncated data yields [`crate::Error::OutOfBounds`] and never panics.
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Move the current position to the specified index.
    ///
    /// Seeking to exactly `len()` is allowed and leaves the parser exhausted.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if position is beyond the data length.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        self.position = pos;
        Ok(())
    }

    /// Move the position forward by the specified number of bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if advancing by step would exceed the data length.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        self.position = self.calc_end_position(step)?;
        Ok(())
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Get access to the underlying data buffer.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the number of unread bytes.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Run `f` and restore the position if it fails.
    ///
    /// # Errors
    /// Propagates the error returned by `f`.
    pub fn transactional<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let saved_position = self.position;
        let result = f(self);
        if result.is_err() {
            self.position = saved_position;
        }
        result
    }

    /// Read a little-endian value and advance.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if not enough data remains.
    pub fn read_le<T: FasIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Read an unsigned operand of `width` bytes (0, 1, 2 or 4) and advance.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if not enough data remains.
    pub fn read_le_width(&mut self, width: usize) -> Result<u32> {
        read_le_at_width(self.data, &mut self.position, width)
    }

    /// Compute `pos() + length`, validating it against the buffer end.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on overflow or if the end lies past the data.
    pub fn calc_end_position(&self, length: usize) -> Result<usize> {
        let end = self
            .position
            .checked_add(length)
            .ok_or(out_of_bounds_error!())?;

        if end > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        Ok(end)
    }

    /// Read `length` raw bytes and advance.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `length` bytes remain.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let end = self.calc_end_position(length)?;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Read one text line, accepting both LF and CRLF terminators.
    ///
    /// The returned slice excludes the terminator. A final line without terminator is
    /// returned as-is.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the parser is already exhausted.
    pub fn read_line(&mut self) -> Result<&'a [u8]> {
        if !self.has_more_data() {
            return Err(out_of_bounds_error!());
        }

        let rest = &self.data[self.position..];
        let (line, consumed) = match rest.iter().position(|&b| b == b'\n') {
            Some(lf) => (&rest[..lf], lf + 1),
            None => (rest, rest.len()),
        };
        self.position += consumed;

        Ok(line.strip_suffix(b"\r").unwrap_or(line))
    }
}
