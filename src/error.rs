use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds
    };
}

/// Container framing failures.
///
/// These are the only fatal conditions of a decompilation run: if the text envelope
/// cannot be framed, there is no payload to recover anything from. Every later stage
/// degrades into warnings instead (see [`crate::pipeline::RecoveryWarning`]).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The header marker token was not found and the input does not start with the
    /// legacy magic either.
    #[error("Container header marker not found")]
    MissingHeader,

    /// The header line was found, but no size line holding an ASCII decimal integer
    /// follows it.
    #[error("Container size line is missing or not a decimal integer")]
    MissingLength,

    /// Fewer payload bytes follow the size line than it declared.
    ///
    /// # Fields
    ///
    /// * `declared` - The payload length from the size line
    /// * `available` - The number of bytes actually present after the size line
    #[error("Payload truncated - declared {declared} bytes, {available} available")]
    TruncatedPayload {
        /// Declared payload length
        declared: usize,
        /// Bytes available after the size line
        available: usize,
    },
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Framing Errors
/// - [`Error::Format`] - The container envelope could not be framed (fatal)
///
/// ## Binary Reading Errors
/// - [`Error::OutOfBounds`] - Attempted to read beyond buffer boundaries
/// - [`Error::Malformed`] - A structured region (legacy image) is inconsistent
/// - [`Error::Empty`] - Empty input provided
///
/// ## I/O and External Errors
/// - [`Error::FileError`] - The input file could not be opened or mapped
///
/// # Examples
///
/// ```rust
/// use fasscope::{Decompiler, Error, FormatError};
///
/// match Decompiler::default().decompile(b"no envelope here") {
///     Err(Error::Format(FormatError::MissingHeader)) => {}
///     other => panic!("unexpected result: {:?}", other.map(|d| d.report)),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The container envelope could not be framed.
    #[error("{0}")]
    Format(#[from] FormatError),

    /// The data is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while reading a buffer.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` if this error means the container could not be framed.
    #[must_use]
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_carries_location() {
        let err = malformed_error!("bad record {}", 3);
        match err {
            Error::Malformed {
                message,
                file,
                line,
            } => {
                assert_eq!(message, "bad record 3");
                assert!(file.ends_with("error.rs"));
                assert!(line > 0);
            }
            _ => panic!("expected Malformed"),
        }
    }

    #[test]
    fn format_errors_convert() {
        let err: Error = FormatError::TruncatedPayload {
            declared: 10,
            available: 4,
        }
        .into();
        assert!(err.is_format());
        assert_eq!(
            err.to_string(),
            "Payload truncated - declared 10 bytes, 4 available"
        );
        assert!(!Error::OutOfBounds.is_format());
    }
}
