//! Deflate decoding for compressed payloads.
//!
//! FAS4 payloads are either zlib-wrapped or raw deflate streams. Both are inflated with the
//! low-level [`flate2::Decompress`] state machine so that a stream which never reaches its
//! end marker is reported as truncated instead of silently yielding a prefix, and so that
//! the inflated size can be capped.

use flate2::{Decompress, FlushDecompress, Status};

/// Result type for decompression operations.
pub type DecompressResult<T> = std::result::Result<T, DecompressError>;

/// Error type for decompression operations.
///
/// Never escapes the codec stage: a failed attempt just removes that codec from the
/// candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecompressError {
    /// The stream is not valid deflate data.
    DeflateError(String),
    /// Input ended before the stream end marker.
    Truncated,
    /// Inflated output would exceed the configured limit.
    TooLarge(usize),
}

impl std::fmt::Display for DecompressError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeflateError(msg) => write!(f, "Deflate decompression error: {msg}"),
            Self::Truncated => write!(f, "Deflate stream ended before its end marker"),
            Self::TooLarge(limit) => write!(f, "Inflated output exceeds {limit} bytes"),
        }
    }
}

impl std::error::Error for DecompressError {}

const INITIAL_CAPACITY: usize = 4096;

fn inflate(data: &[u8], zlib_header: bool, max_len: usize) -> DecompressResult<Vec<u8>> {
    // One byte past the cap tells "exactly max_len" apart from "more than max_len".
    let limit = max_len.saturating_add(1);
    let mut decoder = Decompress::new(zlib_header);
    let mut out =
        Vec::with_capacity(data.len().saturating_mul(4).clamp(64, INITIAL_CAPACITY).min(limit));

    loop {
        if out.len() == out.capacity() {
            if out.len() >= limit {
                return Err(DecompressError::TooLarge(max_len));
            }
            let grow = out.capacity().max(INITIAL_CAPACITY).min(limit - out.len());
            out.reserve_exact(grow);
        }

        let consumed = usize::try_from(decoder.total_in()).unwrap_or(data.len());
        let input = data.get(consumed..).unwrap_or_default();
        let (in_before, out_before) = (decoder.total_in(), decoder.total_out());

        let status = decoder
            .decompress_vec(input, &mut out, FlushDecompress::None)
            .map_err(|e| DecompressError::DeflateError(e.to_string()))?;

        if status == Status::StreamEnd {
            if out.len() > max_len {
                return Err(DecompressError::TooLarge(max_len));
            }
            return Ok(out);
        }

        // A full output buffer means "grow"; no progress with room left means the input ran out.
        let progressed = decoder.total_in() != in_before || decoder.total_out() != out_before;
        if !progressed && out.len() < out.capacity() {
            return Err(DecompressError::Truncated);
        }
    }
}

/// Inflate a zlib stream (RFC 1950 header and Adler-32 trailer).
///
/// # Errors
/// Returns [`DecompressError`] if the stream is invalid, truncated or too large.
pub fn decompress_zlib(data: &[u8], max_len: usize) -> DecompressResult<Vec<u8>> {
    inflate(data, true, max_len)
}

/// Inflate a raw deflate stream (RFC 1951, no wrapper).
///
/// # Errors
/// Returns [`DecompressError`] if the stream is invalid, truncated or too large.
pub fn decompress_deflate(data: &[u8], max_len: usize) -> DecompressResult<Vec<u8>> {
    inflate(data, false, max_len)
}
