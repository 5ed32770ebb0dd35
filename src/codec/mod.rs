//! Payload decoding.
//!
//! A framed payload may be stored as-is, zlib or raw-deflate compressed, or run through a
//! keyed substitution cipher. [`PayloadDecoder`] tries every [`Codec`] and returns all
//! successful results as [`DecodedBuffer`] candidates, highest confidence first. The list is
//! never empty: [`Codec::Passthrough`] (the payload unchanged) always succeeds.
//!
//! # Examples
//!
//! ```rust
//! use fasscope::codec::{Codec, PayloadDecoder};
//!
//! let candidates = PayloadDecoder::default().decode(b"abcd");
//! assert_eq!(candidates.len(), 1);
//! assert_eq!(candidates[0].codec(), Codec::Passthrough);
//! assert_eq!(candidates[0].bytes(), b"abcd");
//! ```

mod cipher;
mod inflate;

pub use cipher::{apply_keyed_cipher, next_key};
pub use inflate::{decompress_deflate, decompress_zlib, DecompressError, DecompressResult};

use rayon::prelude::*;
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::{
    config::{CodecConfig, ContainerConfig},
    strings::{count_embedded_strings, printable_ratio},
    utils::with_worker_pool,
};

/// A candidate payload transformation, declared in priority order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Codec {
    /// Payload already starts with the inner format magic.
    Identity,
    /// zlib stream.
    Zlib,
    /// Raw deflate stream.
    RawDeflate,
    /// Rolling-key XOR cipher.
    KeyedCipher,
    /// Payload unchanged, accepted unconditionally.
    Passthrough,
}

impl Codec {
    /// Confidence assigned to a successful decode with this codec.
    #[must_use]
    pub fn confidence(self) -> f64 {
        match self {
            Codec::Identity => 1.0,
            Codec::Zlib => 0.9,
            Codec::RawDeflate => 0.8,
            Codec::KeyedCipher => 0.6,
            Codec::Passthrough => 0.1,
        }
    }
}

/// One decoded version of a payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBuffer {
    bytes: Vec<u8>,
    codec: Codec,
    confidence: f64,
    valid_strings: usize,
    plausible: bool,
}

impl DecodedBuffer {
    /// Wrap `bytes` as the output of `codec` at the codec's base confidence.
    #[must_use]
    pub fn new(bytes: Vec<u8>, codec: Codec) -> Self {
        DecodedBuffer {
            bytes,
            codec,
            confidence: codec.confidence(),
            valid_strings: 0,
            plausible: false,
        }
    }

    fn with_plausibility(mut self, config: &CodecConfig) -> Self {
        self.valid_strings = count_embedded_strings(&self.bytes, config.plausible_min_run);
        self.plausible = self.valid_strings >= config.plausible_min_strings;
        self
    }

    /// Decoded bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Codec that produced the buffer.
    #[must_use]
    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// Confidence in `0.0..=1.0`.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Number of valid embedded strings found by the plausibility check.
    #[must_use]
    pub fn valid_strings(&self) -> usize {
        self.valid_strings
    }

    /// Returns `true` if the buffer holds enough valid strings to look like real data.
    #[must_use]
    pub fn is_plausible(&self) -> bool {
        self.plausible
    }

    /// Length of the decoded bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if nothing was decoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// A new buffer without the leading `prefix`, or `None` if it does not start with it.
    #[must_use]
    pub fn strip_prefix(&self, prefix: &[u8]) -> Option<DecodedBuffer> {
        if prefix.is_empty() {
            return None;
        }
        self.bytes.strip_prefix(prefix).map(|rest| DecodedBuffer {
            bytes: rest.to_vec(),
            ..self.clone()
        })
    }
}

/// Runs the codec chain over a payload.
#[derive(Debug, Clone, Default)]
pub struct PayloadDecoder {
    config: CodecConfig,
    container: ContainerConfig,
    workers: usize,
}

impl PayloadDecoder {
    /// Create a decoder. `container` supplies the magic values the identity and cipher
    /// checks look for; codec attempts run on `workers` threads (0 = one per core).
    #[must_use]
    pub fn new(config: CodecConfig, container: ContainerConfig, workers: usize) -> Self {
        PayloadDecoder {
            config,
            container,
            workers,
        }
    }

    fn has_inner_magic(&self, bytes: &[u8]) -> bool {
        let starts = |magic: &[u8]| !magic.is_empty() && bytes.starts_with(magic);
        starts(&self.container.legacy_magic) || starts(&self.container.inner_prefix)
    }

    fn attempt(&self, codec: Codec, payload: &[u8]) -> Option<DecodedBuffer> {
        let bytes = match codec {
            Codec::Identity => self.has_inner_magic(payload).then(|| payload.to_vec()),
            Codec::Zlib => decompress_zlib(payload, self.config.max_inflated_len)
                .map_err(|e| log::debug!("zlib attempt failed: {e}"))
                .ok(),
            Codec::RawDeflate => decompress_deflate(payload, self.config.max_inflated_len)
                .map_err(|e| log::debug!("raw deflate attempt failed: {e}"))
                .ok(),
            Codec::KeyedCipher => {
                let out = apply_keyed_cipher(payload, self.config.cipher_start_key);
                let accepted = self.has_inner_magic(&out)
                    || (!out.is_empty()
                        && printable_ratio(&out) >= self.config.cipher_min_printable);
                accepted.then_some(out)
            }
            Codec::Passthrough => Some(payload.to_vec()),
        };

        bytes.map(|bytes| DecodedBuffer::new(bytes, codec).with_plausibility(&self.config))
    }

    /// Decode `payload` with every codec.
    ///
    /// The result is ordered by descending confidence, then codec priority, and always ends
    /// with the [`Codec::Passthrough`] candidate. The order does not depend on the worker count.
    #[must_use]
    pub fn decode(&self, payload: &[u8]) -> Vec<DecodedBuffer> {
        let codecs: Vec<Codec> = Codec::iter().collect();
        let mut candidates: Vec<DecodedBuffer> = with_worker_pool(self.workers, || {
            codecs
                .par_iter()
                .filter_map(|&codec| self.attempt(codec, payload))
                .collect()
        });

        candidates.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.codec.cmp(&b.codec))
        });

        for candidate in &candidates {
            log::debug!(
                "codec {} accepted: {} bytes, confidence {:.2}, {} valid strings",
                candidate.codec,
                candidate.len(),
                candidate.confidence,
                candidate.valid_strings
            );
        }

        candidates
    }

    /// Candidates ordered for diagnostics: structurally plausible buffers first, then by
    /// confidence. Does not change which candidate the pipeline uses.
    #[must_use]
    pub fn diagnostic_order(candidates: &[DecodedBuffer]) -> Vec<&DecodedBuffer> {
        let mut ordered: Vec<&DecodedBuffer> = candidates.iter().collect();
        ordered.sort_by(|a, b| {
            b.plausible
                .cmp(&a.plausible)
                .then_with(|| b.confidence.total_cmp(&a.confidence))
                .then_with(|| a.codec.cmp(&b.codec))
        });
        ordered
    }
}
