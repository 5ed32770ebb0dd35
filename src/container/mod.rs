//! Container framing.
//!
//! A FAS4 file is a small text envelope around a binary payload:
//!
//! ```text
//! <blank line>?
//! FAS4-FILE ; free annotation text
//! <blank line>?
//! 517
//! <517 payload bytes>
//! ```
//!
//! Line endings may be LF or CRLF. A legacy variant carries no envelope at all and starts
//! directly with the magic `FAS\0` followed by a little-endian version field; such input is
//! passed through unchanged as the payload.
//!
//! Framing is the only fatal stage of the pipeline: [`ContainerReader::read`] either yields
//! an immutable [`Container`] or a [`crate::FormatError`].

mod reader;

pub use reader::ContainerReader;

use strum::{Display, IntoStaticStr};

/// How the payload was framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ContainerKind {
    /// Text envelope with header line and size line.
    Framed,
    /// Magic-prefixed payload without envelope.
    Legacy,
}

/// A framed payload. Built once from the raw input and never modified.
///
/// Invariant: `payload().len() == declared_length()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    kind: ContainerKind,
    header_tag: String,
    declared_length: usize,
    payload: Vec<u8>,
}

impl Container {
    pub(crate) fn new(kind: ContainerKind, header_tag: String, payload: Vec<u8>) -> Self {
        Container {
            kind,
            header_tag,
            declared_length: payload.len(),
            payload,
        }
    }

    /// Framing variant of this container.
    #[must_use]
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// The header line, trimmed, including any annotation text.
    #[must_use]
    pub fn header_tag(&self) -> &str {
        &self.header_tag
    }

    /// Payload length declared by the size line.
    #[must_use]
    pub fn declared_length(&self) -> usize {
        self.declared_length
    }

    /// The payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Consume the container and return its payload.
    #[must_use]
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}
