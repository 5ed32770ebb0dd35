//! String and symbol recovery.
//!
//! The string table of a FAS4 payload is not documented, so recovery runs several
//! independent [`Strategy`] scans over one decoded buffer and merges their
//! [`StringCandidate`]s into a single [`StringTable`]:
//!
//! | Strategy | Looks for |
//! |----------|-----------|
//! | [`Strategy::PointerTable`] | `(index, length, bytes)` records at the offset stored in the first dword |
//! | [`Strategy::LengthPrefixed`] | 1- and 2-byte length prefixes at every offset |
//! | [`Strategy::EmbeddedAscii`] | maximal runs of printable ASCII |
//! | [`Strategy::KeyedTransform`] | dictionary keywords hidden behind a single-byte XOR key |
//!
//! At each key the merge prefers the candidate of the higher-priority strategy (table order
//! above), then the longer text, then the higher score, then the lexicographically smaller
//! text. The merge depends only on the candidates, never on the order they were produced in.

mod ascii;
mod keyed;
mod pointer;
mod prefixed;
mod resolver;
mod validate;

pub use ascii::count_embedded_strings;
pub use resolver::{Resolution, StringTableResolver};
pub use validate::{
    bytes_to_text, is_artefact, is_printable, is_valid_string, printable_ratio,
    ARTEFACT_PATTERNS,
};

use std::{cmp::Ordering, collections::BTreeMap};

use strum::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

/// Extraction strategy, declared in priority order (highest first).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumIter,
    EnumCount,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Strategy {
    /// Records reached through the table offset in the first dword.
    PointerTable,
    /// Strings preceded by a 1- or 2-byte length.
    LengthPrefixed,
    /// Plain printable runs.
    EmbeddedAscii,
    /// Keywords recovered through a single-byte XOR key.
    KeyedTransform,
}

impl Strategy {
    /// Merge priority, lower wins.
    #[must_use]
    pub fn priority(self) -> u8 {
        self as u8
    }
}

/// One extraction result. Many candidates may target the same key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringCandidate {
    /// Table key: the record index for pointer-table hits, the byte offset otherwise.
    pub offset: usize,
    /// Recovered text.
    pub text: String,
    /// Strategy that produced the candidate.
    pub strategy: Strategy,
    /// Strategy-specific quality score, 0..=100.
    pub score: u32,
}

impl StringCandidate {
    pub(crate) fn new(offset: usize, text: String, strategy: Strategy, score: u32) -> Self {
        StringCandidate {
            offset,
            text,
            strategy,
            score,
        }
    }

    /// Merge order: `Ordering::Less` means `self` wins over `other`.
    fn merge_cmp(&self, other: &Self) -> Ordering {
        self.strategy
            .priority()
            .cmp(&other.strategy.priority())
            .then_with(|| other.text.len().cmp(&self.text.len()))
            .then_with(|| other.score.cmp(&self.score))
            .then_with(|| self.text.cmp(&other.text))
    }
}

/// A chosen table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringEntry {
    /// The text.
    pub text: String,
    /// Strategy the winning candidate came from.
    pub strategy: Strategy,
}

/// Mapping key → chosen text, one entry per key. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable {
    entries: BTreeMap<usize, StringEntry>,
}

impl StringTable {
    /// Merge `candidates` into a table using the priority/length/score/text rule.
    #[must_use]
    pub fn from_candidates<I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = StringCandidate>,
    {
        let mut best: BTreeMap<usize, StringCandidate> = BTreeMap::new();
        for candidate in candidates {
            match best.get(&candidate.offset) {
                Some(current) if current.merge_cmp(&candidate) != Ordering::Greater => {}
                _ => {
                    best.insert(candidate.offset, candidate);
                }
            }
        }

        StringTable {
            entries: best
                .into_iter()
                .map(|(offset, candidate)| {
                    (
                        offset,
                        StringEntry {
                            text: candidate.text,
                            strategy: candidate.strategy,
                        },
                    )
                })
                .collect(),
        }
    }

    /// Build a table from exact `(key, text)` pairs, as read from a structured image.
    #[must_use]
    pub fn from_exact<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (usize, String)>,
    {
        StringTable {
            entries: entries
                .into_iter()
                .map(|(key, text)| {
                    (
                        key,
                        StringEntry {
                            text,
                            strategy: Strategy::PointerTable,
                        },
                    )
                })
                .collect(),
        }
    }

    /// Text stored at `key`.
    #[must_use]
    pub fn get(&self, key: usize) -> Option<&str> {
        self.entries.get(&key).map(|entry| entry.text.as_str())
    }

    /// Full entry stored at `key`.
    #[must_use]
    pub fn entry(&self, key: usize) -> Option<&StringEntry> {
        self.entries.get(&key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no string was recovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.entries
            .iter()
            .map(|(key, entry)| (*key, entry.text.as_str()))
    }

    /// Returns `true` if any entry holds exactly `text`.
    #[must_use]
    pub fn contains_text(&self, text: &str) -> bool {
        self.entries.values().any(|entry| entry.text == text)
    }

    /// Number of entries won by `strategy`.
    #[must_use]
    pub fn count_by(&self, strategy: Strategy) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.strategy == strategy)
            .count()
    }
}
