// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0


#![doc(html_no_source)]
#![deny(missing_docs)]

//! # fasscope
//!
//! Best-effort recovery of readable source text from FAS4 compiled-script containers.
//!
//! A FAS4 file wraps an opaque, possibly compressed or ciphered bytecode payload in a small
//! text envelope. `fasscope` frames the envelope, tries every known payload codec, recovers
//! the string table with several independent heuristics, decodes the instruction stream
//! against a configurable opcode table and regenerates well-formed source text. Nothing but
//! container framing is fatal: every later stage degrades gracefully and reports how much
//! it trusts its own output.
//!
//! ## Quick Start
//!
//! ```rust
//! use fasscope::prelude::*;
//!
//! let decompilation = Decompiler::default().decompile(b"FAS4-FILE ; demo\r\n4\r\nabcd")?;
//! println!("{}", decompilation.source);
//! println!("coverage: {:.0}%", decompilation.report.coverage_ratio * 100.0);
//! # Ok::<(), fasscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! The pipeline is a sequence of stages, each consuming the previous stage's output:
//!
//! - [`container`] - Frames the text envelope and extracts the declared payload
//! - [`codec`] - Decodes the payload with every known codec and ranks the candidates
//! - [`strings`] - Reconstructs the string table from pointer tables, length prefixes,
//!   embedded text and keyed transforms
//! - [`bytecode`] - Decodes instructions and folds them into operations
//! - [`legacy`] - Parses the fully structured legacy image format exactly
//! - [`codegen`] - Renders functions and modules as source text
//! - [`pipeline`] - Runs everything and produces a [`RecoveryReport`]
//!
//! Configuration for every stage lives in [`config`]; all limits and thresholds are
//! fields there, never hard-coded constants.
//!
//! ## Concurrency
//!
//! Codec attempts and the keyed-transform string scan run on a bounded rayon pool sized by
//! [`config::DecompilerConfig::workers`]. Results are collected in input order, so the
//! output is identical for every worker count.
//!
//! ## Error Handling
//!
//! Fatal problems are returned as [`Error`]; everything else is a
//! [`RecoveryWarning`] inside the report:
//!
//! ```rust
//! use fasscope::{Decompiler, Error};
//!
//! match Decompiler::default().decompile(b"not a container") {
//!     Ok(d) => println!("{}", d.report),
//!     Err(Error::Format(reason)) => println!("cannot frame input: {reason}"),
//!     Err(e) => println!("other error: {e}"),
//! }
//! ```

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust
/// use fasscope::prelude::*;
///
/// let decompiler = Decompiler::new(DecompilerConfig::sequential());
/// assert_eq!(decompiler.config().workers, 1);
/// ```
pub mod prelude;

/// Input loading and bounds-checked binary parsing.
pub mod file;

/// Tunable limits and thresholds for every stage.
pub mod config;

/// Text envelope framing.
pub mod container;

/// Payload codecs and candidate ranking.
pub mod codec;

/// String table reconstruction.
///
/// See [`strings::StringTableResolver`] for the merge rules between strategies.
pub mod strings;

/// Instruction decoding, operation folding and function recovery.
pub mod bytecode;

/// Exact parser for structured legacy images.
pub mod legacy;

/// Source text generation.
pub mod codegen;

/// The end-to-end decompilation pipeline.
pub mod pipeline;

pub(crate) mod utils;

/// `fasscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

pub use error::{Error, FormatError};

/// Main entry point: runs the full pipeline on one container.
///
/// # Example
///
/// ```rust
/// use fasscope::Decompiler;
///
/// let d = Decompiler::default().decompile(b"FAS4-FILE\n1\nx")?;
/// assert!(d.source.starts_with(";;"));
/// # Ok::<(), fasscope::Error>(())
/// ```
pub use pipeline::{Decompilation, Decompiler, RecoveryReport, RecoveryWarning};

/// Low-level input and parsing utilities.
pub use file::{parser::Parser, Input};
