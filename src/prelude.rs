//! # fasscope Prelude
//!
//! The types needed to run a decompilation and inspect its result, importable with one
//! glob.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all fasscope operations
pub use crate::{Error, FormatError};

/// The result type used throughout fasscope
pub use crate::Result;

// ================================================================================================
// Pipeline
// ================================================================================================

pub use crate::config::{
    CodecConfig, CodegenConfig, ContainerConfig, DecoderConfig, DecompilerConfig, ResolverConfig,
};
pub use crate::pipeline::{
    CandidateSummary, Decompilation, Decompiler, RecoveryReport, RecoveryWarning,
};

// ================================================================================================
// Stage Results
// ================================================================================================

pub use crate::bytecode::{FunctionAst, Instruction, OpcodeTable, Operation, Symbol, Value};
pub use crate::codec::{Codec, DecodedBuffer};
pub use crate::container::{Container, ContainerKind};
pub use crate::strings::{Strategy, StringTable};
