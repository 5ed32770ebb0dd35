//! FAS4 bytecode decoding.
//!
//! Decoding happens in three steps, each producing a new value:
//!
//! 1. [`decode_stream`] walks the buffer into [`Instruction`]s using the operand widths of
//!    an [`OpcodeTable`]
//! 2. [`interpret`] maps instructions to [`Operation`]s, resolving operands against the
//!    recovered string table and reporting the coverage ratio
//! 3. [`FunctionAst::from_interpretation`] wraps the operations into a named function
//!
//! # Example
//!
//! ```rust
//! use fasscope::bytecode::{decode_stream, interpret, FunctionAst, OpcodeTable};
//! use fasscope::strings::StringTable;
//!
//! let opcodes = OpcodeTable::default();
//! let table = StringTable::from_exact(vec![(1, "c:hello".to_string())]);
//!
//! let instructions = decode_stream(&[0x14, 0x01, 0x00, 0x00, 0x00], &opcodes);
//! let function = FunctionAst::from_interpretation(interpret(&instructions, &table, &opcodes), &table, &[]);
//! assert_eq!(function.name, "c:hello");
//! assert_eq!(function.coverage_ratio, 1.0);
//! ```

mod decoder;
mod function;
mod interpret;
mod opcodes;

pub use decoder::{decode_instruction, decode_stream, Instruction};
pub use function::{FunctionAst, DEFAULT_FUNCTION_NAME};
pub use interpret::{interpret, Interpretation, Operation, Symbol, Value};
pub use opcodes::{
    Combinator, LiteralKind, OpcodeSpec, OpcodeTable, OperandWidth, OperationKind,
};
