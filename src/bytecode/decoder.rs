use std::fmt;

use crate::{bytecode::OpcodeTable, file::parser::Parser};

/// One decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Offset of the opcode byte.
    pub offset: usize,
    /// The opcode byte.
    pub opcode: u8,
    /// Decoded operand, `None` for zero-width or truncated operands.
    pub operand: Option<u32>,
    /// Total size in bytes, opcode included.
    pub size: usize,
    /// Raw bytes of the instruction.
    pub bytes: Vec<u8>,
    /// The operand ran past the end of the buffer; `bytes` holds what was left.
    pub truncated: bool,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06x}:", self.offset)?;
        for byte in &self.bytes {
            write!(f, " {byte:02x}")?;
        }
        if self.truncated {
            write!(f, " (truncated)")?;
        }
        Ok(())
    }
}

/// Decode the instruction starting at the parser position.
///
/// Opcodes missing from `opcodes` have no operand. An operand that would run past the end
/// of the data consumes the remaining bytes and marks the instruction as truncated, so the
/// parser always advances by at least one byte and never reads out of bounds.
///
/// Returns `None` only when the parser is exhausted.
pub fn decode_instruction(parser: &mut Parser, opcodes: &OpcodeTable) -> Option<Instruction> {
    let offset = parser.pos();
    let opcode = parser.read_le::<u8>().ok()?;
    let width = opcodes.width(opcode);

    let (operand, truncated) = if width == 0 {
        (None, false)
    } else if let Ok(value) = parser.read_le_width(width) {
        (Some(value), false)
    } else {
        // read_le_width leaves the position untouched on failure
        let rest = parser.remaining();
        if parser.advance_by(rest).is_err() {
            return None;
        }
        (None, true)
    };

    let end = parser.pos();
    Some(Instruction {
        offset,
        opcode,
        operand,
        size: end - offset,
        bytes: parser.data()[offset..end].to_vec(),
        truncated,
    })
}

/// Decode a whole buffer into instructions, in ascending offset order.
///
/// # Examples
///
/// ```rust
/// use fasscope::bytecode::{decode_stream, OpcodeTable};
///
/// let instructions = decode_stream(&[0x14, 0x01, 0x00, 0x00, 0x00, 0x61], &OpcodeTable::default());
/// assert_eq!(instructions.len(), 2);
/// assert_eq!(instructions[0].operand, Some(1));
/// assert_eq!(instructions[1].offset, 5);
/// ```
#[must_use]
pub fn decode_stream(data: &[u8], opcodes: &OpcodeTable) -> Vec<Instruction> {
    let mut parser = Parser::new(data);
    let mut instructions = Vec::new();

    while parser.has_more_data() {
        match decode_instruction(&mut parser, opcodes) {
            Some(instruction) => instructions.push(instruction),
            None => break,
        }
    }

    instructions
}
