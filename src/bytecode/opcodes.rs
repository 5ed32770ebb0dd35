//! Opcode arity and semantics table.
//!
//! FAS4 opcode semantics are only partially reverse-engineered, so the table is data rather
//! than a `match`: callers can extend or replace every entry through
//! [`crate::config::DecompilerConfig::with_opcodes`]. Opcodes missing from the table decode
//! as one-byte instructions and interpret as unknown operations, which lowers the coverage
//! ratio instead of failing.

use std::collections::BTreeMap;

use strum::{Display, IntoStaticStr};

/// Size of the little-endian operand following an opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, IntoStaticStr)]
pub enum OperandWidth {
    /// No operand.
    #[default]
    None,
    /// One byte.
    U8,
    /// Two bytes, little-endian.
    U16,
    /// Four bytes, little-endian.
    U32,
}

impl OperandWidth {
    /// Width in bytes.
    #[must_use]
    pub fn bytes(self) -> usize {
        match self {
            OperandWidth::None => 0,
            OperandWidth::U8 => 1,
            OperandWidth::U16 => 2,
            OperandWidth::U32 => 4,
        }
    }
}

/// How a constant-literal operand is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum LiteralKind {
    /// String table index.
    Text,
    /// Immediate integer.
    Integer,
    /// No operand, always `nil`.
    Nil,
}

/// Logical combinator flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Combinator {
    /// All operands true.
    And,
    /// Any operand true.
    Or,
    /// Negation of one operand.
    Not,
}

impl Combinator {
    /// Operand count used when the instruction carries no explicit count.
    #[must_use]
    pub fn default_arity(self) -> usize {
        match self {
            Combinator::Not => 1,
            Combinator::And | Combinator::Or => 2,
        }
    }
}

/// Operation produced by an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Call of the symbol named by the operand, consuming `pops` preceding values.
    FunctionCall {
        /// Preceding value operations folded into the argument list.
        pops: u8,
    },
    /// Read of the variable named by the operand.
    VariableRef,
    /// Assignment to the variable named by the operand.
    VariableAssign,
    /// Constant value.
    ConstantLiteral(LiteralKind),
    /// Conditional block, operand is the branch target if present.
    ConditionalBlock,
    /// `and` / `or` / `not`, operand is the operand count if present.
    LogicalCombinator(Combinator),
}

/// One opcode table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpcodeSpec {
    /// Operand size.
    pub width: OperandWidth,
    /// Operation the opcode maps to; `None` keeps the arity but interprets as unknown.
    pub kind: Option<OperationKind>,
    /// Display name used in listings.
    pub mnemonic: &'static str,
}

impl OpcodeSpec {
    /// Entry with a known operation kind.
    #[must_use]
    pub const fn new(mnemonic: &'static str, width: OperandWidth, kind: OperationKind) -> Self {
        OpcodeSpec {
            width,
            kind: Some(kind),
            mnemonic,
        }
    }

    /// Entry with a known arity but unknown semantics.
    #[must_use]
    pub const fn arity_only(mnemonic: &'static str, width: OperandWidth) -> Self {
        OpcodeSpec {
            width,
            kind: None,
            mnemonic,
        }
    }
}

/// Extensible opcode → [`OpcodeSpec`] mapping.
///
/// # Examples
///
/// ```rust
/// use fasscope::bytecode::{OpcodeSpec, OpcodeTable, OperandWidth, OperationKind};
///
/// let table = OpcodeTable::default().with(
///     0x35,
///     OpcodeSpec::new("call2", OperandWidth::U32, OperationKind::FunctionCall { pops: 2 }),
/// );
/// assert_eq!(table.width(0x35), 4);
/// assert_eq!(table.width(0x61), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpcodeTable {
    entries: BTreeMap<u8, OpcodeSpec>,
}

impl OpcodeTable {
    /// Table without any entry.
    #[must_use]
    pub fn empty() -> Self {
        OpcodeTable {
            entries: BTreeMap::new(),
        }
    }

    /// Add or replace the entry of `opcode`.
    #[must_use]
    pub fn with(mut self, opcode: u8, spec: OpcodeSpec) -> Self {
        self.entries.insert(opcode, spec);
        self
    }

    /// Remove the entry of `opcode`.
    #[must_use]
    pub fn without(mut self, opcode: u8) -> Self {
        self.entries.remove(&opcode);
        self
    }

    /// Entry of `opcode`.
    #[must_use]
    pub fn get(&self, opcode: u8) -> Option<&OpcodeSpec> {
        self.entries.get(&opcode)
    }

    /// Operand width of `opcode` in bytes, 0 for unlisted opcodes.
    #[must_use]
    pub fn width(&self, opcode: u8) -> usize {
        self.get(opcode).map_or(0, |spec| spec.width.bytes())
    }

    /// Operation kind of `opcode`.
    #[must_use]
    pub fn kind(&self, opcode: u8) -> Option<OperationKind> {
        self.get(opcode).and_then(|spec| spec.kind)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for OpcodeTable {
    /// The best current guess for FAS4: string literals, variable reads and writes, and
    /// calls through a 4-byte symbol index.
    fn default() -> Self {
        OpcodeTable::empty()
            .with(
                0x01,
                OpcodeSpec::new(
                    "push-const",
                    OperandWidth::U16,
                    OperationKind::ConstantLiteral(LiteralKind::Text),
                ),
            )
            .with(
                0x03,
                OpcodeSpec::new("setq", OperandWidth::U16, OperationKind::VariableAssign),
            )
            .with(
                0x06,
                OpcodeSpec::new("push-var", OperandWidth::U16, OperationKind::VariableRef),
            )
            .with(
                0x14,
                OpcodeSpec::new(
                    "call",
                    OperandWidth::U32,
                    OperationKind::FunctionCall { pops: 0 },
                ),
            )
    }
}
