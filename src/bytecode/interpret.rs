//! Instruction → operation interpretation.
//!
//! Operands that name strings or symbols are resolved against the recovered
//! [`StringTable`]. The interpreter keeps a simulated value stack: value-producing
//! operations stay pending until a call, assignment or combinator consumes them, at
//! which point they are folded in as operands instead of being emitted separately.

use std::fmt;

use crate::{
    bytecode::{Combinator, Instruction, LiteralKind, OpcodeTable, OperationKind},
    strings::StringTable,
};

/// A name that may or may not have been recovered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Name found in the string table.
    Resolved(String),
    /// Index with no string table entry.
    Unresolved(u32),
    /// The instruction carried no operand to name it by.
    Missing,
}

impl Symbol {
    fn lookup(index: Option<u32>, table: &StringTable) -> Symbol {
        let Some(index) = index else {
            return Symbol::Missing;
        };
        match table.get(index as usize) {
            Some(text) => Symbol::Resolved(text.to_string()),
            None => Symbol::Unresolved(index),
        }
    }

    /// The resolved name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Symbol::Resolved(name) => Some(name),
            Symbol::Unresolved(_) | Symbol::Missing => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Resolved(name) => f.write_str(name),
            Symbol::Unresolved(index) => write!(f, "sym_{index}"),
            Symbol::Missing => f.write_str("nil"),
        }
    }
}

/// An operand value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// String literal.
    Text(String),
    /// Symbol reference.
    Symbol(Symbol),
    /// Integer literal.
    Integer(i64),
    /// Real literal.
    Real(f64),
    /// `nil`.
    Nil,
    /// Nested operation whose result is the value.
    Operation(Box<Operation>),
    /// String index with no table entry.
    Unresolved(u32),
}

/// One recovered operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// `(name args...)`.
    FunctionCall {
        /// Called symbol.
        name: Symbol,
        /// Folded arguments in source order.
        args: Vec<Value>,
    },
    /// Variable read.
    VariableRef {
        /// Variable name.
        name: Symbol,
    },
    /// `(setq name value)`.
    VariableAssign {
        /// Variable name.
        name: Symbol,
        /// Assigned value, `Nil` when nothing could be folded.
        value: Value,
    },
    /// Constant.
    ConstantLiteral {
        /// The constant.
        value: Value,
    },
    /// Conditional block.
    ConditionalBlock {
        /// Folded test expression.
        test: Option<Value>,
        /// Branch target operand.
        target: Option<u32>,
    },
    /// `and` / `or` / `not`.
    LogicalCombinator {
        /// Combinator flavour.
        combinator: Combinator,
        /// Folded operands in source order.
        operands: Vec<Value>,
    },
    /// Instruction that could not be interpreted.
    Unknown {
        /// Instruction offset.
        offset: usize,
        /// Raw instruction bytes.
        raw: Vec<u8>,
    },
}

impl Operation {
    fn is_value(&self) -> bool {
        matches!(
            self,
            Operation::ConstantLiteral { .. } | Operation::VariableRef { .. }
        )
    }

    fn into_value(self) -> Value {
        match self {
            Operation::ConstantLiteral { value } => value,
            Operation::VariableRef { name } => Value::Symbol(name),
            other => Value::Operation(Box::new(other)),
        }
    }

    /// Returns `true` for [`Operation::Unknown`].
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Operation::Unknown { .. })
    }
}

/// Result of interpreting an instruction list.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    /// Operations in instruction order, folded operands removed.
    pub operations: Vec<Operation>,
    /// Number of instructions.
    pub total: usize,
    /// Instructions mapped to a recognized operation kind.
    pub known: usize,
    /// `known / total`, 0 when there are no instructions.
    pub coverage_ratio: f64,
    /// Instructions that interpreted as [`Operation::Unknown`], in offset order.
    pub unresolved: Vec<Instruction>,
}

fn pop_values(pending: &mut Vec<Operation>, count: usize) -> Vec<Value> {
    let mut values = Vec::new();
    while values.len() < count {
        match pending.last() {
            Some(op) if op.is_value() => {
                if let Some(op) = pending.pop() {
                    values.push(op.into_value());
                }
            }
            _ => break,
        }
    }
    values.reverse();
    values
}

fn literal(kind: LiteralKind, operand: Option<u32>, table: &StringTable) -> Value {
    match (kind, operand) {
        (LiteralKind::Nil, _) | (_, None) => Value::Nil,
        (LiteralKind::Integer, Some(value)) => Value::Integer(i64::from(value)),
        (LiteralKind::Text, Some(index)) => table
            .get(index as usize)
            .map_or(Value::Unresolved(index), |text| Value::Text(text.to_string())),
    }
}

/// Interpret `instructions` with the semantics in `opcodes`.
///
/// Never fails: any instruction whose opcode has no operation kind, or whose operand was
/// truncated, becomes [`Operation::Unknown`].
///
/// # Examples
///
/// ```rust
/// use fasscope::bytecode::{decode_stream, interpret, OpcodeTable, Operation, Symbol};
/// use fasscope::strings::StringTable;
///
/// let table = StringTable::from_exact(vec![(1, "princ".to_string())]);
/// let opcodes = OpcodeTable::default();
/// let instructions = decode_stream(&[0x14, 0x01, 0x00, 0x00, 0x00], &opcodes);
///
/// let result = interpret(&instructions, &table, &opcodes);
/// assert_eq!(
///     result.operations,
///     vec![Operation::FunctionCall { name: Symbol::Resolved("princ".into()), args: vec![] }]
/// );
/// assert_eq!(result.coverage_ratio, 1.0);
/// ```
#[must_use]
pub fn interpret(
    instructions: &[Instruction],
    table: &StringTable,
    opcodes: &OpcodeTable,
) -> Interpretation {
    let mut operations: Vec<Operation> = Vec::with_capacity(instructions.len());
    let mut unresolved = Vec::new();
    let mut known = 0_usize;

    for instruction in instructions {
        let kind = if instruction.truncated {
            None
        } else {
            opcodes.kind(instruction.opcode)
        };

        let Some(kind) = kind else {
            unresolved.push(instruction.clone());
            operations.push(Operation::Unknown {
                offset: instruction.offset,
                raw: instruction.bytes.clone(),
            });
            continue;
        };

        known += 1;
        let operand = instruction.operand;
        let operation = match kind {
            OperationKind::FunctionCall { pops } => Operation::FunctionCall {
                name: Symbol::lookup(operand, table),
                args: pop_values(&mut operations, usize::from(pops)),
            },
            OperationKind::VariableRef => Operation::VariableRef {
                name: Symbol::lookup(operand, table),
            },
            OperationKind::VariableAssign => Operation::VariableAssign {
                name: Symbol::lookup(operand, table),
                value: pop_values(&mut operations, 1)
                    .pop()
                    .unwrap_or(Value::Nil),
            },
            OperationKind::ConstantLiteral(literal_kind) => Operation::ConstantLiteral {
                value: literal(literal_kind, operand, table),
            },
            OperationKind::ConditionalBlock => Operation::ConditionalBlock {
                test: pop_values(&mut operations, 1).pop(),
                target: operand,
            },
            OperationKind::LogicalCombinator(combinator) => {
                let count = operand.map_or(combinator.default_arity(), |n| n as usize);
                Operation::LogicalCombinator {
                    combinator,
                    operands: pop_values(&mut operations, count),
                }
            }
        };
        operations.push(operation);
    }

    let total = instructions.len();
    #[allow(clippy::cast_precision_loss)]
    let coverage_ratio = if total == 0 {
        0.0
    } else {
        known as f64 / total as f64
    };

    log::debug!(
        "interpreted {} instructions, {} known ({:.1}%)",
        total,
        known,
        coverage_ratio * 100.0
    );

    Interpretation {
        operations,
        total,
        known,
        coverage_ratio,
        unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{decode_stream, OpcodeSpec, OperandWidth};

    fn table() -> StringTable {
        StringTable::from_exact(vec![
            (1, "princ".to_string()),
            (2, "answer".to_string()),
            (3, "Hello, world".to_string()),
        ])
    }

    #[test]
    fn function_call_resolves_name() {
        let opcodes = OpcodeTable::default();
        let instructions = decode_stream(&[0x14, 0x01, 0x00, 0x00, 0x00], &opcodes);
        let result = interpret(&instructions, &table(), &opcodes);
        assert_eq!(
            result.operations,
            vec![Operation::FunctionCall {
                name: Symbol::Resolved("princ".to_string()),
                args: vec![],
            }]
        );
        assert_eq!(result.known, 1);
        assert!(result.unresolved.is_empty());
    }

    #[test]
    fn unknown_opcodes_lower_coverage() {
        let opcodes = OpcodeTable::default();
        let instructions = decode_stream(b"abcd", &opcodes);
        let result = interpret(&instructions, &table(), &opcodes);
        assert_eq!(result.coverage_ratio, 0.0);
        assert_eq!(result.unresolved.len(), 4);
        assert!(result.operations.iter().all(Operation::is_unknown));
    }

    #[test]
    fn empty_input_has_zero_coverage() {
        let result = interpret(&[], &table(), &OpcodeTable::default());
        assert_eq!(result.coverage_ratio, 0.0);
        assert_eq!(result.total, 0);
    }

    #[test]
    fn assignment_folds_preceding_literal() {
        let opcodes = OpcodeTable::default();
        // push-const 3, setq 2
        let instructions = decode_stream(&[0x01, 0x03, 0x00, 0x03, 0x02, 0x00], &opcodes);
        let result = interpret(&instructions, &table(), &opcodes);
        assert_eq!(
            result.operations,
            vec![Operation::VariableAssign {
                name: Symbol::Resolved("answer".to_string()),
                value: Value::Text("Hello, world".to_string()),
            }]
        );
    }

    #[test]
    fn call_folds_declared_pops() {
        let opcodes = OpcodeTable::default().with(
            0x35,
            OpcodeSpec::new(
                "call1",
                OperandWidth::U32,
                OperationKind::FunctionCall { pops: 1 },
            ),
        );
        // push-var 2, push-const 3, call1 1
        let data = [0x06, 0x02, 0x00, 0x01, 0x03, 0x00, 0x35, 0x01, 0x00, 0x00, 0x00];
        let result = interpret(&decode_stream(&data, &opcodes), &table(), &opcodes);
        assert_eq!(
            result.operations,
            vec![
                Operation::VariableRef {
                    name: Symbol::Resolved("answer".to_string())
                },
                Operation::FunctionCall {
                    name: Symbol::Resolved("princ".to_string()),
                    args: vec![Value::Text("Hello, world".to_string())],
                },
            ]
        );
    }

    #[test]
    fn combinators_and_conditionals() {
        let opcodes = OpcodeTable::empty()
            .with(
                0x06,
                OpcodeSpec::new("push-var", OperandWidth::U16, OperationKind::VariableRef),
            )
            .with(
                0x20,
                OpcodeSpec::new(
                    "and",
                    OperandWidth::None,
                    OperationKind::LogicalCombinator(Combinator::And),
                ),
            )
            .with(
                0x21,
                OpcodeSpec::new("if", OperandWidth::U16, OperationKind::ConditionalBlock),
            );
        let data = [0x06, 0x01, 0x00, 0x06, 0x02, 0x00, 0x20, 0x21, 0x10, 0x00];
        let result = interpret(&decode_stream(&data, &opcodes), &table(), &opcodes);
        assert_eq!(result.operations.len(), 2);
        match &result.operations[0] {
            Operation::LogicalCombinator {
                combinator,
                operands,
            } => {
                assert_eq!(*combinator, Combinator::And);
                assert_eq!(operands.len(), 2);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            result.operations[1],
            Operation::ConditionalBlock {
                test: None,
                target: Some(0x10)
            }
        );
    }

    #[test]
    fn unresolved_symbols() {
        let opcodes = OpcodeTable::default();
        let instructions = decode_stream(&[0x14, 0x63, 0x00, 0x00, 0x00], &opcodes);
        let result = interpret(&instructions, &table(), &opcodes);
        match &result.operations[0] {
            Operation::FunctionCall { name, .. } => {
                assert_eq!(name, &Symbol::Unresolved(0x63));
                assert_eq!(name.to_string(), "sym_99");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn operandless_name_is_not_looked_up() {
        let opcodes = OpcodeTable::empty()
            .with(
                0x20,
                OpcodeSpec::new(
                    "call0",
                    OperandWidth::None,
                    OperationKind::FunctionCall { pops: 0 },
                ),
            )
            .with(
                0x21,
                OpcodeSpec::new("ref0", OperandWidth::None, OperationKind::VariableRef),
            );
        let table = StringTable::from_exact(vec![(0, "dict_name".to_string())]);
        let result = interpret(&decode_stream(&[0x21, 0x20], &opcodes), &table, &opcodes);
        assert_eq!(result.known, 2);
        assert_eq!(
            result.operations,
            vec![
                Operation::VariableRef {
                    name: Symbol::Missing
                },
                Operation::FunctionCall {
                    name: Symbol::Missing,
                    args: vec![]
                },
            ]
        );
        assert_eq!(Symbol::Missing.to_string(), "nil");
        assert_eq!(Symbol::Missing.name(), None);
    }

    #[test]
    fn truncated_instruction_is_unknown() {
        let opcodes = OpcodeTable::default();
        let instructions = decode_stream(&[0x14, 0x01], &opcodes);
        let result = interpret(&instructions, &table(), &opcodes);
        assert_eq!(result.known, 0);
        assert_eq!(result.unresolved.len(), 1);
    }
}
