use crate::{
    bytecode::{Instruction, Interpretation, Operation, Symbol, Value},
    strings::StringTable,
};

/// Name used when no entry of the string table looks like a function name.
pub const DEFAULT_FUNCTION_NAME: &str = "fas-main";

/// A recovered function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionAst {
    /// Function name.
    pub name: String,
    /// Argument names, all drawn from the string table.
    pub args: Vec<String>,
    /// Body operations in instruction order.
    pub body: Vec<Operation>,
    /// Share of instructions mapped to a known operation kind.
    pub coverage_ratio: f64,
    /// Instructions that could not be interpreted, in offset order.
    pub unresolved: Vec<Instruction>,
}

impl FunctionAst {
    /// Build the function for one interpreted instruction stream.
    ///
    /// `keywords` are never chosen as the function name.
    #[must_use]
    pub fn from_interpretation(
        interpretation: Interpretation,
        table: &StringTable,
        keywords: &[String],
    ) -> Self {
        let name = function_name(table, keywords);
        let args = collect_args(&interpretation.operations, table);

        FunctionAst {
            name,
            args,
            body: interpretation.operations,
            coverage_ratio: interpretation.coverage_ratio,
            unresolved: interpretation.unresolved,
        }
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    text.len() >= 2
        && first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || "-_:*".contains(c))
}

fn is_command_name(text: &str) -> bool {
    text.len() > 2
        && text
            .get(..2)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("c:"))
        && is_identifier(text)
}

/// First `c:` command symbol, else the first non-keyword identifier, else
/// [`DEFAULT_FUNCTION_NAME`].
fn function_name(table: &StringTable, keywords: &[String]) -> String {
    if let Some((_, text)) = table.iter().find(|(_, text)| is_command_name(text)) {
        return text.to_string();
    }

    table
        .iter()
        .map(|(_, text)| text)
        .find(|text| {
            is_identifier(text) && !keywords.iter().any(|k| k.eq_ignore_ascii_case(text))
        })
        .unwrap_or(DEFAULT_FUNCTION_NAME)
        .to_string()
}

fn push_symbol(symbol: &Symbol, table: &StringTable, args: &mut Vec<String>) {
    if let Some(name) = symbol.name() {
        if table.contains_text(name) && !args.iter().any(|a| a == name) {
            args.push(name.to_string());
        }
    }
}

fn visit_value(value: &Value, table: &StringTable, args: &mut Vec<String>) {
    match value {
        Value::Symbol(symbol) => push_symbol(symbol, table, args),
        Value::Operation(operation) => visit_operation(operation, table, args),
        _ => {}
    }
}

fn visit_operation(operation: &Operation, table: &StringTable, args: &mut Vec<String>) {
    match operation {
        Operation::VariableRef { name } => push_symbol(name, table, args),
        Operation::VariableAssign { name, value } => {
            visit_value(value, table, args);
            push_symbol(name, table, args);
        }
        Operation::FunctionCall { args: values, .. }
        | Operation::LogicalCombinator {
            operands: values, ..
        } => values.iter().for_each(|v| visit_value(v, table, args)),
        Operation::ConditionalBlock {
            test: Some(value), ..
        } => visit_value(value, table, args),
        _ => {}
    }
}

/// Distinct variable names in first-seen order.
fn collect_args(operations: &[Operation], table: &StringTable) -> Vec<String> {
    let mut args = Vec::new();
    for operation in operations {
        visit_operation(operation, table, &mut args);
    }
    args
}
