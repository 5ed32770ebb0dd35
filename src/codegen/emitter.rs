//! Rendering of values and operations as single source lines.
//!
//! Every function here produces text that is balanced on its own: parentheses only come
//! in pairs, strings are always closed and comments never span lines.

use std::fmt::Write;

use crate::bytecode::{Operation, Symbol, Value};

/// Characters that end an unquoted atom.
const DELIMITERS: &[char] = &['(', ')', '"', ';', '\'', '`', ',', '|', '\\'];

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || c.is_control() || DELIMITERS.contains(&c)
}

/// Escape `text` for use inside a double-quoted string literal.
///
/// # Examples
///
/// ```rust
/// use fasscope::codegen::escape_string;
///
/// assert_eq!(escape_string("say \"hi\"\n"), "say \\\"hi\\\"\\n");
/// ```
#[must_use]
pub fn escape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\{:03o}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out
}

/// Render a string literal, quoted only when it contains separators or delimiters.
#[must_use]
pub fn render_text(text: &str) -> String {
    if text.is_empty() || text.chars().any(is_delimiter) {
        format!("\"{}\"", escape_string(text))
    } else {
        text.to_string()
    }
}

/// Render a symbol name. Delimiters are replaced so the name stays one atom.
#[must_use]
pub fn render_symbol(symbol: &Symbol) -> String {
    let name = symbol.to_string();
    let clean: String = name
        .chars()
        .map(|c| if is_delimiter(c) { '_' } else { c })
        .collect();
    if clean.is_empty() {
        "nil".to_string()
    } else {
        clean
    }
}

fn render_real(value: f64) -> String {
    if !value.is_finite() {
        "nil".to_string()
    } else if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Render an operand value.
#[must_use]
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Text(text) => render_text(text),
        Value::Symbol(symbol) => render_symbol(symbol),
        Value::Integer(value) => value.to_string(),
        Value::Real(value) => render_real(*value),
        Value::Nil => "nil".to_string(),
        Value::Operation(operation) => render_expression(operation),
        Value::Unresolved(index) => format!("str_{index}"),
    }
}

fn render_form(head: &str, items: impl IntoIterator<Item = String>) -> String {
    let mut form = format!("({head}");
    for item in items {
        form.push(' ');
        form.push_str(&item);
    }
    form.push(')');
    form
}

/// Render an operation as an expression. Unknown operations become `nil`.
#[must_use]
pub fn render_expression(operation: &Operation) -> String {
    match operation {
        Operation::FunctionCall { name, args } => {
            render_form(&render_symbol(name), args.iter().map(render_value))
        }
        Operation::VariableRef { name } => render_symbol(name),
        Operation::VariableAssign { name, value } => {
            render_form("setq", [render_symbol(name), render_value(value)])
        }
        Operation::ConstantLiteral { value } => render_value(value),
        Operation::ConditionalBlock { test, .. } => render_form(
            "if",
            [
                test.as_ref().map_or_else(|| "nil".to_string(), render_value),
                "nil".to_string(),
            ],
        ),
        Operation::LogicalCombinator {
            combinator,
            operands,
        } => render_form(
            &combinator.to_string(),
            operands.iter().map(render_value),
        ),
        Operation::Unknown { .. } => "nil".to_string(),
    }
}

/// Render raw bytes as space separated hex.
#[must_use]
pub fn hex_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (index, byte) in bytes.iter().enumerate() {
        if index > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Render a one-line comment. Line breaks in `text` are escaped.
#[must_use]
pub fn comment(text: &str) -> String {
    format!(";; {}", text.replace('\r', "\\r").replace('\n', "\\n"))
}

/// Render one body line for `operation`: an expression, or a comment for unknown operations.
#[must_use]
pub fn render_line(operation: &Operation) -> String {
    match operation {
        Operation::Unknown { offset, raw } => {
            comment(&format!("unknown {offset:06x}: {}", hex_bytes(raw)))
        }
        Operation::ConditionalBlock {
            target: Some(target),
            ..
        } => format!(
            "{} {}",
            render_expression(operation),
            comment(&format!("target {target:#x}"))
        ),
        other => render_expression(other),
    }
}

/// Render a run of unknown operations as one range comment.
///
/// The range is `first..end` in buffer offsets, `end` exclusive. Operations other than
/// [`Operation::Unknown`] are ignored.
#[must_use]
pub fn render_unknown_run(run: &[Operation]) -> String {
    let spans: Vec<(usize, usize)> = run
        .iter()
        .filter_map(|operation| match operation {
            Operation::Unknown { offset, raw } => Some((*offset, offset + raw.len().max(1))),
            _ => None,
        })
        .collect();
    let (Some(first), Some(last)) = (spans.first(), spans.last()) else {
        return comment("unknown");
    };
    match spans.len() {
        1 => comment(&format!("unknown {:06x}", first.0)),
        count => comment(&format!(
            "unknown {:06x}..{:06x} ({count} instructions)",
            first.0, last.1
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::Combinator;

    fn resolved(name: &str) -> Symbol {
        Symbol::Resolved(name.to_string())
    }

    #[test]
    fn text_quoting() {
        assert_eq!(render_text("hello"), "hello");
        assert_eq!(render_text("Hello, world"), "\"Hello, world\"");
        assert_eq!(render_text("a(b"), "\"a(b\"");
        assert_eq!(render_text(""), "\"\"");
        assert_eq!(render_text("x\"y"), "\"x\\\"y\"");
    }

    #[test]
    fn symbols_stay_atoms() {
        assert_eq!(render_symbol(&resolved("c:hello")), "c:hello");
        assert_eq!(render_symbol(&resolved("bad name(")), "bad_name_");
        assert_eq!(render_symbol(&Symbol::Unresolved(4)), "sym_4");
    }

    #[test]
    fn operations() {
        let call = Operation::FunctionCall {
            name: resolved("princ"),
            args: vec![Value::Text("Hello, world".to_string()), Value::Integer(3)],
        };
        assert_eq!(render_line(&call), "(princ \"Hello, world\" 3)");

        let assign = Operation::VariableAssign {
            name: resolved("x"),
            value: Value::Real(2.0),
        };
        assert_eq!(render_line(&assign), "(setq x 2.0)");

        let combinator = Operation::LogicalCombinator {
            combinator: Combinator::Not,
            operands: vec![Value::Operation(Box::new(call))],
        };
        assert_eq!(
            render_line(&combinator),
            "(not (princ \"Hello, world\" 3))"
        );

        let conditional = Operation::ConditionalBlock {
            test: Some(Value::Symbol(resolved("x"))),
            target: Some(0x20),
        };
        assert_eq!(render_line(&conditional), "(if x nil) ;; target 0x20");
    }

    #[test]
    fn unknown_is_comment() {
        let unknown = Operation::Unknown {
            offset: 3,
            raw: vec![0x64, 0x0A],
        };
        assert_eq!(render_line(&unknown), ";; unknown 000003: 64 0a");
        assert_eq!(render_expression(&unknown), "nil");
    }

    #[test]
    fn unknown_runs_collapse() {
        let run: Vec<Operation> = (0..3)
            .map(|offset| Operation::Unknown {
                offset,
                raw: vec![0xFF],
            })
            .collect();
        assert_eq!(
            render_unknown_run(&run),
            ";; unknown 000000..000003 (3 instructions)"
        );
        assert_eq!(render_unknown_run(&run[..1]), ";; unknown 000000");
        assert_eq!(render_unknown_run(&[]), ";; unknown");
    }

    #[test]
    fn comments_are_single_line() {
        assert_eq!(comment("a\nb"), ";; a\\nb");
    }
}
