//! Source regeneration.
//!
//! [`CodeGenerator`] turns recovered [`FunctionAst`]s back into source text. Output is a
//! pure function of its input: the same function always renders to byte-identical text,
//! and every listing is in ascending offset order.
//!
//! Whatever the coverage, the generated text is well formed: each function is a balanced
//! `(defun ...)` form with at least one expression in its body, and all diagnostic content
//! is carried in `;;` comment lines. When the coverage ratio falls below the configured
//! threshold, the function is tagged with [`PARTIAL_MARKER`] and followed by a capped
//! listing of the instructions that could not be interpreted. In the body, each run of
//! consecutive unknown instructions collapses into one range comment; raw bytes appear only
//! in the listing.
//!
//! # Examples
//!
//! ```rust
//! use fasscope::bytecode::{FunctionAst, Operation, Symbol, Value};
//! use fasscope::codegen::CodeGenerator;
//!
//! let function = FunctionAst {
//!     name: "c:hello".to_string(),
//!     args: vec![],
//!     body: vec![Operation::FunctionCall {
//!         name: Symbol::Resolved("princ".to_string()),
//!         args: vec![Value::Text("Hello, world".to_string())],
//!     }],
//!     coverage_ratio: 1.0,
//!     unresolved: vec![],
//! };
//!
//! let source = CodeGenerator::default().build_source(&function);
//! assert_eq!(source, "(defun c:hello ()\n  (princ \"Hello, world\")\n)\n");
//! ```

mod emitter;

pub use emitter::{
    comment, escape_string, hex_bytes, render_expression, render_line, render_symbol,
    render_text, render_unknown_run, render_value,
};

use std::fmt::Write;

use crate::{
    bytecode::{FunctionAst, Operation, Symbol},
    config::CodegenConfig,
    pipeline::RecoveryReport,
    strings::StringTable,
};

/// Tag written into every output whose coverage is below the threshold.
pub const PARTIAL_MARKER: &str = "PARTIAL RECOVERY";

/// Renders recovered functions and modules.
#[derive(Debug, Clone, Default)]
pub struct CodeGenerator {
    config: CodegenConfig,
}

impl CodeGenerator {
    /// Create a generator.
    #[must_use]
    pub fn new(config: CodegenConfig) -> Self {
        CodeGenerator { config }
    }

    /// Returns `true` if `coverage_ratio` is below the partial-recovery threshold.
    #[must_use]
    pub fn is_partial(&self, coverage_ratio: f64) -> bool {
        coverage_ratio < self.config.coverage_threshold
    }

    fn indent(&self) -> String {
        " ".repeat(self.config.indent)
    }

    /// Render one function as a `(defun name (args) body...)` form.
    #[must_use]
    pub fn build_source(&self, function: &FunctionAst) -> String {
        let indent = self.indent();
        let partial = self.is_partial(function.coverage_ratio);
        let mut out = String::new();

        let args: Vec<String> = function
            .args
            .iter()
            .map(|arg| render_symbol(&Symbol::Resolved(arg.clone())))
            .collect();
        let _ = writeln!(
            out,
            "(defun {} ({})",
            render_symbol(&Symbol::Resolved(function.name.clone())),
            args.join(" ")
        );

        if partial {
            let _ = writeln!(
                out,
                "{indent}{}",
                comment(&format!(
                    "{PARTIAL_MARKER}: opcode coverage {:.1}% is below the {:.1}% threshold",
                    function.coverage_ratio * 100.0,
                    self.config.coverage_threshold * 100.0
                ))
            );
        }

        let has_expression = Self::write_body(&mut out, &indent, &function.body);
        if !has_expression {
            let _ = writeln!(out, "{indent}nil");
        }

        if partial && !function.unresolved.is_empty() {
            let mut unresolved: Vec<_> = function.unresolved.iter().collect();
            unresolved.sort_by_key(|instruction| instruction.offset);

            let _ = writeln!(
                out,
                "{indent}{}",
                comment(&format!("unresolved instructions ({}):", unresolved.len()))
            );
            let limit = self.config.max_unresolved_listed;
            for instruction in unresolved.iter().take(limit) {
                let _ = writeln!(out, "{indent}{}", comment(&format!("  {instruction}")));
            }
            if unresolved.len() > limit {
                let _ = writeln!(
                    out,
                    "{indent}{}",
                    comment(&format!("  ... {} more", unresolved.len() - limit))
                );
            }
        }

        out.push_str(")\n");
        out
    }

    /// Writes the body lines and returns whether any of them is an expression.
    fn write_body(out: &mut String, indent: &str, body: &[Operation]) -> bool {
        let mut has_expression = false;
        let mut index = 0;
        while let Some(operation) = body.get(index) {
            let run = body[index..]
                .iter()
                .take_while(|operation| operation.is_unknown())
                .count();
            if run == 0 {
                has_expression = true;
                let _ = writeln!(out, "{indent}{}", render_line(operation));
                index += 1;
                continue;
            }

            let _ = writeln!(out, "{indent}{}", render_unknown_run(&body[index..index + run]));
            index += run;
        }
        has_expression
    }

    /// Render a complete module: report banner, recovered strings for partial outputs,
    /// global assignments and all functions.
    #[must_use]
    pub fn build_module(
        &self,
        report: &RecoveryReport,
        globals: &[Operation],
        functions: &[FunctionAst],
        strings: &StringTable,
    ) -> String {
        let rule = comment(&"-".repeat(60));
        let mut out = String::new();

        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "{}", comment("Decompiled by fasscope"));
        for line in report.summary_lines() {
            let _ = writeln!(out, "{}", comment(&line));
        }
        if report.partial {
            let _ = writeln!(
                out,
                "{}",
                comment(&format!("{PARTIAL_MARKER}: output is incomplete"))
            );
        }
        let _ = writeln!(out, "{rule}");

        if report.partial && !strings.is_empty() {
            out.push('\n');
            let _ = writeln!(
                out,
                "{}",
                comment(&format!("recovered strings ({}):", strings.len()))
            );
            for (key, text) in strings.iter().take(self.config.max_listed_strings) {
                let _ = writeln!(
                    out,
                    "{}",
                    comment(&format!("  {key:06x}  \"{}\"", escape_string(text)))
                );
            }
            if strings.len() > self.config.max_listed_strings {
                let _ = writeln!(
                    out,
                    "{}",
                    comment(&format!(
                        "  ... {} more",
                        strings.len() - self.config.max_listed_strings
                    ))
                );
            }
        }

        if !globals.is_empty() {
            out.push('\n');
            for global in globals {
                let _ = writeln!(out, "{}", render_line(global));
            }
        }

        for function in functions {
            out.push('\n');
            out.push_str(&self.build_source(function));
        }

        out
    }
}

/// Returns `true` if every parenthesis outside strings and comments is balanced.
///
/// Used to check generated output; it understands exactly the syntax the generator emits.
#[must_use]
pub fn is_balanced(source: &str) -> bool {
    let mut depth = 0_i64;
    let mut in_string = false;
    let mut escaped = false;

    for line in source.lines() {
        let mut chars = line.chars();
        while let Some(c) = chars.next() {
            if in_string {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                ';' => break,
                '"' => in_string = true,
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
    }

    depth == 0 && !in_string
}
