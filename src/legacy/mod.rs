//! Structured parser for legacy `FAS\0` images.
//!
//! Older writers emit a fully structured image instead of an opaque instruction stream:
//!
//! ```text
//! magic[4] version:u32
//! string_count:u32  { index:u32 length:u32 bytes[length] } * string_count
//! symbol_count:u32  { name_index:u32 type:u8 value } * symbol_count
//! { name_index:u32 arg_count:u32 arg_index:u32 * arg_count
//!   body_count:u32 { type:u8 value } * body_count } *      until end of data
//! ```
//!
//! Value types are `0` nil, `1` i32, `2` f32, `3` string index and `4` symbol index; any
//! other type is `nil` and carries no payload. Everything is little-endian.
//!
//! When such an image parses, its strings, globals and functions are exact, so the
//! heuristic recovery stages are not needed.

use crate::{
    bytecode::{FunctionAst, Operation, Symbol, Value},
    file::parser::Parser,
    strings::StringTable,
    Result,
};

const TYPE_NIL: u8 = 0;
const TYPE_INTEGER: u8 = 1;
const TYPE_REAL: u8 = 2;
const TYPE_STRING: u8 = 3;
const TYPE_SYMBOL: u8 = 4;

/// Smallest possible encoding of one string record.
const MIN_STRING_RECORD: usize = 8;
/// Smallest possible encoding of one symbol record.
const MIN_SYMBOL_RECORD: usize = 5;

/// Placeholder for functions whose name index has no string.
pub const UNKNOWN_FUNCTION_NAME: &str = "unknown_function";

/// A parsed legacy image.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyImage {
    /// Format version field.
    pub version: u32,
    /// Exact string table, keyed by record index.
    pub strings: StringTable,
    /// Global symbols as `setq` operations, in record order.
    pub globals: Vec<Operation>,
    /// Function definitions, in record order.
    pub functions: Vec<FunctionAst>,
}

struct ImageParser<'a> {
    parser: Parser<'a>,
    strings: StringTable,
    symbols: Vec<String>,
}

impl<'a> ImageParser<'a> {
    fn read_count(&mut self, min_record: usize, what: &str) -> Result<usize> {
        let count = self.parser.read_le::<u32>()? as usize;
        if count.saturating_mul(min_record) > self.parser.remaining() {
            return Err(malformed_error!(
                "{} count {} exceeds remaining {} bytes",
                what,
                count,
                self.parser.remaining()
            ));
        }
        Ok(count)
    }

    fn read_strings(&mut self) -> Result<()> {
        let count = self.read_count(MIN_STRING_RECORD, "string")?;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let index = self.parser.read_le::<u32>()? as usize;
            let length = self.parser.read_le::<u32>()? as usize;
            let bytes = self.parser.read_bytes(length)?;
            entries.push((index, String::from_utf8_lossy(bytes).into_owned()));
        }
        self.strings = StringTable::from_exact(entries);
        Ok(())
    }

    fn read_value(&mut self, value_type: u8) -> Result<Value> {
        Ok(match value_type {
            TYPE_NIL => Value::Nil,
            TYPE_INTEGER => Value::Integer(i64::from(self.parser.read_le::<i32>()?)),
            TYPE_REAL => Value::Real(f64::from(self.parser.read_le::<f32>()?)),
            TYPE_STRING => {
                let index = self.parser.read_le::<u32>()?;
                match self.strings.get(index as usize) {
                    Some(text) => Value::Text(text.to_string()),
                    None => Value::Unresolved(index),
                }
            }
            TYPE_SYMBOL => {
                let index = self.parser.read_le::<u32>()?;
                match self.symbols.get(index as usize) {
                    Some(name) => Value::Symbol(Symbol::Resolved(name.clone())),
                    None => Value::Symbol(Symbol::Unresolved(index)),
                }
            }
            other => {
                log::debug!("legacy value type {other} read as nil");
                Value::Nil
            }
        })
    }

    fn read_symbols(&mut self) -> Result<Vec<Operation>> {
        let count = self.read_count(MIN_SYMBOL_RECORD, "symbol")?;
        let mut globals = Vec::with_capacity(count);
        for position in 0..count {
            let name_index = self.parser.read_le::<u32>()?;
            let value_type = self.parser.read_le::<u8>()?;
            let value = self.read_value(value_type)?;

            let name = self
                .strings
                .get(name_index as usize)
                .map_or_else(|| format!("sym_{position}"), str::to_string);
            self.symbols.push(name.clone());
            globals.push(Operation::VariableAssign {
                name: Symbol::Resolved(name),
                value,
            });
        }
        Ok(globals)
    }

    fn read_function(&mut self) -> Result<FunctionAst> {
        let name_index = self.parser.read_le::<u32>()?;
        let arg_count = self.read_count(4, "argument")?;

        let mut args = Vec::with_capacity(arg_count);
        for position in 0..arg_count {
            let arg_index = self.parser.read_le::<u32>()?;
            args.push(
                self.strings
                    .get(arg_index as usize)
                    .map_or_else(|| format!("arg{position}"), str::to_string),
            );
        }

        let body_count = self.read_count(1, "body")?;
        let mut body = Vec::with_capacity(body_count);
        for _ in 0..body_count {
            let value_type = self.parser.read_le::<u8>()?;
            body.push(match self.read_value(value_type)? {
                Value::Symbol(name) => Operation::VariableRef { name },
                value => Operation::ConstantLiteral { value },
            });
        }

        let name = self
            .strings
            .get(name_index as usize)
            .unwrap_or(UNKNOWN_FUNCTION_NAME)
            .to_string();

        Ok(FunctionAst {
            name,
            args,
            body,
            coverage_ratio: 1.0,
            unresolved: Vec::new(),
        })
    }
}

impl LegacyImage {
    /// Parse `data`, which must start with `magic`.
    ///
    /// Header, string and symbol sections must be complete. Function records are read until
    /// the data ends; a truncated trailing function record is dropped.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the magic is missing or a section count is
    /// impossible, and [`crate::Error::OutOfBounds`] if a header, string or symbol record is
    /// truncated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fasscope::legacy::LegacyImage;
    ///
    /// let mut data = b"FAS\0".to_vec();
    /// data.extend_from_slice(&1u32.to_le_bytes()); // version
    /// data.extend_from_slice(&1u32.to_le_bytes()); // one string
    /// data.extend_from_slice(&0u32.to_le_bytes());
    /// data.extend_from_slice(&4u32.to_le_bytes());
    /// data.extend_from_slice(b"test");
    /// data.extend_from_slice(&0u32.to_le_bytes()); // no symbols
    ///
    /// let image = LegacyImage::parse(&data, b"FAS\0")?;
    /// assert_eq!(image.strings.get(0), Some("test"));
    /// assert!(image.functions.is_empty());
    /// # Ok::<(), fasscope::Error>(())
    /// ```
    pub fn parse(data: &[u8], magic: &[u8]) -> Result<LegacyImage> {
        if magic.is_empty() || !data.starts_with(magic) {
            return Err(malformed_error!("Legacy image magic not found"));
        }

        let mut image = ImageParser {
            parser: Parser::new(data),
            strings: StringTable::default(),
            symbols: Vec::new(),
        };
        image.parser.advance_by(magic.len())?;
        let version = image.parser.read_le::<u32>()?;

        image.read_strings()?;
        let globals = image.read_symbols()?;

        let mut functions = Vec::new();
        while image.parser.has_more_data() {
            match image.read_function() {
                Ok(function) => functions.push(function),
                Err(error) => {
                    log::debug!(
                        "legacy function record at {:#x} dropped: {error}",
                        image.parser.pos()
                    );
                    break;
                }
            }
        }

        log::debug!(
            "legacy image v{}: {} strings, {} globals, {} functions",
            version,
            image.strings.len(),
            globals.len(),
            functions.len()
        );

        Ok(LegacyImage {
            version,
            strings: image.strings,
            globals,
            functions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn u32le(out: &mut Vec<u8>, value: u32) {
        out.extend_from_slice(&value.to_le_bytes());
    }

    fn sample_image() -> Vec<u8> {
        let mut data = b"FAS\0".to_vec();
        u32le(&mut data, 1);

        let strings = ["test", "hello", "world", "arg1"];
        u32le(&mut data, strings.len() as u32);
        for (index, text) in strings.iter().enumerate() {
            u32le(&mut data, index as u32);
            u32le(&mut data, text.len() as u32);
            data.extend_from_slice(text.as_bytes());
        }

        u32le(&mut data, 2);
        u32le(&mut data, 0);
        data.push(1);
        data.extend_from_slice(&42i32.to_le_bytes());
        u32le(&mut data, 1);
        data.push(3);
        u32le(&mut data, 1);

        u32le(&mut data, 0);
        u32le(&mut data, 1);
        u32le(&mut data, 3);
        u32le(&mut data, 3);
        data.push(3);
        u32le(&mut data, 1);
        data.push(3);
        u32le(&mut data, 2);
        data.push(4);
        u32le(&mut data, 0);

        data
    }

    #[test]
    fn parses_sample_image() {
        let image = LegacyImage::parse(&sample_image(), b"FAS\0").unwrap();
        assert_eq!(image.version, 1);
        assert_eq!(image.strings.len(), 4);
        assert_eq!(
            image.globals,
            vec![
                Operation::VariableAssign {
                    name: Symbol::Resolved("test".to_string()),
                    value: Value::Integer(42),
                },
                Operation::VariableAssign {
                    name: Symbol::Resolved("hello".to_string()),
                    value: Value::Text("hello".to_string()),
                },
            ]
        );

        assert_eq!(image.functions.len(), 1);
        let function = &image.functions[0];
        assert_eq!(function.name, "test");
        assert_eq!(function.args, vec!["arg1".to_string()]);
        assert_eq!(function.coverage_ratio, 1.0);
        assert_eq!(
            function.body,
            vec![
                Operation::ConstantLiteral {
                    value: Value::Text("hello".to_string())
                },
                Operation::ConstantLiteral {
                    value: Value::Text("world".to_string())
                },
                Operation::VariableRef {
                    name: Symbol::Resolved("test".to_string())
                },
            ]
        );
    }

    #[test]
    fn placeholder_names() {
        let mut data = b"FAS\0".to_vec();
        u32le(&mut data, 2);
        u32le(&mut data, 0);
        u32le(&mut data, 1);
        u32le(&mut data, 9);
        data.push(0);
        u32le(&mut data, 7);
        u32le(&mut data, 1);
        u32le(&mut data, 8);
        u32le(&mut data, 0);

        let image = LegacyImage::parse(&data, b"FAS\0").unwrap();
        assert_eq!(
            image.globals[0],
            Operation::VariableAssign {
                name: Symbol::Resolved("sym_0".to_string()),
                value: Value::Nil,
            }
        );
        assert_eq!(image.functions[0].name, UNKNOWN_FUNCTION_NAME);
        assert_eq!(image.functions[0].args, vec!["arg0".to_string()]);
    }

    #[test]
    fn truncated_function_is_dropped() {
        let mut data = sample_image();
        u32le(&mut data, 1);
        data.push(0xAA);

        let image = LegacyImage::parse(&data, b"FAS\0").unwrap();
        assert_eq!(image.functions.len(), 1);
    }

    #[test]
    fn rejects_bad_images() {
        assert!(matches!(
            LegacyImage::parse(b"FAS4", b"FAS\0"),
            Err(Error::Malformed { .. })
        ));

        let mut data = b"FAS\0".to_vec();
        u32le(&mut data, 1);
        u32le(&mut data, 0xFFFF_FFFF);
        assert!(matches!(
            LegacyImage::parse(&data, b"FAS\0"),
            Err(Error::Malformed { .. })
        ));

        let mut data = b"FAS\0".to_vec();
        u32le(&mut data, 1);
        u32le(&mut data, 1);
        u32le(&mut data, 0);
        u32le(&mut data, 100);
        data.extend_from_slice(b"short");
        u32le(&mut data, 0);
        assert!(LegacyImage::parse(&data, b"FAS\0").is_err());
    }
}
