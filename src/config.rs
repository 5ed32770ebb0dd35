//! Configuration for the decompilation pipeline.
//!
//! Every heuristic threshold, marker and table used by the stages lives here, so that
//! a run is fully described by one [`DecompilerConfig`] value. The defaults reflect what is
//! known about FAS4 containers; since large parts of the format are unconfirmed, none of
//! these values should be read as ground truth.

use std::time::Duration;

use crate::bytecode::OpcodeTable;

/// Interpreter keywords accepted by the keyed-transform string scan and skipped by the
/// function naming heuristic.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "defun",
    "setq",
    "princ",
    "prompt",
    "progn",
    "while",
    "foreach",
    "repeat",
    "cond",
    "getstring",
    "getint",
    "getreal",
    "getkword",
    "initget",
    "namedobjdict",
    "dictsearch",
    "dictremove",
    "dictnext",
    "wcmatch",
    "strcat",
    "strcase",
    "substr",
    "itoa",
    "atoi",
    "rtos",
    "exit",
    "command",
    "entget",
    "entmod",
    "ssget",
    "sslength",
    "ssname",
    "vl-load-com",
    "lambda",
    "mapcar",
    "apply",
    "assoc",
    "cons",
    "list",
    "car",
    "cdr",
    "nth",
    "length",
    "not",
    "and",
    "or",
    "if",
];

/// Container framing settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Literal token identifying the header line.
    pub marker: Vec<u8>,
    /// Magic tag opening a legacy payload that carries no text envelope.
    pub legacy_magic: Vec<u8>,
    /// Fixed prefix of the inner format, stripped before string and bytecode recovery.
    pub inner_prefix: Vec<u8>,
    /// Offsets into the unprefixed buffer at which a legacy image may start.
    pub legacy_offsets: Vec<usize>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            marker: b"FAS4-FILE".to_vec(),
            legacy_magic: b"FAS\0".to_vec(),
            inner_prefix: b"38 $".to_vec(),
            legacy_offsets: vec![0, 4, 8],
        }
    }
}

/// Payload codec settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CodecConfig {
    /// Initial key of the keyed substitution cipher.
    pub cipher_start_key: u8,
    /// Minimum printable share of a cipher output for it to count as decoded.
    pub cipher_min_printable: f64,
    /// Number of valid embedded strings that makes a buffer structurally plausible.
    pub plausible_min_strings: usize,
    /// Shortest printable run counted by the plausibility check.
    pub plausible_min_run: usize,
    /// Upper bound on inflated output, in bytes.
    pub max_inflated_len: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            cipher_start_key: 0x55,
            cipher_min_printable: 0.75,
            plausible_min_strings: 3,
            plausible_min_run: 3,
            max_inflated_len: 64 * 1024 * 1024,
        }
    }
}

/// String table recovery settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Minimum printable share of a pointer-table record.
    pub pointer_min_printable: f64,
    /// Loop guard for the pointer-table walk.
    pub pointer_max_records: usize,
    /// Longest record accepted by the pointer-table and length-prefixed scans.
    pub max_string_len: usize,
    /// Minimum printable share of a length-prefixed string.
    pub prefixed_min_printable: f64,
    /// Shortest printable run accepted by the embedded-ASCII scan.
    pub ascii_min_run: usize,
    /// Closed dictionary for the keyed-transform scan.
    pub keywords: Vec<String>,
    /// Skip the keyed-transform scan once pointer-table and length-prefixed scans found
    /// at least this many entries. `None` never skips.
    pub keyed_skip_threshold: Option<usize>,
    /// Wall-clock budget of the keyed-transform scan.
    pub keyed_budget: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            pointer_min_printable: 0.70,
            pointer_max_records: 200,
            max_string_len: 500,
            prefixed_min_printable: 0.85,
            ascii_min_run: 3,
            keywords: DEFAULT_KEYWORDS.iter().map(|s| (*s).to_string()).collect(),
            keyed_skip_threshold: Some(8),
            keyed_budget: Duration::from_secs(2),
        }
    }
}

/// Bytecode decoding settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Opcode arity and operation-kind mapping.
    pub opcodes: OpcodeTable,
}

/// Source generation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CodegenConfig {
    /// Coverage below which output is flagged as partial.
    pub coverage_threshold: f64,
    /// Spaces per indentation level.
    pub indent: usize,
    /// Number of recovered strings listed in a partial output.
    pub max_listed_strings: usize,
    /// Number of unresolved instructions listed in a partial output.
    pub max_unresolved_listed: usize,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            coverage_threshold: 0.5,
            indent: 2,
            max_listed_strings: 50,
            max_unresolved_listed: 100,
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DecompilerConfig {
    /// Envelope framing.
    pub container: ContainerConfig,
    /// Payload codecs.
    pub codec: CodecConfig,
    /// String recovery.
    pub resolver: ResolverConfig,
    /// Bytecode decoding.
    pub decoder: DecoderConfig,
    /// Source generation.
    pub codegen: CodegenConfig,
    /// Worker threads for codec attempts and the keyed-transform scan. 0 uses all cores.
    pub workers: usize,
    /// String tables smaller than this raise a sparse-table warning.
    pub min_expected_strings: usize,
}

impl Default for DecompilerConfig {
    fn default() -> Self {
        Self {
            container: ContainerConfig::default(),
            codec: CodecConfig::default(),
            resolver: ResolverConfig::default(),
            decoder: DecoderConfig::default(),
            codegen: CodegenConfig::default(),
            workers: 0,
            min_expected_strings: 3,
        }
    }
}

impl DecompilerConfig {
    /// Single worker, otherwise default. Produces the same output as any other worker count.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            workers: 1,
            ..Self::default()
        }
    }

    /// Never skip the keyed-transform scan and give it a larger budget.
    #[must_use]
    pub fn thorough() -> Self {
        let mut config = Self::default();
        config.resolver.keyed_skip_threshold = None;
        config.resolver.keyed_budget = Duration::from_secs(30);
        config
    }

    /// Replace the opcode table.
    #[must_use]
    pub fn with_opcodes(mut self, opcodes: OpcodeTable) -> Self {
        self.decoder.opcodes = opcodes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        let default = DecompilerConfig::default();
        assert_eq!(default.workers, 0);
        assert_eq!(default.codec.cipher_start_key, 0x55);
        assert_eq!(default.resolver.pointer_max_records, 200);
        assert_eq!(default.container.marker, b"FAS4-FILE");

        let sequential = DecompilerConfig::sequential();
        assert_eq!(sequential.workers, 1);
        assert_eq!(sequential.resolver, default.resolver);

        let thorough = DecompilerConfig::thorough();
        assert!(thorough.resolver.keyed_skip_threshold.is_none());
        assert!(thorough.resolver.keyed_budget > default.resolver.keyed_budget);
    }

    #[test]
    fn keywords_are_lowercase_identifiers() {
        for keyword in DEFAULT_KEYWORDS {
            assert!(keyword.len() >= 2);
            assert_eq!(*keyword, keyword.to_ascii_lowercase());
        }
    }
}
