//! The decompilation pipeline.
//!
//! [`Decompiler`] runs the stages in order, each consuming the previous stage's output and
//! producing a new value:
//!
//! ```text
//! bytes ─► Container ─► DecodedBuffer candidates ─► StringTable ─► Instructions
//!                                                                    │
//!        source text ◄── CodeGenerator ◄── FunctionAst ◄── Operations ◄┘
//! ```
//!
//! Only container framing can fail. Every later stage produces some result, and anything
//! that went wrong along the way is recorded as a [`RecoveryWarning`] in the
//! [`RecoveryReport`] and in the banner of the generated text.
//!
//! # Examples
//!
//! ```rust
//! use fasscope::Decompiler;
//!
//! let decompilation = Decompiler::default().decompile(b"FAS4-FILE ; comment\r\n4\r\nabcd")?;
//! assert!(decompilation.report.partial);
//! assert_eq!(decompilation.report.coverage_ratio, 0.0);
//! assert!(decompilation.source.contains("PARTIAL RECOVERY"));
//! # Ok::<(), fasscope::Error>(())
//! ```

mod report;

pub use report::{CandidateSummary, RecoveryReport, RecoveryWarning};

use std::path::Path;

use crate::{
    bytecode::{decode_stream, interpret, FunctionAst, Instruction, Operation},
    codec::{Codec, DecodedBuffer, PayloadDecoder},
    codegen::CodeGenerator,
    config::DecompilerConfig,
    container::{Container, ContainerReader},
    file::Input,
    legacy::LegacyImage,
    strings::{StringTable, StringTableResolver},
    Result,
};

/// Everything recovered from one input.
#[derive(Debug, Clone)]
pub struct Decompilation {
    /// The framed container.
    pub container: Container,
    /// All decoded payload candidates, highest confidence first.
    pub candidates: Vec<DecodedBuffer>,
    /// The buffer recovery ran on, inner prefix removed.
    pub buffer: DecodedBuffer,
    /// Recovered strings.
    pub string_table: StringTable,
    /// Decoded instructions; empty for legacy images.
    pub instructions: Vec<Instruction>,
    /// Global assignments; only legacy images carry them.
    pub globals: Vec<Operation>,
    /// Recovered functions.
    pub functions: Vec<FunctionAst>,
    /// Generated source text.
    pub source: String,
    /// Confidence and coverage summary.
    pub report: RecoveryReport,
}

struct Recovered {
    string_table: StringTable,
    instructions: Vec<Instruction>,
    globals: Vec<Operation>,
    functions: Vec<FunctionAst>,
    known: usize,
    coverage_ratio: f64,
    legacy_image: bool,
}

/// Runs the full pipeline with one configuration.
#[derive(Debug, Clone, Default)]
pub struct Decompiler {
    config: DecompilerConfig,
}

impl Decompiler {
    /// Create a decompiler.
    #[must_use]
    pub fn new(config: DecompilerConfig) -> Self {
        Decompiler { config }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &DecompilerConfig {
        &self.config
    }

    /// Load and decompile the file at `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] or [`crate::Error::Empty`] if the file cannot be
    /// read, and the errors of [`Decompiler::decompile`].
    pub fn decompile_file(&self, path: &Path) -> Result<Decompilation> {
        let input = Input::from_file(path)?;
        self.decompile(input.data())
    }

    /// Decompile raw container bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::Format`] if the container cannot be framed. No other stage
    /// can fail.
    pub fn decompile(&self, data: &[u8]) -> Result<Decompilation> {
        let config = &self.config;
        let container = ContainerReader::new(config.container.clone()).read(data)?;

        let candidates =
            PayloadDecoder::new(config.codec.clone(), config.container.clone(), config.workers)
                .decode(container.payload());
        let chosen = candidates.first().cloned().unwrap_or_else(|| {
            DecodedBuffer::new(container.payload().to_vec(), Codec::Passthrough)
        });

        let mut warnings = Vec::new();
        if chosen.codec() == Codec::Passthrough {
            warnings.push(RecoveryWarning::IdentityOnly);
        }

        let buffer = chosen
            .strip_prefix(&config.container.inner_prefix)
            .unwrap_or(chosen);
        let legacy = self.find_legacy(buffer.bytes(), &mut warnings);

        let recovered = match legacy {
            Some(image) => Self::from_legacy(image),
            None => self.recover(&buffer, &mut warnings),
        };

        if recovered.string_table.len() < config.min_expected_strings {
            warnings.push(RecoveryWarning::SparseStringTable {
                found: recovered.string_table.len(),
                expected: config.min_expected_strings,
            });
        }

        let generator = CodeGenerator::new(config.codegen.clone());
        let partial = generator.is_partial(recovered.coverage_ratio);
        if partial {
            warnings.push(RecoveryWarning::LowCoverage {
                ratio: recovered.coverage_ratio,
                threshold: config.codegen.coverage_threshold,
            });
        }

        for warning in &warnings {
            log::warn!("{warning}");
        }

        let report = RecoveryReport {
            bytes_read: data.len(),
            container: container.kind(),
            codec: buffer.codec(),
            codec_confidence: buffer.confidence(),
            candidates: PayloadDecoder::diagnostic_order(&candidates)
                .into_iter()
                .map(|candidate| CandidateSummary {
                    codec: candidate.codec(),
                    confidence: candidate.confidence(),
                    len: candidate.len(),
                    plausible: candidate.is_plausible(),
                })
                .collect(),
            legacy_image: recovered.legacy_image,
            strings_recovered: recovered.string_table.len(),
            instruction_count: recovered.instructions.len(),
            known_instruction_count: recovered.known,
            coverage_ratio: recovered.coverage_ratio,
            partial,
            warnings,
        };

        let source = generator.build_module(
            &report,
            &recovered.globals,
            &recovered.functions,
            &recovered.string_table,
        );

        log::info!(
            "decompiled {} bytes: codec {}, {} strings, coverage {:.1}%{}",
            report.bytes_read,
            report.codec,
            report.strings_recovered,
            report.coverage_ratio * 100.0,
            if report.partial { " (partial)" } else { "" }
        );

        Ok(Decompilation {
            container,
            candidates,
            buffer,
            string_table: recovered.string_table,
            instructions: recovered.instructions,
            globals: recovered.globals,
            functions: recovered.functions,
            source,
            report,
        })
    }

    fn find_legacy(
        &self,
        data: &[u8],
        warnings: &mut Vec<RecoveryWarning>,
    ) -> Option<LegacyImage> {
        let magic = &self.config.container.legacy_magic;
        if magic.is_empty() {
            return None;
        }

        for &offset in &self.config.container.legacy_offsets {
            let Some(image) = data.get(offset..).filter(|rest| rest.starts_with(magic)) else {
                continue;
            };
            match LegacyImage::parse(image, magic) {
                Ok(image) => {
                    log::debug!("legacy image at offset {offset}");
                    return Some(image);
                }
                Err(error) => {
                    warnings.push(RecoveryWarning::LegacyImageRejected(error.to_string()));
                }
            }
        }
        None
    }

    fn from_legacy(image: LegacyImage) -> Recovered {
        Recovered {
            string_table: image.strings,
            instructions: Vec::new(),
            globals: image.globals,
            functions: image.functions,
            known: 0,
            coverage_ratio: 1.0,
            legacy_image: true,
        }
    }

    fn recover(&self, buffer: &DecodedBuffer, warnings: &mut Vec<RecoveryWarning>) -> Recovered {
        let config = &self.config;

        let resolution =
            StringTableResolver::new(config.resolver.clone(), config.workers).resolve(buffer.bytes());
        if resolution.keyed_timed_out {
            warnings.push(RecoveryWarning::KeyedScanSkipped {
                budget: config.resolver.keyed_budget,
            });
        }
        let string_table = resolution.table;

        let opcodes = &config.decoder.opcodes;
        let instructions = decode_stream(buffer.bytes(), opcodes);
        let interpretation = interpret(&instructions, &string_table, opcodes);
        let known = interpretation.known;
        let coverage_ratio = interpretation.coverage_ratio;

        let function = FunctionAst::from_interpretation(
            interpretation,
            &string_table,
            &config.resolver.keywords,
        );

        Recovered {
            string_table,
            instructions,
            globals: Vec::new(),
            functions: vec![function],
            known,
            coverage_ratio,
            legacy_image: false,
        }
    }
}
