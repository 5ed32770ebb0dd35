use std::path::{Path, PathBuf};

use anyhow::Context;
use fasscope::{config::DecompilerConfig, Decompilation, Decompiler, RecoveryReport};
use serde::Serialize;

use crate::app::TuningOptions;

/// Build the pipeline configuration from the command-line tuning flags.
pub fn build_config(tuning: &TuningOptions) -> anyhow::Result<DecompilerConfig> {
    let mut config = if tuning.thorough {
        DecompilerConfig::thorough()
    } else {
        DecompilerConfig::default()
    };

    if let Some(threshold) = tuning.threshold {
        if !(0.0..=1.0).contains(&threshold) {
            anyhow::bail!("--threshold must be between 0.0 and 1.0, got {threshold}");
        }
        config.codegen.coverage_threshold = threshold;
    }
    if let Some(workers) = tuning.workers {
        config.workers = workers;
    }
    Ok(config)
}

/// Load and decompile `path`. Framing errors keep their [`fasscope::Error`] type so the exit
/// code can be derived from them.
pub fn decompile(path: &Path, tuning: &TuningOptions) -> anyhow::Result<Decompilation> {
    let config = build_config(tuning)?;
    Decompiler::new(config)
        .decompile_file(path)
        .with_context(|| format!("failed to decompile: {}", path.display()))
}

/// Default output path: the input path with its extension swapped for `.lsp`.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("lsp")
}

#[derive(Debug, Serialize)]
pub struct CandidateInfo {
    pub codec: String,
    pub confidence: f64,
    pub len: usize,
    pub plausible: bool,
}

#[derive(Debug, Serialize)]
pub struct ReportInfo {
    pub bytes_read: usize,
    pub container: String,
    pub codec: String,
    pub codec_confidence: f64,
    pub candidates: Vec<CandidateInfo>,
    pub legacy_image: bool,
    pub strings_recovered: usize,
    pub instruction_count: usize,
    pub known_instruction_count: usize,
    pub coverage_ratio: f64,
    pub partial: bool,
    pub warnings: Vec<String>,
}

impl From<&RecoveryReport> for ReportInfo {
    fn from(report: &RecoveryReport) -> Self {
        ReportInfo {
            bytes_read: report.bytes_read,
            container: report.container.to_string(),
            codec: report.codec.to_string(),
            codec_confidence: report.codec_confidence,
            candidates: report
                .candidates
                .iter()
                .map(|candidate| CandidateInfo {
                    codec: candidate.codec.to_string(),
                    confidence: candidate.confidence,
                    len: candidate.len,
                    plausible: candidate.plausible,
                })
                .collect(),
            legacy_image: report.legacy_image,
            strings_recovered: report.strings_recovered,
            instruction_count: report.instruction_count,
            known_instruction_count: report.known_instruction_count,
            coverage_ratio: report.coverage_ratio,
            partial: report.partial,
            warnings: report.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}
