use std::{fmt, time::Duration};

use crate::{codec::Codec, container::ContainerKind};

/// A non-fatal recovery problem.
///
/// Warnings never stop a decompilation; they lower the trust one should place in the
/// output and are reported in the banner of the generated text.
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryWarning {
    /// Fewer strings were recovered than expected.
    SparseStringTable {
        /// Number of recovered strings.
        found: usize,
        /// Configured minimum.
        expected: usize,
    },
    /// The opcode coverage is below the partial-recovery threshold.
    LowCoverage {
        /// Achieved coverage ratio.
        ratio: f64,
        /// Configured threshold.
        threshold: f64,
    },
    /// No codec decoded the payload; it is used unchanged.
    IdentityOnly,
    /// The keyed-transform string scan ran out of time and was skipped.
    KeyedScanSkipped {
        /// Configured wall-clock budget.
        budget: Duration,
    },
    /// The buffer looked like a legacy image but did not parse as one.
    LegacyImageRejected(String),
}

impl fmt::Display for RecoveryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryWarning::SparseStringTable { found, expected } => write!(
                f,
                "sparse string table: {found} strings recovered, at least {expected} expected"
            ),
            RecoveryWarning::LowCoverage { ratio, threshold } => write!(
                f,
                "low opcode coverage: {:.1}% (threshold {:.1}%)",
                ratio * 100.0,
                threshold * 100.0
            ),
            RecoveryWarning::IdentityOnly => {
                write!(f, "no codec decoded the payload, using it unchanged")
            }
            RecoveryWarning::KeyedScanSkipped { budget } => write!(
                f,
                "keyed-transform string scan exceeded its {}ms budget and was skipped",
                budget.as_millis()
            ),
            RecoveryWarning::LegacyImageRejected(reason) => {
                write!(f, "legacy image rejected: {reason}")
            }
        }
    }
}

/// One decoded payload candidate, as listed in the report.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSummary {
    /// Codec that produced the candidate.
    pub codec: Codec,
    /// Codec confidence.
    pub confidence: f64,
    /// Decoded length in bytes.
    pub len: usize,
    /// Structural plausibility signal.
    pub plausible: bool,
}

/// Machine-readable summary of a decompilation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryReport {
    /// Size of the raw input.
    pub bytes_read: usize,
    /// Envelope variant.
    pub container: ContainerKind,
    /// Codec of the buffer everything was recovered from.
    pub codec: Codec,
    /// Confidence of that codec.
    pub codec_confidence: f64,
    /// All candidates in diagnostic order.
    pub candidates: Vec<CandidateSummary>,
    /// The buffer parsed as a structured legacy image.
    pub legacy_image: bool,
    /// Entries in the string table.
    pub strings_recovered: usize,
    /// Decoded instructions.
    pub instruction_count: usize,
    /// Instructions mapped to a known operation.
    pub known_instruction_count: usize,
    /// `known_instruction_count / instruction_count`, 1.0 for legacy images.
    pub coverage_ratio: f64,
    /// Coverage is below the configured threshold.
    pub partial: bool,
    /// Non-fatal problems, in the order they were raised.
    pub warnings: Vec<RecoveryWarning>,
}

impl RecoveryReport {
    /// Human-readable lines, as written into the output banner.
    #[must_use]
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("container: {}, {} bytes read", self.container, self.bytes_read),
            format!(
                "codec: {} (confidence {:.2}, {} candidates)",
                self.codec,
                self.codec_confidence,
                self.candidates.len()
            ),
            format!("strings recovered: {}", self.strings_recovered),
        ];

        if self.legacy_image {
            lines.push("structure: legacy image".to_string());
        } else {
            lines.push(format!(
                "instructions: {} ({} known)",
                self.instruction_count, self.known_instruction_count
            ));
        }
        lines.push(format!(
            "opcode coverage: {:.1}%",
            self.coverage_ratio * 100.0
        ));

        for warning in &self.warnings {
            lines.push(format!("warning: {warning}"));
        }
        lines
    }
}

impl fmt::Display for RecoveryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.summary_lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> RecoveryReport {
        RecoveryReport {
            bytes_read: 28,
            container: ContainerKind::Framed,
            codec: Codec::Passthrough,
            codec_confidence: 0.1,
            candidates: vec![CandidateSummary {
                codec: Codec::Passthrough,
                confidence: 0.1,
                len: 4,
                plausible: false,
            }],
            legacy_image: false,
            strings_recovered: 0,
            instruction_count: 4,
            known_instruction_count: 0,
            coverage_ratio: 0.0,
            partial: true,
            warnings: vec![RecoveryWarning::IdentityOnly],
        }
    }

    #[test]
    fn summary() {
        let lines = report().summary_lines();
        assert_eq!(lines[0], "container: framed, 28 bytes read");
        assert_eq!(lines[1], "codec: passthrough (confidence 0.10, 1 candidates)");
        assert!(lines.contains(&"opcode coverage: 0.0%".to_string()));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("warning: no codec decoded the payload, using it unchanged")
        );
    }

    #[test]
    fn warning_display() {
        let warning = RecoveryWarning::LowCoverage {
            ratio: 0.25,
            threshold: 0.5,
        };
        assert_eq!(
            warning.to_string(),
            "low opcode coverage: 25.0% (threshold 50.0%)"
        );
        let warning = RecoveryWarning::KeyedScanSkipped {
            budget: Duration::from_secs(2),
        };
        assert!(warning.to_string().contains("2000ms"));
    }
}
