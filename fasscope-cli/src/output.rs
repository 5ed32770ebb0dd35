use std::collections::BTreeMap;

use comfy_table::{presets, CellAlignment, ContentArrangement, Table};
use fasscope::codegen::escape_string;
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::{
        common::{CandidateInfo, ReportInfo},
        strings::StringInfo,
    },
};

/// Width of the label column in `Label: value` listings.
const LABEL_WIDTH: usize = 18;

/// Print `data` as JSON with `--json`, otherwise hand it to `human`.
pub fn emit<T: Serialize>(
    data: &T,
    opts: &GlobalOptions,
    human: impl FnOnce(&T),
) -> anyhow::Result<()> {
    if !opts.json {
        human(data);
        return Ok(());
    }
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Print one `Label: value` line.
pub fn field(label: &str, value: impl std::fmt::Display) {
    println!("{:<LABEL_WIDTH$}{value}", format!("{label}:"));
}

/// `"62.5% (5 of 8 instructions)"`, with a partial-recovery suffix below the threshold.
pub fn coverage_summary(report: &ReportInfo) -> String {
    let mut text = format!(
        "{:.1}% ({} of {} instructions)",
        report.coverage_ratio * 100.0,
        report.known_instruction_count,
        report.instruction_count
    );
    if report.legacy_image {
        text.push_str(", exact legacy image");
    } else if report.partial {
        text.push_str(", partial recovery");
    }
    text
}

fn borderless(columns: &[(&str, CellAlignment)]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(columns.iter().map(|(name, _)| *name));

    let last = columns.len().saturating_sub(1);
    for (index, (_, alignment)) in columns.iter().enumerate() {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(*alignment);
            column.set_padding((u16::from(index != 0), u16::from(index != last)));
        }
    }
    table
}

/// Codec ranking, highest confidence first. The candidate recovery ran on is starred.
pub fn candidate_table(candidates: &[CandidateInfo], chosen: &str) -> Table {
    let mut table = borderless(&[
        ("", CellAlignment::Left),
        ("Codec", CellAlignment::Left),
        ("Confidence", CellAlignment::Right),
        ("Bytes", CellAlignment::Right),
        ("Plausible", CellAlignment::Left),
    ]);

    let mut starred = false;
    for candidate in candidates {
        let mark = if !starred && candidate.codec == chosen {
            starred = true;
            "*"
        } else {
            ""
        };
        table.add_row(vec![
            mark.to_string(),
            candidate.codec.clone(),
            format!("{:.2}", candidate.confidence),
            candidate.len.to_string(),
            if candidate.plausible { "yes" } else { "no" }.to_string(),
        ]);
    }
    table
}

/// Recovered strings in key order.
pub fn string_table(strings: &[StringInfo]) -> Table {
    let mut table = borderless(&[
        ("Key", CellAlignment::Right),
        ("Strategy", CellAlignment::Left),
        ("Text", CellAlignment::Left),
    ]);
    for string in strings {
        table.add_row(vec![
            format!("{:#06x}", string.key),
            string.strategy.clone(),
            format!("\"{}\"", escape_string(&string.text)),
        ]);
    }
    table
}

/// Number of strings contributed by each strategy, in strategy name order.
pub fn strategy_counts(strings: &[StringInfo]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for string in strings {
        *counts.entry(string.strategy.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Print `table` with trailing blanks removed and every line prefixed by `indent`.
pub fn print_table(table: &Table, indent: &str) {
    for line in table.to_string().lines() {
        println!("{indent}{}", line.trim_end());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> ReportInfo {
        ReportInfo {
            bytes_read: 40,
            container: "framed".to_string(),
            codec: "identity".to_string(),
            codec_confidence: 1.0,
            candidates: vec![
                CandidateInfo {
                    codec: "identity".to_string(),
                    confidence: 1.0,
                    len: 12,
                    plausible: false,
                },
                CandidateInfo {
                    codec: "passthrough".to_string(),
                    confidence: 0.1,
                    len: 12,
                    plausible: false,
                },
            ],
            legacy_image: false,
            strings_recovered: 0,
            instruction_count: 8,
            known_instruction_count: 3,
            coverage_ratio: 0.375,
            partial: true,
            warnings: vec![],
        }
    }

    fn string(key: usize, strategy: &str, text: &str) -> StringInfo {
        StringInfo {
            key,
            strategy: strategy.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn coverage_summary_marks_partial_output() {
        let mut report = report();
        assert_eq!(
            coverage_summary(&report),
            "37.5% (3 of 8 instructions), partial recovery"
        );
        report.partial = false;
        assert_eq!(coverage_summary(&report), "37.5% (3 of 8 instructions)");
    }

    #[test]
    fn chosen_candidate_is_starred() {
        let report = report();
        let rendered = candidate_table(&report.candidates, &report.codec).to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].trim_start().starts_with('*'));
        assert!(lines[1].contains("identity"));
        assert!(!lines[2].contains('*'));
        assert!(lines[2].contains("0.10"));
    }

    #[test]
    fn strings_are_counted_per_strategy() {
        let strings = vec![
            string(0, "pointer-table", "princ"),
            string(9, "embedded-ascii", "hello"),
            string(4, "pointer-table", "setq"),
        ];
        let counts = strategy_counts(&strings);
        assert_eq!(
            counts.into_iter().collect::<Vec<_>>(),
            vec![("embedded-ascii", 1), ("pointer-table", 2)]
        );
        let rendered = string_table(&strings).to_string();
        assert!(rendered.contains("0x0009"));
        assert!(rendered.contains("\"setq\""));
    }
}
