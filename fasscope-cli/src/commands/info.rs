use std::path::Path;

use serde::Serialize;

use crate::{
    app::{GlobalOptions, TuningOptions},
    commands::common::{decompile, ReportInfo},
    output::{candidate_table, coverage_summary, emit, field, print_table},
};

#[derive(Debug, Serialize)]
pub struct ContainerInfo {
    pub header: String,
    pub declared_length: usize,
    pub function_count: usize,
    pub global_count: usize,
    pub report: ReportInfo,
}

pub fn run(input: &Path, tuning: &TuningOptions, opts: &GlobalOptions) -> anyhow::Result<()> {
    let decompilation = decompile(input, tuning)?;

    let info = ContainerInfo {
        header: decompilation.container.header_tag().to_string(),
        declared_length: decompilation.container.declared_length(),
        function_count: decompilation.functions.len(),
        global_count: decompilation.globals.len(),
        report: ReportInfo::from(&decompilation.report),
    };

    emit(&info, opts, |info| {
        let report = &info.report;
        field("Container", &report.container);
        field("Header", &info.header);
        field("Payload", format!("{} bytes", info.declared_length));
        field(
            "Codec",
            format!("{} (confidence {:.2})", report.codec, report.codec_confidence),
        );
        field(
            "Structure",
            if report.legacy_image {
                "legacy image"
            } else {
                "instruction stream"
            },
        );
        field("Strings", report.strings_recovered);
        field("Coverage", coverage_summary(report));
        field("Functions", info.function_count);
        field("Globals", info.global_count);

        if !report.candidates.is_empty() {
            println!("\nCandidates:");
            print_table(&candidate_table(&report.candidates, &report.codec), "  ");
        }

        if !report.warnings.is_empty() {
            println!("\nWarnings:");
            for warning in &report.warnings {
                println!("  {warning}");
            }
        }
    })
}
