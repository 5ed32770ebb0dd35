use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::{
    app::{GlobalOptions, TuningOptions},
    commands::common::{decompile, default_output_path, ReportInfo},
    output::{coverage_summary, emit, field},
};

#[derive(Debug, Serialize)]
pub struct DecompileSummary {
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    pub report: ReportInfo,
}

pub fn run(
    input: &Path,
    output: Option<&Path>,
    stdout: bool,
    tuning: &TuningOptions,
    opts: &GlobalOptions,
) -> anyhow::Result<()> {
    let decompilation = decompile(input, tuning)?;

    let written = if stdout {
        print!("{}", decompilation.source);
        None
    } else {
        let path = output.map_or_else(|| default_output_path(input), Path::to_path_buf);
        std::fs::write(&path, &decompilation.source)
            .with_context(|| format!("failed to write output: {}", path.display()))?;
        Some(path)
    };

    let summary = DecompileSummary {
        input: input.display().to_string(),
        output: written.as_ref().map(|path| path.display().to_string()),
        report: ReportInfo::from(&decompilation.report),
    };

    // Keep stdout clean for the source when it is printed there.
    if stdout && !opts.json {
        return Ok(());
    }

    emit(&summary, opts, |summary| {
        let report = &summary.report;
        field("Bytes read", report.bytes_read);
        field("Codec", &report.codec);
        field("Strings recovered", report.strings_recovered);
        field("Opcode coverage", coverage_summary(report));
        if let Some(output) = &summary.output {
            field("Output", output);
        }
    })
}
