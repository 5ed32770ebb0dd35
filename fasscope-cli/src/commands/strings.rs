use std::path::Path;

use fasscope::strings::Strategy;
use serde::Serialize;

use crate::{
    app::{GlobalOptions, TuningOptions},
    commands::common::decompile,
    output::{emit, print_table, strategy_counts, string_table},
};

#[derive(Debug, Serialize)]
pub struct StringInfo {
    pub key: usize,
    pub strategy: String,
    pub text: String,
}

pub fn run(
    input: &Path,
    strategy: Option<&str>,
    tuning: &TuningOptions,
    opts: &GlobalOptions,
) -> anyhow::Result<()> {
    let filter = strategy
        .map(|name| {
            name.parse::<Strategy>()
                .map_err(|_| anyhow::anyhow!("unknown strategy '{name}'"))
        })
        .transpose()?;

    let decompilation = decompile(input, tuning)?;
    let table = &decompilation.string_table;

    let strings: Vec<StringInfo> = table
        .iter()
        .filter_map(|(key, text)| {
            let entry = table.entry(key)?;
            if filter.is_some_and(|wanted| wanted != entry.strategy) {
                return None;
            }
            Some(StringInfo {
                key,
                strategy: entry.strategy.to_string(),
                text: text.to_string(),
            })
        })
        .collect();

    emit(&strings, opts, |strings| {
        println!("{} strings", strings.len());
        if strings.is_empty() {
            return;
        }
        if filter.is_none() {
            for (strategy, count) in strategy_counts(strings) {
                println!("  {strategy}: {count}");
            }
        }
        println!();
        print_table(&string_table(strings), "");
    })
}
