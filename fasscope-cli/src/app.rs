use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// fasscope - best-effort source recovery for FAS4 compiled scripts
#[derive(Debug, Parser)]
#[command(name = "fasscope", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Pipeline tuning shared by the commands that run a decompilation.
#[derive(Debug, Args)]
pub struct TuningOptions {
    /// Coverage ratio below which output is flagged as partial (0.0 - 1.0).
    #[arg(long, value_name = "F")]
    pub threshold: Option<f64>,

    /// Worker threads for codec attempts and the keyed string scan (0 = all cores).
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Never skip the keyed-transform string scan and give it a larger time budget.
    #[arg(long)]
    pub thorough: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decompile a FAS4 file and write the recovered source.
    Decompile {
        /// Path to the FAS4 file.
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output path (default: the input path with a .lsp extension).
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Print the recovered source to stdout instead of writing a file.
        #[arg(long, conflicts_with = "output")]
        stdout: bool,

        #[command(flatten)]
        tuning: TuningOptions,
    },

    /// Show container framing, codec candidates and recovery statistics.
    Info {
        /// Path to the FAS4 file.
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[command(flatten)]
        tuning: TuningOptions,
    },

    /// List the recovered string table.
    Strings {
        /// Path to the FAS4 file.
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Show only strings recovered by one strategy
        /// (pointer-table, length-prefixed, embedded-ascii, keyed-transform).
        #[arg(long)]
        strategy: Option<String>,

        #[command(flatten)]
        tuning: TuningOptions,
    },
}
