mod app;
mod commands;
mod output;

use std::process::ExitCode;

use clap::Parser;

use crate::app::{Cli, Command};

/// Exit code when the input could not be framed as a container.
const EXIT_FORMAT: u8 = 2;
/// Exit code for every other failure (I/O, invalid flags).
const EXIT_FAILURE: u8 = 1;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Show fasscope info+ on stderr unless --json; --verbose enables debug; RUST_LOG overrides
    if !cli.global.json {
        let level = if cli.global.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        env_logger::Builder::new()
            .filter_module("fasscope", level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false)
            .init();
    }

    if let Err(error) = ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    }) {
        log::debug!("failed to set Ctrl+C handler: {error}");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(exit_code(&error))
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Command::Decompile {
            input,
            output,
            stdout,
            tuning,
        } => commands::decompile::run(input, output.as_deref(), *stdout, tuning, &cli.global),
        Command::Info { input, tuning } => commands::info::run(input, tuning, &cli.global),
        Command::Strings {
            input,
            strategy,
            tuning,
        } => commands::strings::run(input, strategy.as_deref(), tuning, &cli.global),
    }
}

/// Framing failures get their own exit code; nothing else from the pipeline is fatal.
fn exit_code(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<fasscope::Error>() {
        Some(fasscope::Error::Format(_)) => EXIT_FORMAT,
        _ => EXIT_FAILURE,
    }
}
