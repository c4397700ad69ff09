//! Ticket import decision CLI.

use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::{ColorChoice, Parser};
use serde::Serialize;
use tracing::level_filters::LevelFilter;

use tiket_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use tiket_cli::commands::{run_assign, run_confirm, run_diagnose, run_preview};
use tiket_cli::logging::{LogConfig, LogFormat, init_logging};
use tiket_cli::summary::{print_assignment, print_confirmation, print_diagnostics, print_previews};
use tiket_validate::ConfirmationError;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let outcome = match &cli.command {
        Command::Preview(args) => run_preview(args).and_then(|previews| {
            if args.json {
                print_json(&previews)?;
            } else {
                print_previews(&previews);
            }
            Ok(0)
        }),
        Command::Diagnose(args) => run_diagnose(args).and_then(|diagnostics| {
            if args.json {
                print_json(&diagnostics)?;
            } else {
                print_diagnostics(&diagnostics);
            }
            Ok(if diagnostics.ready_to_run { 0 } else { 1 })
        }),
        Command::Confirm(args) => run_confirm(args).and_then(|confirmed| {
            if args.json {
                print_json(&confirmed)?;
            } else {
                print_confirmation(&confirmed);
            }
            Ok(0)
        }),
        Command::Assign(args) => run_assign(args).and_then(|run| {
            if args.json {
                print_json(&run)?;
            } else {
                print_assignment(&run);
            }
            Ok(if run.has_hard_stops() { 1 } else { 0 })
        }),
    };
    let exit_code = match outcome {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            if let Some(rejected) = error.downcast_ref::<ConfirmationError>() {
                eprintln!("hint: {}", rejected.suggestion());
            }
            1
        }
    };
    std::process::exit(exit_code);
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config = config.with_level_filter(match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        });
    }
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
        .with_format(format)
        .with_ansi(with_ansi)
        .with_log_file(cli.log_file.clone())
        .with_log_data(cli.log_data)
}
