//! CLI argument definitions for the `tiket` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "tiket",
    version,
    about = "Ticket import decisions - classify, match, gate and assign",
    long_about = "Decision pipeline for spreadsheet ticket imports.\n\n\
                  Classifies columns, suggests templates, gates import jobs and\n\
                  assigns tickets to field technicians."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow customer identity documents in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Classify columns and suggest a template for structural artifacts.
    Preview(PreviewArgs),

    /// Check whether an import job is ready to run.
    Diagnose(DiagnoseArgs),

    /// Validate a confirm-template decision.
    Confirm(ConfirmArgs),

    /// Assign tickets to technicians.
    Assign(AssignArgs),
}

#[derive(Parser)]
pub struct PreviewArgs {
    /// Artifact files or directories containing `*.json` artifacts.
    #[arg(value_name = "PATHS", required = true)]
    pub paths: Vec<PathBuf>,

    /// Template catalog replacing the built-in one.
    #[arg(long = "catalog", value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Print JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct DiagnoseArgs {
    /// Import job snapshot.
    #[arg(value_name = "JOB")]
    pub job: PathBuf,

    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct ConfirmArgs {
    /// Confirm-template decision.
    #[arg(value_name = "DECISION")]
    pub decision: PathBuf,

    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct AssignArgs {
    /// Technician directory (JSON array of profiles).
    #[arg(long = "technicians", value_name = "PATH")]
    pub technicians: PathBuf,

    /// Assignment requests (JSON array).
    #[arg(long = "jobs", value_name = "PATH")]
    pub jobs: PathBuf,

    /// Engine settings file; flags below override it.
    #[arg(long = "settings", value_name = "PATH")]
    pub settings: Option<PathBuf>,

    #[arg(long = "batch-size", value_name = "N")]
    pub batch_size: Option<usize>,

    /// Timer flush period in milliseconds (0 disables the timer).
    #[arg(long = "flush-interval-ms", value_name = "MS")]
    pub flush_interval_ms: Option<u64>,

    #[arg(long = "rank-timeout-ms", value_name = "MS")]
    pub rank_timeout_ms: Option<u64>,

    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_parse_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "tiket",
            "diagnose",
            "job.json",
            "--log-level",
            "debug",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.log_level, Some(LogLevelArg::Debug));
        assert_eq!(cli.log_format, LogFormatArg::Json);
        assert!(matches!(cli.command, Command::Diagnose(ref args) if !args.json));
    }

    #[test]
    fn assign_overrides_are_optional() {
        let cli = Cli::try_parse_from([
            "tiket",
            "assign",
            "--technicians",
            "techs.json",
            "--jobs",
            "jobs.json",
            "--batch-size",
            "5",
        ])
        .unwrap();
        let Command::Assign(args) = cli.command else {
            panic!("expected assign");
        };
        assert_eq!(args.batch_size, Some(5));
        assert!(args.flush_interval_ms.is_none());
        assert!(args.settings.is_none());
    }

    #[test]
    fn preview_requires_a_path() {
        assert!(Cli::try_parse_from(["tiket", "preview"]).is_err());
    }
}
