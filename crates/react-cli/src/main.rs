//! REACT toxicity grading CLI.

use clap::{ColorChoice, Parser};
use react_cli::logging::{LogConfig, LogFormat, init_logging};
use react_cli::render::{render_csv, render_json, render_table, render_text};
use react_core::{DecisionReport, ReportStatus};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, ReportFormatArg};
use crate::commands::{AssessOutcome, run_assess, run_guidance, run_standards};

const DISCLAIMER: &str = "This tool is educational. It does not replace clinical judgment \
     or the current prescribing information. Re-run with --acknowledge to accept.";

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Command::Assess(args) => match run_assess(&args) {
            Ok(AssessOutcome::NotAcknowledged) => {
                eprintln!("{DISCLAIMER}");
                2
            }
            Ok(AssessOutcome::Report(report)) => print_report(&report, args.format),
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Standards(args) => match run_standards(&args) {
            Ok(json) => {
                println!("{json}");
                0
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Guidance(args) => match run_guidance(&args) {
            Ok(rendered) => {
                println!("{rendered}");
                0
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}

/// Prints the report and maps its status to an exit code.
fn print_report(report: &DecisionReport, format: ReportFormatArg) -> i32 {
    let rendered = match format {
        ReportFormatArg::Table => Ok(render_table(report)),
        ReportFormatArg::Text => Ok(render_text(report)),
        ReportFormatArg::Json => render_json(report),
        ReportFormatArg::Csv => render_csv(report),
    };
    match rendered {
        Ok(text) => print!("{text}"),
        Err(error) => {
            eprintln!("error: {error:#}");
            return 1;
        }
    }
    if format == ReportFormatArg::Json {
        println!();
    }
    match report.status {
        ReportStatus::Analyzed => 0,
        ReportStatus::NoInput => 2,
        ReportStatus::UnknownDrug => 1,
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
