//! CLI argument definitions for the REACT toxicity tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use react_cli::input::parse_dry_mouth_grade;
use react_model::{Grade, UnitMode};

#[derive(Parser)]
#[command(
    name = "react-tox",
    version,
    about = "Grade lab toxicities and look up radioligand dose-modification guidance",
    long_about = "Grade laboratory values against CTCAE v5.0 and map the findings to \
                  LUTATHERA or PLUVICTO dose-modification guidance.\n\n\
                  Educational use only. Output does not replace clinical judgment or \
                  the current prescribing information."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
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

    /// Allow lab values to appear in logs (redacted by default).
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Grade a lab panel and resolve dose-modification guidance.
    Assess(Box<AssessArgs>),

    /// Verify the reference data snapshot and list the supported drugs.
    Standards(StandardsArgs),

    /// List the dose-modification table for one drug.
    Guidance(GuidanceArgs),
}

#[derive(Args)]
pub struct AssessArgs {
    /// Drug to assess (LUTATHERA or PLUVICTO).
    #[arg(value_name = "DRUG")]
    pub drug: String,

    /// Confirm that output is educational and will be checked against the label.
    #[arg(long = "acknowledge")]
    pub acknowledge: bool,

    /// Panel file with `Field,Value` rows. Flags override file entries.
    #[arg(long = "input", value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Units for platelets, WBC and ANC (K/uL or /uL).
    #[arg(long = "units", value_name = "UNITS")]
    pub units: Option<UnitMode>,

    #[command(flatten)]
    pub labs: LabArgs,

    #[command(flatten)]
    pub limits: LimitArgs,

    #[command(flatten)]
    pub extras: ExtraArgs,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: ReportFormatArg,

    #[command(flatten)]
    pub standards: StandardsArgs,
}

/// Lab values as entered. Text that is not a number is treated as absent.
#[derive(Args, Default)]
pub struct LabArgs {
    /// Hemoglobin (g/dL).
    #[arg(long = "hgb", value_name = "VALUE")]
    pub hemoglobin: Option<String>,

    /// Platelets, in the selected units.
    #[arg(long = "plt", value_name = "VALUE")]
    pub platelet: Option<String>,

    /// WBC, in the selected units.
    #[arg(long = "wbc", value_name = "VALUE")]
    pub wbc: Option<String>,

    /// ANC, in the selected units.
    #[arg(long = "anc", value_name = "VALUE")]
    pub anc: Option<String>,

    /// Baseline creatinine (mg/dL).
    #[arg(long = "baseline-creatinine", value_name = "VALUE")]
    pub baseline_creatinine: Option<String>,

    /// Current creatinine (mg/dL).
    #[arg(long = "creatinine", value_name = "VALUE")]
    pub creatinine: Option<String>,

    /// Baseline creatinine clearance (mL/min).
    #[arg(long = "baseline-clcr", value_name = "VALUE")]
    pub baseline_clcr: Option<String>,

    /// Current creatinine clearance (mL/min).
    #[arg(long = "clcr", value_name = "VALUE")]
    pub clcr: Option<String>,

    /// Total bilirubin (mg/dL).
    #[arg(long = "bilirubin", value_name = "VALUE")]
    pub bilirubin: Option<String>,

    /// Albumin (g/L).
    #[arg(long = "albumin", value_name = "VALUE")]
    pub albumin: Option<String>,

    #[arg(long = "inr", value_name = "VALUE")]
    pub inr: Option<String>,
}

/// Reference limit overrides. An empty value clears the limit.
#[derive(Args, Default)]
pub struct LimitArgs {
    #[arg(long = "lln-hgb", value_name = "VALUE")]
    pub lln_hemoglobin: Option<String>,

    #[arg(long = "lln-plt", value_name = "VALUE")]
    pub lln_platelet: Option<String>,

    #[arg(long = "lln-wbc", value_name = "VALUE")]
    pub lln_wbc: Option<String>,

    #[arg(long = "lln-anc", value_name = "VALUE")]
    pub lln_anc: Option<String>,

    #[arg(long = "uln-creatinine", value_name = "VALUE")]
    pub uln_creatinine: Option<String>,

    #[arg(long = "uln-bilirubin", value_name = "VALUE")]
    pub uln_bilirubin: Option<String>,

    /// Start from no reference limits instead of the adult defaults.
    #[arg(long = "no-default-limits")]
    pub no_default_limits: bool,
}

/// Drug-specific assessments.
#[derive(Args, Default)]
pub struct ExtraArgs {
    /// Dry mouth grade (1-3).
    #[arg(long = "dry-mouth", value_name = "GRADE", value_parser = parse_dry_mouth_grade)]
    pub dry_mouth: Option<Grade>,

    /// Fatigue grade (1-4).
    #[arg(long = "fatigue", value_name = "GRADE")]
    pub fatigue: Option<Grade>,

    /// Gastrointestinal toxicity grade (1-4).
    #[arg(long = "gi", value_name = "GRADE")]
    pub gi: Option<Grade>,

    /// GI toxicity does not respond to medical intervention.
    #[arg(long = "gi-not-amenable")]
    pub gi_not_amenable: bool,

    /// Electrolyte or metabolic abnormality grade (1-4).
    #[arg(long = "electrolyte", value_name = "GRADE")]
    pub electrolyte: Option<Grade>,

    /// Dose delay due to toxicity, in weeks.
    #[arg(long = "delay-weeks", value_name = "WEEKS")]
    pub delay_weeks: Option<String>,
}

#[derive(Args)]
pub struct StandardsArgs {
    /// Reference data directory (defaults to $REACT_STANDARDS_DIR or the bundled snapshot).
    #[arg(long = "standards-dir", value_name = "DIR")]
    pub standards_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct GuidanceArgs {
    /// Drug whose table to list.
    #[arg(value_name = "DRUG")]
    pub drug: String,

    /// Only list rows for this issue type.
    #[arg(long = "issue", value_name = "ISSUE_TYPE")]
    pub issue: Option<String>,

    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: ListFormatArg,

    #[command(flatten)]
    pub standards: StandardsArgs,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormatArg {
    Table,
    Text,
    Json,
    Csv,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormatArg {
    Table,
    Json,
    Csv,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
