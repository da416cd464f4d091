//! Report rendering: comfy-table, numbered text, JSON and CSV.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use react_core::units::display;
use react_core::{AssessorRegistry, DecisionReport, NormalizationAudit, ReportStatus};
use react_model::{Drug, Guidance, IssueGuidance, IssueType, SupportingDatum, UnitMode};
use react_standards::DoctorReport;
use serde::Serialize;

/// Shown for issues without a matching guidance row.
pub const GUIDANCE_NOT_FOUND: &str =
    "No specific dose modification guidance matched. Verify in the current label.";

pub const EDUCATIONAL_NOTE: &str = "Recommendations are educational and must be verified \
     against the current prescribing information.";

const NO_TRIGGERS: &str = "No dose-modification triggers detected from the values entered.";
const NO_INPUT: &str = "Please enter at least one value to analyze.";

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

/// Formats one supporting datum in the unit mode the counts were entered in.
///
/// Cell counts are carried in /uL and shown as `40 K/uL` or `40,000 /uL`.
pub fn format_datum(datum: &SupportingDatum, mode: UnitMode) -> String {
    let value = datum.value.map(|value| match datum.parameter {
        Some(parameter) if parameter.is_cell_count() => match mode {
            UnitMode::KiloPerMicroliter => format!("{} {}", display(value, mode), mode),
            UnitMode::PerMicroliter => format!("{} {}", group_thousands(value), mode),
        },
        Some(parameter) => match parameter.unit(mode) {
            "" => value.to_string(),
            unit => format!("{value} {unit}"),
        },
        None => value.to_string(),
    });
    match (value, datum.grade) {
        (Some(value), Some(grade)) => format!("{}: {value} ({grade})", datum.label),
        (Some(value), None) => format!("{}: {value}", datum.label),
        (None, Some(grade)) => format!("{}: {grade}", datum.label),
        (None, None) => datum.label.clone(),
    }
}

/// Rounds to a whole number and inserts thousands separators.
pub fn group_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn unit_mode_of(report: &DecisionReport) -> UnitMode {
    report
        .normalization
        .as_ref()
        .map(|audit| audit.unit_mode)
        .unwrap_or_default()
}

fn status_label(status: ReportStatus) -> &'static str {
    match status {
        ReportStatus::Analyzed => "analyzed",
        ReportStatus::NoInput => "no input",
        ReportStatus::UnknownDrug => "unknown drug",
    }
}

fn drug_label(report: &DecisionReport) -> &'static str {
    report.drug.map_or("unknown", |drug| drug.as_str())
}

/// Numbered issue list with recommendation and supporting-data sub-items.
pub fn render_text(report: &DecisionReport) -> String {
    let mode = unit_mode_of(report);
    let mut lines = vec![
        format!("Drug: {}", drug_label(report)),
        format!("Status: {}", status_label(report.status)),
    ];
    for diagnostic in &report.diagnostics {
        lines.push(format!("Note: {diagnostic}"));
    }

    match report.status {
        ReportStatus::NoInput => {
            lines.push(String::new());
            lines.push(NO_INPUT.to_string());
            return finish(lines);
        }
        ReportStatus::UnknownDrug => return finish(lines),
        ReportStatus::Analyzed => {}
    }

    if let Some(audit) = &report.normalization {
        lines.push(String::new());
        lines.extend(normalization_lines(audit));
    }

    lines.push(String::new());
    if report.issues.is_empty() {
        lines.push(NO_TRIGGERS.to_string());
        return finish(lines);
    }
    lines.push(format!(
        "Found {} issue(s) to review:",
        report.issues.len()
    ));
    for (number, resolved) in report.issues.iter().enumerate() {
        let issue = &resolved.issue;
        lines.push(String::new());
        lines.push(format!(
            "{}. {}: {}",
            number + 1,
            issue.issue_type,
            issue.condition
        ));
        match &resolved.guidance {
            Guidance::Resolved(text) => lines.push(format!("   Recommendation: {text}")),
            Guidance::NotFound => lines.push(format!("   {GUIDANCE_NOT_FOUND}")),
        }
        if !issue.supporting.is_empty() {
            lines.push("   Supporting data:".to_string());
            for datum in &issue.supporting {
                lines.push(format!("   - {}", format_datum(datum, mode)));
            }
        }
    }
    lines.push(String::new());
    lines.push(EDUCATIONAL_NOTE.to_string());
    finish(lines)
}

fn finish(mut lines: Vec<String>) -> String {
    lines.push(String::new());
    lines.join("\n")
}

fn normalization_lines(audit: &NormalizationAudit) -> Vec<String> {
    let mut lines = vec![format!("CBC units: {}", audit.unit_mode)];
    for entry in &audit.entries {
        lines.push(format!(
            "- {} interpreted as {} /uL",
            entry.label,
            group_thousands(entry.per_microliter)
        ));
    }
    lines
}

/// Issue table for terminal output.
pub fn render_table(report: &DecisionReport) -> String {
    let mode = unit_mode_of(report);
    let mut out = format!(
        "Drug: {}  Status: {}\n",
        drug_label(report),
        status_label(report.status)
    );
    for diagnostic in &report.diagnostics {
        out.push_str(&format!("Note: {diagnostic}\n"));
    }
    if report.status != ReportStatus::Analyzed {
        if report.status == ReportStatus::NoInput {
            out.push_str(NO_INPUT);
            out.push('\n');
        }
        return out;
    }
    if report.issues.is_empty() {
        out.push_str(NO_TRIGGERS);
        out.push('\n');
        return out;
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Issue"),
        header_cell("Condition"),
        header_cell("Recommendation"),
        header_cell("Supporting data"),
    ]);
    apply_table_style(&mut table);
    for (number, resolved) in report.issues.iter().enumerate() {
        let issue = &resolved.issue;
        let guidance_cell = match &resolved.guidance {
            Guidance::Resolved(text) => Cell::new(text),
            Guidance::NotFound => Cell::new(GUIDANCE_NOT_FOUND).fg(Color::Yellow),
        };
        let supporting = issue
            .supporting
            .iter()
            .map(|datum| format_datum(datum, mode))
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(vec![
            Cell::new(number + 1),
            Cell::new(issue.issue_type).add_attribute(Attribute::Bold),
            Cell::new(&issue.condition),
            guidance_cell,
            Cell::new(supporting).fg(Color::DarkGrey),
        ]);
    }
    out.push_str(&table.to_string());
    out.push('\n');
    out.push_str(EDUCATIONAL_NOTE);
    out.push('\n');
    out
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn render_json(report: &DecisionReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("serialize report")
}

#[derive(Serialize)]
struct IssueRow<'a> {
    #[serde(rename = "Number")]
    number: usize,
    #[serde(rename = "Issue Type")]
    issue_type: &'a str,
    #[serde(rename = "Condition")]
    condition: &'a str,
    #[serde(rename = "Guidance Status")]
    status: &'static str,
    #[serde(rename = "Guidance")]
    guidance: &'a str,
    #[serde(rename = "Supporting")]
    supporting: String,
}

/// One CSV row per issue; supporting data joined with `; `.
pub fn render_csv(report: &DecisionReport) -> Result<String> {
    let mode = unit_mode_of(report);
    let mut writer = csv::Writer::from_writer(Vec::new());
    for (number, resolved) in report.issues.iter().enumerate() {
        let issue = &resolved.issue;
        writer
            .serialize(IssueRow {
                number: number + 1,
                issue_type: issue.issue_type.as_str(),
                condition: issue.condition.as_str(),
                status: if resolved.guidance.is_resolved() {
                    "resolved"
                } else {
                    "not_found"
                },
                guidance: resolved.guidance.text().unwrap_or(""),
                supporting: issue
                    .supporting
                    .iter()
                    .map(|datum| format_datum(datum, mode))
                    .collect::<Vec<_>>()
                    .join("; "),
            })
            .context("write CSV row")?;
    }
    if report.issues.is_empty() {
        writer
            .write_record([
                "Number",
                "Issue Type",
                "Condition",
                "Guidance Status",
                "Guidance",
                "Supporting",
            ])
            .context("write CSV header")?;
    }
    let bytes = writer.into_inner().context("flush CSV")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

#[derive(Serialize)]
struct GuidanceRow<'a> {
    #[serde(rename = "Issue Type")]
    issue_type: &'a str,
    #[serde(rename = "Condition")]
    condition: &'a str,
    #[serde(rename = "Guidance")]
    guidance: &'a str,
}

fn guidance_rows(
    table: &BTreeMap<IssueType, IssueGuidance>,
) -> impl Iterator<Item = GuidanceRow<'_>> {
    table.iter().flat_map(|(issue_type, entries)| {
        entries.iter().map(move |(condition, guidance)| GuidanceRow {
            issue_type: issue_type.as_str(),
            condition: condition.as_str(),
            guidance,
        })
    })
}

pub fn render_guidance_table(table: &BTreeMap<IssueType, IssueGuidance>) -> String {
    let mut out = Table::new();
    out.set_header(vec![
        header_cell("Issue"),
        header_cell("Condition"),
        header_cell("Guidance"),
    ]);
    apply_table_style(&mut out);
    for row in guidance_rows(table) {
        out.add_row(vec![
            Cell::new(row.issue_type),
            Cell::new(row.condition),
            Cell::new(row.guidance),
        ]);
    }
    out.to_string()
}

pub fn render_guidance_json(table: &BTreeMap<IssueType, IssueGuidance>) -> Result<String> {
    serde_json::to_string_pretty(table).context("serialize guidance table")
}

pub fn render_guidance_csv(table: &BTreeMap<IssueType, IssueGuidance>) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in guidance_rows(table) {
        writer.serialize(row).context("write CSV row")?;
    }
    let bytes = writer.into_inner().context("flush CSV")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

/// Doctor report plus the assessment rules built into the binary.
#[derive(Serialize)]
struct StandardsOverview<'a> {
    #[serde(flatten)]
    reference_data: &'a DoctorReport,
    assessors: Vec<AssessorRow>,
}

#[derive(Serialize)]
struct AssessorRow {
    drug: Drug,
    description: &'static str,
}

pub fn render_standards_json(
    doctor: &DoctorReport,
    assessors: &AssessorRegistry,
) -> Result<String> {
    let assessors = assessors
        .drugs()
        .filter_map(|drug| assessors.get(drug))
        .map(|assessor| AssessorRow {
            drug: assessor.drug(),
            description: assessor.description(),
        })
        .collect();
    let overview = StandardsOverview {
        reference_data: doctor,
        assessors,
    };
    serde_json::to_string_pretty(&overview).context("serialize standards report")
}

#[cfg(test)]
mod tests {
    use react_model::{Grade, LabParameter};

    use super::*;

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(group_thousands(40_000.0), "40,000");
        assert_eq!(group_thousands(1_500.0), "1,500");
        assert_eq!(group_thousands(999.4), "999");
        assert_eq!(group_thousands(150_000.0), "150,000");
        assert_eq!(group_thousands(1_234_567.0), "1,234,567");
    }

    #[test]
    fn counts_shown_in_entered_units() {
        let datum = SupportingDatum::new("Platelets", Some(Grade::THREE), Some(40_000.0))
            .with_parameter(LabParameter::Platelet);
        assert_eq!(
            format_datum(&datum, UnitMode::KiloPerMicroliter),
            "Platelets: 40 K/uL (Grade 3)"
        );
        assert_eq!(
            format_datum(&datum, UnitMode::PerMicroliter),
            "Platelets: 40,000 /uL (Grade 3)"
        );
    }

    #[test]
    fn non_count_values_keep_their_unit() {
        let hgb = SupportingDatum::new("Anemia", Some(Grade::TWO), Some(8.5))
            .with_parameter(LabParameter::Hemoglobin);
        assert_eq!(
            format_datum(&hgb, UnitMode::PerMicroliter),
            "Anemia: 8.5 g/dL (Grade 2)"
        );
        let delay = SupportingDatum::new("Dose delay (weeks)", None, Some(20.0));
        assert_eq!(
            format_datum(&delay, UnitMode::KiloPerMicroliter),
            "Dose delay (weeks): 20"
        );
        let reported = SupportingDatum::new("Reported grade", Some(Grade::THREE), None);
        assert_eq!(
            format_datum(&reported, UnitMode::KiloPerMicroliter),
            "Reported grade: Grade 3"
        );
    }

    #[test]
    fn empty_report_csv_still_has_header() {
        let report = DecisionReport {
            drug: None,
            status: ReportStatus::UnknownDrug,
            issues: Vec::new(),
            diagnostics: vec!["unknown drug: XOFIGO".to_string()],
            normalization: None,
            guidance_lookups: 0,
        };
        let csv = render_csv(&report).unwrap();
        assert_eq!(
            csv,
            "Number,Issue Type,Condition,Guidance Status,Guidance,Supporting\n"
        );
    }
}
