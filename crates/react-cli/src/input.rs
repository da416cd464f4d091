//! Lab panel entry from flags and `Field,Value` CSV files.
//!
//! Entries stay as text until the request is built, so blank or malformed
//! values become absent instead of failing the run.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use csv::{ReaderBuilder, StringRecord, Trim};
use react_core::DecisionRequest;
use react_model::{Grade, LabPanel, LabParameter, ReferenceRanges, UnitMode, parse_numeric};
use tracing::trace;

use crate::logging::redact_value;

/// CTCAE xerostomia has no Grade 4.
pub const DRY_MOUTH_MAX_GRADE: Grade = Grade::THREE;

/// Parses a dry mouth grade, which runs from 1 to 3.
pub fn parse_dry_mouth_grade(text: &str) -> Result<Grade, String> {
    let grade = text.parse::<Grade>().map_err(|err| err.to_string())?;
    if grade > DRY_MOUTH_MAX_GRADE {
        return Err(format!(
            "dry mouth is graded 1 to {}, got {}",
            DRY_MOUTH_MAX_GRADE.number(),
            grade.number()
        ));
    }
    Ok(grade)
}

/// Which slot a `Field` names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Units,
    Value(LabParameter),
    Lln(LabParameter),
    Uln(LabParameter),
}

/// Entered panel text, before numeric parsing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelEntries {
    pub unit_mode: Option<UnitMode>,
    pub values: BTreeMap<LabParameter, String>,
    pub lln: BTreeMap<LabParameter, String>,
    pub uln: BTreeMap<LabParameter, String>,
}

impl PanelEntries {
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("open panel file {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("read panel file {}", path.display()))
    }

    /// Reads `Field,Value` rows.
    ///
    /// Fields are parameter names or aliases (`Platelets`, `CLcr`), the same
    /// prefixed with `LLN` or `ULN`, or `Units`. Later rows win.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);
        let headers = reader.headers().context("read header row")?.clone();
        let field_idx = column_index(&headers, "Field")?;
        let value_idx = column_index(&headers, "Value")?;

        let mut entries = Self::default();
        for (idx, record) in reader.records().enumerate() {
            let row = idx + 2;
            let record = record.with_context(|| format!("row {row}"))?;
            let field = record.get(field_idx).unwrap_or("");
            if field.is_empty() || field.starts_with('#') {
                continue;
            }
            let value = record.get(value_idx).unwrap_or("");
            let slot = parse_slot(field).with_context(|| format!("row {row}"))?;
            entries.set(slot, value).with_context(|| format!("row {row}"))?;
        }
        Ok(entries)
    }

    /// Overrides an entry when `text` was given.
    pub fn set_value(&mut self, parameter: LabParameter, text: Option<&str>) {
        if let Some(text) = text {
            self.values.insert(parameter, text.to_string());
        }
    }

    pub fn set_lln(&mut self, parameter: LabParameter, text: Option<&str>) {
        if let Some(text) = text {
            self.lln.insert(parameter, text.to_string());
        }
    }

    pub fn set_uln(&mut self, parameter: LabParameter, text: Option<&str>) {
        if let Some(text) = text {
            self.uln.insert(parameter, text.to_string());
        }
    }

    fn set(&mut self, slot: Slot, text: &str) -> Result<()> {
        match slot {
            Slot::Units => {
                let mode = text
                    .parse::<UnitMode>()
                    .map_err(|err| anyhow!("invalid units: {err}"))?;
                self.unit_mode = Some(mode);
            }
            Slot::Value(parameter) => self.set_value(parameter, Some(text)),
            Slot::Lln(parameter) => self.set_lln(parameter, Some(text)),
            Slot::Uln(parameter) => self.set_uln(parameter, Some(text)),
        }
        Ok(())
    }

    /// Builds the engine request.
    ///
    /// Limits start from the adult defaults for the unit mode unless
    /// `default_limits` is false; an entered limit that is blank or not a
    /// number clears it.
    pub fn into_request(self, default_limits: bool) -> DecisionRequest {
        let unit_mode = self.unit_mode.unwrap_or_default();

        let mut builder = LabPanel::builder(unit_mode);
        for (parameter, text) in &self.values {
            trace!(%parameter, value = redact_value(text), "panel value");
            builder = builder.text(*parameter, text);
        }

        let mut ranges = if default_limits {
            ReferenceRanges::defaults(unit_mode)
        } else {
            ReferenceRanges::empty()
        };
        for (parameter, text) in &self.lln {
            trace!(%parameter, value = redact_value(text), "LLN override");
            ranges = ranges.with_lln(*parameter, parse_numeric(text));
        }
        for (parameter, text) in &self.uln {
            trace!(%parameter, value = redact_value(text), "ULN override");
            ranges = ranges.with_uln(*parameter, parse_numeric(text));
        }

        DecisionRequest::new(builder.build()).with_ranges(ranges)
    }
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or_else(|| anyhow!("missing {name} column"))
}

fn parse_slot(field: &str) -> Result<Slot> {
    if field.eq_ignore_ascii_case("units") || field.eq_ignore_ascii_case("cbc units") {
        return Ok(Slot::Units);
    }
    if let Some(rest) = strip_limit(field, "LLN") {
        return Ok(Slot::Lln(parse_parameter(rest)?));
    }
    if let Some(rest) = strip_limit(field, "ULN") {
        return Ok(Slot::Uln(parse_parameter(rest)?));
    }
    Ok(Slot::Value(parse_parameter(field)?))
}

/// Strips `LLN` from either end of `Platelet LLN` / `LLN Platelet`.
fn strip_limit<'a>(field: &'a str, marker: &str) -> Option<&'a str> {
    let upper = field.to_ascii_uppercase();
    if upper.starts_with(&format!("{marker} ")) {
        Some(field[marker.len()..].trim())
    } else if upper.ends_with(&format!(" {marker}")) {
        Some(field[..field.len() - marker.len()].trim())
    } else {
        None
    }
}

fn parse_parameter(text: &str) -> Result<LabParameter> {
    text.parse::<LabParameter>()
        .map_err(|err| anyhow!("{err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_values_limits_and_units() {
        let csv = "Field,Value\nUnits,/uL\nPlatelets,40000\nPlatelet LLN,140000\n\
                   ULN Creatinine,1.3\nHgb,\n";
        let entries = PanelEntries::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(entries.unit_mode, Some(UnitMode::PerMicroliter));
        assert_eq!(
            entries.values.get(&LabParameter::Platelet).map(String::as_str),
            Some("40000")
        );
        assert_eq!(
            entries.lln.get(&LabParameter::Platelet).map(String::as_str),
            Some("140000")
        );
        assert_eq!(
            entries.uln.get(&LabParameter::Creatinine).map(String::as_str),
            Some("1.3")
        );
    }

    #[test]
    fn unknown_field_reports_row() {
        let csv = "Field,Value\nHgb,8.5\nPotassium,5.1\n";
        let err = PanelEntries::from_reader(csv.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("row 3"));
    }

    #[test]
    fn missing_value_column_is_rejected() {
        let err = PanelEntries::from_reader("Field\nHgb\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Value"));
    }

    #[test]
    fn blank_limit_clears_default() {
        let mut entries = PanelEntries::default();
        entries.set_value(LabParameter::Hemoglobin, Some("9.5"));
        entries.set_lln(LabParameter::Hemoglobin, Some(""));
        let request = entries.into_request(true);
        assert_eq!(request.ranges.lln(LabParameter::Hemoglobin), None);
        assert_eq!(request.ranges.lln(LabParameter::Platelet), Some(150.0));
        assert_eq!(request.panel.get(LabParameter::Hemoglobin), Some(9.5));
    }

    #[test]
    fn malformed_value_is_absent() {
        let mut entries = PanelEntries::default();
        entries.set_value(LabParameter::Platelet, Some("forty"));
        let request = entries.into_request(false);
        assert!(request.panel.is_empty());
        assert_eq!(request.ranges, ReferenceRanges::empty());
    }

    #[test]
    fn dry_mouth_stops_at_grade_3() {
        assert_eq!(parse_dry_mouth_grade("1"), Ok(Grade::ONE));
        assert_eq!(parse_dry_mouth_grade("Grade 3"), Ok(Grade::THREE));
        let err = parse_dry_mouth_grade("4").unwrap_err();
        assert!(err.contains("1 to 3"), "{err}");
        assert!(parse_dry_mouth_grade("0").is_err());
        assert!(parse_dry_mouth_grade("dry").is_err());
    }

    #[test]
    fn comment_rows_are_skipped() {
        let csv = "Field,Value\n# drawn 2024-03-01,\nANC,0.9\n";
        let entries = PanelEntries::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(entries.values.len(), 1);
    }
}
