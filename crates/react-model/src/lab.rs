//! Lab panel and reference ranges for one analysis request.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{LabParameter, UnitMode};

/// Parses user-entered numeric text.
///
/// Blank, malformed and non-finite input all become `None`; entering text is
/// never an error.
pub fn parse_numeric(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Lab values as entered, with the unit mode used for blood counts.
///
/// Values are stored exactly as entered; conversion to /uL happens in the
/// engine. A panel is immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabPanel {
    unit_mode: UnitMode,
    values: BTreeMap<LabParameter, f64>,
}

impl LabPanel {
    pub fn builder(unit_mode: UnitMode) -> LabPanelBuilder {
        LabPanelBuilder {
            unit_mode,
            values: BTreeMap::new(),
        }
    }

    pub fn unit_mode(&self) -> UnitMode {
        self.unit_mode
    }

    pub fn get(&self, parameter: LabParameter) -> Option<f64> {
        self.values.get(&parameter).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LabParameter, f64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }
}

#[derive(Debug, Clone)]
pub struct LabPanelBuilder {
    unit_mode: UnitMode,
    values: BTreeMap<LabParameter, f64>,
}

impl LabPanelBuilder {
    /// Sets a value; `None` or a non-finite number clears it.
    #[must_use]
    pub fn value(mut self, parameter: LabParameter, value: Option<f64>) -> Self {
        match value.filter(|v| v.is_finite()) {
            Some(v) => {
                self.values.insert(parameter, v);
            }
            None => {
                self.values.remove(&parameter);
            }
        }
        self
    }

    /// Sets a value from entered text (see [`parse_numeric`]).
    #[must_use]
    pub fn text(self, parameter: LabParameter, text: &str) -> Self {
        self.value(parameter, parse_numeric(text))
    }

    pub fn build(self) -> LabPanel {
        LabPanel {
            unit_mode: self.unit_mode,
            values: self.values,
        }
    }
}

/// Lower and upper limits of normal, in the same unit mode as the panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRanges {
    lln: BTreeMap<LabParameter, f64>,
    uln: BTreeMap<LabParameter, f64>,
}

impl ReferenceRanges {
    /// No limits at all: LLN-gated grades can never be reached.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Typical adult reference values, expressed in `unit_mode`.
    ///
    /// LLN: hemoglobin 10.0 g/dL, platelets 150 K/uL, WBC 3.0 K/uL,
    /// ANC 1.5 K/uL. ULN: creatinine 1.2 mg/dL, bilirubin 1.0 mg/dL.
    pub fn defaults(unit_mode: UnitMode) -> Self {
        let counts = match unit_mode {
            UnitMode::KiloPerMicroliter => [150.0, 3.0, 1.5],
            UnitMode::PerMicroliter => [150_000.0, 3_000.0, 1_500.0],
        };
        Self::empty()
            .with_lln(LabParameter::Hemoglobin, Some(10.0))
            .with_lln(LabParameter::Platelet, Some(counts[0]))
            .with_lln(LabParameter::Wbc, Some(counts[1]))
            .with_lln(LabParameter::Anc, Some(counts[2]))
            .with_uln(LabParameter::Creatinine, Some(1.2))
            .with_uln(LabParameter::Bilirubin, Some(1.0))
    }

    /// Sets or clears (with `None`) the LLN of a parameter.
    #[must_use]
    pub fn with_lln(mut self, parameter: LabParameter, value: Option<f64>) -> Self {
        set_limit(&mut self.lln, parameter, value);
        self
    }

    /// Sets or clears (with `None`) the ULN of a parameter.
    #[must_use]
    pub fn with_uln(mut self, parameter: LabParameter, value: Option<f64>) -> Self {
        set_limit(&mut self.uln, parameter, value);
        self
    }

    pub fn lln(&self, parameter: LabParameter) -> Option<f64> {
        self.lln.get(&parameter).copied()
    }

    pub fn uln(&self, parameter: LabParameter) -> Option<f64> {
        self.uln.get(&parameter).copied()
    }

    pub fn lln_entries(&self) -> impl Iterator<Item = (LabParameter, f64)> + '_ {
        self.lln.iter().map(|(k, v)| (*k, *v))
    }
}

fn set_limit(map: &mut BTreeMap<LabParameter, f64>, parameter: LabParameter, value: Option<f64>) {
    match value.filter(|v| v.is_finite()) {
        Some(v) => {
            map.insert(parameter, v);
        }
        None => {
            map.remove(&parameter);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_text_is_absent() {
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("   "), None);
        assert_eq!(parse_numeric("abc"), None);
        assert_eq!(parse_numeric("NaN"), None);
        assert_eq!(parse_numeric("inf"), None);
        assert_eq!(parse_numeric(" 8.5 "), Some(8.5));
    }

    #[test]
    fn builder_skips_absent_values() {
        let panel = LabPanel::builder(UnitMode::KiloPerMicroliter)
            .text(LabParameter::Hemoglobin, "8.5")
            .text(LabParameter::Platelet, "n/a")
            .value(LabParameter::Wbc, None)
            .build();
        assert_eq!(panel.len(), 1);
        assert_eq!(panel.get(LabParameter::Hemoglobin), Some(8.5));
        assert_eq!(panel.get(LabParameter::Platelet), None);
    }

    #[test]
    fn later_absent_value_clears_earlier_one() {
        let panel = LabPanel::builder(UnitMode::PerMicroliter)
            .value(LabParameter::Anc, Some(900.0))
            .text(LabParameter::Anc, "")
            .build();
        assert!(panel.is_empty());
    }

    #[test]
    fn default_ranges_follow_unit_mode() {
        let k = ReferenceRanges::defaults(UnitMode::KiloPerMicroliter);
        let abs = ReferenceRanges::defaults(UnitMode::PerMicroliter);
        assert_eq!(k.lln(LabParameter::Platelet), Some(150.0));
        assert_eq!(abs.lln(LabParameter::Platelet), Some(150_000.0));
        assert_eq!(k.lln(LabParameter::Hemoglobin), abs.lln(LabParameter::Hemoglobin));
        assert_eq!(k.uln(LabParameter::Creatinine), Some(1.2));
    }

    #[test]
    fn clearing_a_limit() {
        let ranges = ReferenceRanges::defaults(UnitMode::KiloPerMicroliter)
            .with_lln(LabParameter::Hemoglobin, None);
        assert_eq!(ranges.lln(LabParameter::Hemoglobin), None);
    }
}
