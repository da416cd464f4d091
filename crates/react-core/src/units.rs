//! Conversion of entered blood counts to the canonical /uL scale.
//!
//! Only cell counts (platelets, WBC, ANC) and their LLNs are converted.
//! Hemoglobin, chemistry and coagulation values are used as entered.

use std::collections::BTreeMap;

use react_model::{LabPanel, LabParameter, ReferenceRanges, UnitMode};
use serde::{Deserialize, Serialize};

pub use react_model::parse_numeric;

/// Converts an entered count to /uL.
pub fn normalize(value: Option<f64>, mode: UnitMode) -> Option<f64> {
    value.map(|v| v * mode.factor())
}

/// Converts a /uL count back to the unit mode it is shown in.
pub fn display(per_microliter: f64, mode: UnitMode) -> f64 {
    per_microliter / mode.factor()
}

/// Converts `value` for `parameter`, leaving non-count parameters untouched.
pub fn normalize_parameter(
    parameter: LabParameter,
    value: Option<f64>,
    mode: UnitMode,
) -> Option<f64> {
    if parameter.is_cell_count() {
        normalize(value, mode)
    } else {
        value
    }
}

/// Panel values and reference limits on the canonical scale.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalLabs {
    unit_mode: UnitMode,
    values: BTreeMap<LabParameter, f64>,
    lln: BTreeMap<LabParameter, f64>,
    uln: BTreeMap<LabParameter, f64>,
}

impl CanonicalLabs {
    pub fn from_inputs(panel: &LabPanel, ranges: &ReferenceRanges) -> Self {
        let mode = panel.unit_mode();
        let values = panel
            .iter()
            .filter_map(|(p, v)| normalize_parameter(p, Some(v), mode).map(|v| (p, v)))
            .collect();
        let lln = ranges
            .lln_entries()
            .filter_map(|(p, v)| normalize_parameter(p, Some(v), mode).map(|v| (p, v)))
            .collect();
        let uln = [LabParameter::Creatinine, LabParameter::Bilirubin]
            .into_iter()
            .filter_map(|p| ranges.uln(p).map(|v| (p, v)))
            .collect();
        Self {
            unit_mode: mode,
            values,
            lln,
            uln,
        }
    }

    pub fn unit_mode(&self) -> UnitMode {
        self.unit_mode
    }

    pub fn get(&self, parameter: LabParameter) -> Option<f64> {
        self.values.get(&parameter).copied()
    }

    /// LLNs keyed by parameter, counts already in /uL.
    pub fn lln_map(&self) -> &BTreeMap<LabParameter, f64> {
        &self.lln
    }

    pub fn uln(&self, parameter: LabParameter) -> Option<f64> {
        self.uln.get(&parameter).copied()
    }

    pub fn has_any(&self, parameters: &[LabParameter]) -> bool {
        parameters.iter().any(|p| self.values.contains_key(p))
    }
}

/// One converted count, as shown in the normalization audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEntry {
    pub label: String,
    pub per_microliter: f64,
}

/// How entered cell counts and LLNs were interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationAudit {
    pub unit_mode: UnitMode,
    pub entries: Vec<NormalizedEntry>,
}

const AUDITED: [(LabParameter, &str); 3] = [
    (LabParameter::Platelet, "Platelets"),
    (LabParameter::Wbc, "WBC"),
    (LabParameter::Anc, "ANC"),
];

impl NormalizationAudit {
    pub fn from_labs(labs: &CanonicalLabs) -> Self {
        let values = AUDITED.iter().filter_map(|(p, label)| {
            labs.get(*p).map(|v| NormalizedEntry {
                label: (*label).to_string(),
                per_microliter: v,
            })
        });
        let limits = AUDITED.iter().filter_map(|(p, _)| {
            labs.lln.get(p).map(|v| NormalizedEntry {
                label: format!("{} LLN", p.as_str()),
                per_microliter: *v,
            })
        });
        Self {
            unit_mode: labs.unit_mode,
            entries: values.chain(limits).collect(),
        }
    }
}
