//! Closed vocabularies used by the grading engine.
//!
//! Reference tables are keyed by these enums rather than by free strings, so
//! an unknown drug, parameter or issue type is rejected when the tables are
//! built instead of silently missing at lookup time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Radioligand therapy whose label drives dose-modification guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Drug {
    #[serde(rename = "LUTATHERA")]
    Lutathera,
    #[serde(rename = "PLUVICTO")]
    Pluvicto,
}

impl Drug {
    pub const ALL: [Drug; 2] = [Drug::Lutathera, Drug::Pluvicto];

    /// Returns the drug name as it appears on the label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Drug::Lutathera => "LUTATHERA",
            Drug::Pluvicto => "PLUVICTO",
        }
    }
}

impl fmt::Display for Drug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Drug {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LUTATHERA" | "LU-177 DOTATATE" => Ok(Drug::Lutathera),
            "PLUVICTO" | "LU-177 PSMA-617" => Ok(Drug::Pluvicto),
            _ => Err(ModelError::UnknownDrug(s.to_string())),
        }
    }
}

/// Unit system in which blood counts were entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnitMode {
    /// Thousands per microliter (platelets 100 means 100,000/uL).
    #[default]
    #[serde(rename = "K/uL")]
    KiloPerMicroliter,
    /// Absolute count per microliter.
    #[serde(rename = "/uL")]
    PerMicroliter,
}

impl UnitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitMode::KiloPerMicroliter => "K/uL",
            UnitMode::PerMicroliter => "/uL",
        }
    }

    /// Multiplier that converts a value in this mode to /uL.
    pub fn factor(&self) -> f64 {
        match self {
            UnitMode::KiloPerMicroliter => 1000.0,
            UnitMode::PerMicroliter => 1.0,
        }
    }
}

impl fmt::Display for UnitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UnitMode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();
        match normalized.as_str() {
            "K/UL" | "KUL" | "K-UL" | "10^3/UL" => Ok(UnitMode::KiloPerMicroliter),
            "/UL" | "UL" | "PER-UL" | "/MM3" => Ok(UnitMode::PerMicroliter),
            _ => Err(ModelError::UnknownUnitMode(s.to_string())),
        }
    }
}

/// Laboratory parameter collected for one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LabParameter {
    Hemoglobin,
    Platelet,
    #[serde(rename = "WBC")]
    Wbc,
    #[serde(rename = "ANC")]
    Anc,
    BaselineCreatinine,
    Creatinine,
    BaselineCreatinineClearance,
    CreatinineClearance,
    Bilirubin,
    Albumin,
    #[serde(rename = "INR")]
    Inr,
}

impl LabParameter {
    pub const ALL: [LabParameter; 11] = [
        LabParameter::Hemoglobin,
        LabParameter::Platelet,
        LabParameter::Wbc,
        LabParameter::Anc,
        LabParameter::BaselineCreatinine,
        LabParameter::Creatinine,
        LabParameter::BaselineCreatinineClearance,
        LabParameter::CreatinineClearance,
        LabParameter::Bilirubin,
        LabParameter::Albumin,
        LabParameter::Inr,
    ];

    /// Canonical parameter name used in reference tables and input files.
    pub fn as_str(&self) -> &'static str {
        match self {
            LabParameter::Hemoglobin => "Hemoglobin",
            LabParameter::Platelet => "Platelet",
            LabParameter::Wbc => "WBC",
            LabParameter::Anc => "ANC",
            LabParameter::BaselineCreatinine => "BaselineCreatinine",
            LabParameter::Creatinine => "Creatinine",
            LabParameter::BaselineCreatinineClearance => "BaselineCreatinineClearance",
            LabParameter::CreatinineClearance => "CreatinineClearance",
            LabParameter::Bilirubin => "Bilirubin",
            LabParameter::Albumin => "Albumin",
            LabParameter::Inr => "INR",
        }
    }

    /// Returns true for blood counts entered in the selected [`UnitMode`].
    pub fn is_cell_count(&self) -> bool {
        matches!(
            self,
            LabParameter::Platelet | LabParameter::Wbc | LabParameter::Anc
        )
    }

    /// Display unit for values of this parameter.
    pub fn unit(&self, mode: UnitMode) -> &'static str {
        match self {
            LabParameter::Hemoglobin => "g/dL",
            LabParameter::Platelet | LabParameter::Wbc | LabParameter::Anc => mode.as_str(),
            LabParameter::BaselineCreatinine
            | LabParameter::Creatinine
            | LabParameter::Bilirubin => "mg/dL",
            LabParameter::BaselineCreatinineClearance | LabParameter::CreatinineClearance => {
                "mL/min"
            }
            LabParameter::Albumin => "g/L",
            LabParameter::Inr => "",
        }
    }
}

impl fmt::Display for LabParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LabParameter {
    type Err = ModelError;

    /// Accepts canonical names and common abbreviations (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_uppercase();
        match normalized.as_str() {
            "HEMOGLOBIN" | "HGB" | "HB" => Ok(LabParameter::Hemoglobin),
            "PLATELET" | "PLATELETS" | "PLT" => Ok(LabParameter::Platelet),
            "WBC" | "LEUKOCYTES" => Ok(LabParameter::Wbc),
            "ANC" | "NEUTROPHILS" => Ok(LabParameter::Anc),
            "BASELINECREATININE" | "BASELINECR" => Ok(LabParameter::BaselineCreatinine),
            "CREATININE" | "CR" | "CURRENTCREATININE" => Ok(LabParameter::Creatinine),
            "BASELINECREATININECLEARANCE" | "BASELINECLCR" => {
                Ok(LabParameter::BaselineCreatinineClearance)
            }
            "CREATININECLEARANCE" | "CLCR" | "CURRENTCLCR" => {
                Ok(LabParameter::CreatinineClearance)
            }
            "BILIRUBIN" | "TOTALBILIRUBIN" | "BILI" => Ok(LabParameter::Bilirubin),
            "ALBUMIN" | "ALB" => Ok(LabParameter::Albumin),
            "INR" => Ok(LabParameter::Inr),
            _ => Err(ModelError::UnknownParameter(s.to_string())),
        }
    }
}

/// Hematologic toxicity graded from a single lab parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Toxicity {
    Anemia,
    Thrombocytopenia,
    Leukopenia,
    Neutropenia,
}

impl Toxicity {
    pub const ALL: [Toxicity; 4] = [
        Toxicity::Anemia,
        Toxicity::Thrombocytopenia,
        Toxicity::Leukopenia,
        Toxicity::Neutropenia,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Toxicity::Anemia => "Anemia",
            Toxicity::Thrombocytopenia => "Thrombocytopenia",
            Toxicity::Leukopenia => "Leukopenia",
            Toxicity::Neutropenia => "Neutropenia",
        }
    }

    /// Lab parameter this toxicity is graded on.
    pub fn parameter(&self) -> LabParameter {
        match self {
            Toxicity::Anemia => LabParameter::Hemoglobin,
            Toxicity::Thrombocytopenia => LabParameter::Platelet,
            Toxicity::Leukopenia => LabParameter::Wbc,
            Toxicity::Neutropenia => LabParameter::Anc,
        }
    }

    /// Label used for this toxicity's value in supporting data.
    pub fn measurement_label(&self) -> &'static str {
        match self {
            Toxicity::Anemia => "Hemoglobin",
            Toxicity::Thrombocytopenia => "Platelets",
            Toxicity::Leukopenia => "WBC",
            Toxicity::Neutropenia => "ANC",
        }
    }

    pub fn issue_type(&self) -> IssueType {
        match self {
            Toxicity::Anemia => IssueType::Anemia,
            Toxicity::Thrombocytopenia => IssueType::Thrombocytopenia,
            Toxicity::Leukopenia => IssueType::Leukopenia,
            Toxicity::Neutropenia => IssueType::Neutropenia,
        }
    }
}

impl fmt::Display for Toxicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Toxicity {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Toxicity::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::UnknownToxicity(s.to_string()))
    }
}

/// Issue category used as the second key of the dose-modification table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IssueType {
    Anemia,
    Thrombocytopenia,
    Leukopenia,
    Neutropenia,
    #[serde(rename = "Renal Toxicity")]
    RenalToxicity,
    Hepatotoxicity,
    Myelosuppression,
    #[serde(rename = "Dry Mouth")]
    DryMouth,
    #[serde(rename = "Gastrointestinal toxicity")]
    Gastrointestinal,
    Fatigue,
    #[serde(rename = "Electrolyte or metabolic abnormalities")]
    Electrolyte,
    #[serde(rename = "Treatment delay > 4 weeks")]
    TreatmentDelay,
    #[serde(rename = "Dose delayed > 16 weeks")]
    DoseDelayed,
    #[serde(rename = "Other non-hematologic toxicity")]
    OtherNonHematologic,
    #[serde(rename = "Any unacceptable toxicity")]
    AnyUnacceptable,
}

impl IssueType {
    pub const ALL: [IssueType; 15] = [
        IssueType::Anemia,
        IssueType::Thrombocytopenia,
        IssueType::Leukopenia,
        IssueType::Neutropenia,
        IssueType::RenalToxicity,
        IssueType::Hepatotoxicity,
        IssueType::Myelosuppression,
        IssueType::DryMouth,
        IssueType::Gastrointestinal,
        IssueType::Fatigue,
        IssueType::Electrolyte,
        IssueType::TreatmentDelay,
        IssueType::DoseDelayed,
        IssueType::OtherNonHematologic,
        IssueType::AnyUnacceptable,
    ];

    /// Issue name exactly as written in the label tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Anemia => "Anemia",
            IssueType::Thrombocytopenia => "Thrombocytopenia",
            IssueType::Leukopenia => "Leukopenia",
            IssueType::Neutropenia => "Neutropenia",
            IssueType::RenalToxicity => "Renal Toxicity",
            IssueType::Hepatotoxicity => "Hepatotoxicity",
            IssueType::Myelosuppression => "Myelosuppression",
            IssueType::DryMouth => "Dry Mouth",
            IssueType::Gastrointestinal => "Gastrointestinal toxicity",
            IssueType::Fatigue => "Fatigue",
            IssueType::Electrolyte => "Electrolyte or metabolic abnormalities",
            IssueType::TreatmentDelay => "Treatment delay > 4 weeks",
            IssueType::DoseDelayed => "Dose delayed > 16 weeks",
            IssueType::OtherNonHematologic => "Other non-hematologic toxicity",
            IssueType::AnyUnacceptable => "Any unacceptable toxicity",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IssueType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::UnknownIssueType(s.to_string()))
    }
}
