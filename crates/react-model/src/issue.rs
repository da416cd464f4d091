//! Detected issues and their resolved guidance.

use serde::{Deserialize, Serialize};

use crate::enums::{IssueType, LabParameter};
use crate::grade::Grade;
use crate::label::ConditionLabel;

/// One supporting fact shown under an issue, e.g. `Platelets: 40000 (Grade 3)`.
///
/// When `parameter` is a cell count, `value` is in /uL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportingDatum {
    pub label: String,
    pub grade: Option<Grade>,
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<LabParameter>,
}

impl SupportingDatum {
    pub fn new(label: impl Into<String>, grade: Option<Grade>, value: Option<f64>) -> Self {
        Self {
            label: label.into(),
            grade,
            value,
            parameter: None,
        }
    }

    /// Records which lab parameter `value` was measured on.
    #[must_use]
    pub fn with_parameter(mut self, parameter: LabParameter) -> Self {
        self.parameter = Some(parameter);
        self
    }
}

/// A finding that needs dose-modification guidance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedIssue {
    pub issue_type: IssueType,
    pub condition: ConditionLabel,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supporting: Vec<SupportingDatum>,
}

impl DetectedIssue {
    pub fn new(issue_type: IssueType, condition: impl Into<ConditionLabel>) -> Self {
        Self {
            issue_type,
            condition: condition.into(),
            supporting: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_supporting(mut self, supporting: Vec<SupportingDatum>) -> Self {
        self.supporting = supporting;
        self
    }
}

/// Outcome of the guidance lookup for one issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum Guidance {
    Resolved(String),
    /// No table entry matched; shown as "verify in the current label".
    NotFound,
}

impl Guidance {
    pub fn text(&self) -> Option<&str> {
        match self {
            Guidance::Resolved(text) => Some(text),
            Guidance::NotFound => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Guidance::Resolved(_))
    }
}

impl From<Option<&String>> for Guidance {
    fn from(value: Option<&String>) -> Self {
        value.map_or(Guidance::NotFound, |text| Guidance::Resolved(text.clone()))
    }
}

/// A detected issue paired with its guidance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedIssue {
    #[serde(flatten)]
    pub issue: DetectedIssue,
    pub guidance: Guidance,
}
