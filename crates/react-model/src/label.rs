//! Condition labels used as keys of the dose-modification table.
//!
//! A label is either a grade expression (`"Grade 2"`, `"Grade ≥ 3"`,
//! `"Grade >=3"`, `"Grade 2-4"`, `"Recurrent Grade ≥ 3"`) or free clinical
//! text (`"CLcr < 40 mL/min"`). Grade expressions parse into a
//! [`GradeThreshold`]; free text stays opaque and only ever matches by exact
//! string equality.

use std::borrow::Borrow;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::grade::Grade;

/// `Grade A-B`, read as "at least A".
static GRADE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Grade\s*([0-9]+)\s*-\s*([0-9]+)").expect("Invalid grade range regex")
});

/// `Grade N`, `Grade ≥ N` or `Grade >= N`.
static GRADE_SINGLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Grade\s*([≥>=]*)\s*([0-9]+)").expect("Invalid grade regex")
});

const RECURRENT_MARKER: &str = "Recurrent";

/// Comparison carried by a grade expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThresholdOperator {
    /// `Grade N`: matches grade N only.
    Exact,
    /// `Grade ≥ N`: matches grade N and above.
    AtLeast,
}

/// Numeric reading of a grade expression.
///
/// `value` is wider than a CTCAE grade so an out-of-scale label such as
/// `"Grade 300"` still parses; it simply admits no real grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GradeThreshold {
    pub operator: ThresholdOperator,
    pub value: u32,
}

impl GradeThreshold {
    pub fn exact(value: u32) -> Self {
        Self {
            operator: ThresholdOperator::Exact,
            value,
        }
    }

    pub fn at_least(value: u32) -> Self {
        Self {
            operator: ThresholdOperator::AtLeast,
            value,
        }
    }

    /// Returns true when a query for grade `query` falls under this threshold.
    pub fn admits(&self, query: u32) -> bool {
        match self.operator {
            ThresholdOperator::Exact => query == self.value,
            ThresholdOperator::AtLeast => query >= self.value,
        }
    }
}

/// Key of the dose-modification table, compared byte-exact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionLabel(String);

impl ConditionLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// `"Grade ≥ N"`.
    pub fn at_least(grade: Grade) -> Self {
        Self(format!("Grade ≥ {}", grade.number()))
    }

    /// `"Any"`, used by triggers that apply regardless of grade.
    pub fn any() -> Self {
        Self("Any".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Labels mentioning `Recurrent` are only consulted after every other
    /// label failed to match.
    pub fn is_recurrent(&self) -> bool {
        self.0.contains(RECURRENT_MARKER)
    }

    /// Parses the grade expression inside the label.
    ///
    /// The range form is tried first; the expression may appear anywhere in
    /// the label, so `"Recurrent Grade ≥ 3 after one dose reduction"` reads
    /// as `≥ 3`. Returns `None` for free-text conditions.
    pub fn parse(&self) -> Option<GradeThreshold> {
        if let Some(caps) = GRADE_RANGE.captures(&self.0) {
            let low = caps.get(1)?.as_str().parse::<u32>().ok()?;
            return Some(GradeThreshold::at_least(low));
        }

        let caps = GRADE_SINGLE.captures(&self.0)?;
        let marker = caps.get(1).map_or("", |m| m.as_str());
        let value = caps.get(2)?.as_str().parse::<u32>().ok()?;
        if marker.contains('≥') || marker.contains(">=") {
            Some(GradeThreshold::at_least(value))
        } else {
            Some(GradeThreshold::exact(value))
        }
    }
}

impl fmt::Display for ConditionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ConditionLabel {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConditionLabel {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ConditionLabel {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<Grade> for ConditionLabel {
    fn from(grade: Grade) -> Self {
        grade.label()
    }
}
