use serde::{Deserialize, Serialize};

use crate::grade::Grade;

/// Drug-specific assessments entered next to the lab panel.
///
/// PLUVICTO uses all fields; LUTATHERA only uses `delay_weeks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugExtras {
    pub dry_mouth_grade: Option<Grade>,
    pub fatigue_grade: Option<Grade>,
    pub gi_grade: Option<Grade>,
    /// Whether GI toxicity responds to medical intervention.
    pub gi_amenable: bool,
    pub electrolyte_grade: Option<Grade>,
    /// Dose delay due to toxicity, in weeks.
    pub delay_weeks: Option<f64>,
}

impl Default for DrugExtras {
    fn default() -> Self {
        Self {
            dry_mouth_grade: None,
            fatigue_grade: None,
            gi_grade: None,
            gi_amenable: true,
            electrolyte_grade: None,
            delay_weeks: None,
        }
    }
}

impl DrugExtras {
    /// Delay in weeks when one was entered and is non-zero.
    pub fn nonzero_delay(&self) -> Option<f64> {
        self.delay_weeks.filter(|weeks| *weeks != 0.0)
    }

    pub fn has_any_grade(&self) -> bool {
        self.dry_mouth_grade.is_some()
            || self.fatigue_grade.is_some()
            || self.gi_grade.is_some()
            || self.electrolyte_grade.is_some()
    }
}
