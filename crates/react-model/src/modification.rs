//! Drug-label dose-modification guidance.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{Drug, IssueType};
use crate::error::{ModelError, Result};
use crate::label::ConditionLabel;

/// Guidance text for one issue type, keyed by condition label.
///
/// Keys iterate in sorted order, so lookups never depend on the order rows
/// appeared in the source file.
pub type IssueGuidance = BTreeMap<ConditionLabel, String>;

/// Drug → issue type → condition label → guidance text.
///
/// Read-only reference data once built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoseModificationTable {
    drugs: BTreeMap<Drug, BTreeMap<IssueType, IssueGuidance>>,
}

impl DoseModificationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one guidance row. A repeated (drug, issue type, label) is an error.
    pub fn insert(
        &mut self,
        drug: Drug,
        issue_type: IssueType,
        condition: ConditionLabel,
        guidance: impl Into<String>,
    ) -> Result<()> {
        let entries = self
            .drugs
            .entry(drug)
            .or_default()
            .entry(issue_type)
            .or_default();
        if entries.contains_key(&condition) {
            return Err(ModelError::DuplicateGuidance {
                drug,
                issue_type,
                condition: condition.to_string(),
            });
        }
        entries.insert(condition, guidance.into());
        Ok(())
    }

    pub fn drug(&self, drug: Drug) -> Option<&BTreeMap<IssueType, IssueGuidance>> {
        self.drugs.get(&drug)
    }

    pub fn guidance_for(&self, drug: Drug, issue_type: IssueType) -> Option<&IssueGuidance> {
        self.drugs.get(&drug)?.get(&issue_type)
    }

    pub fn drugs(&self) -> impl Iterator<Item = Drug> + '_ {
        self.drugs.keys().copied()
    }

    /// Total number of guidance rows across all drugs.
    pub fn len(&self) -> usize {
        self.drugs
            .values()
            .flat_map(BTreeMap::values)
            .map(BTreeMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_rows_are_rejected() {
        let mut table = DoseModificationTable::new();
        table
            .insert(
                Drug::Pluvicto,
                IssueType::Fatigue,
                "Grade ≥ 3".into(),
                "Withhold.",
            )
            .unwrap();
        let err = table
            .insert(
                Drug::Pluvicto,
                IssueType::Fatigue,
                "Grade ≥ 3".into(),
                "Other.",
            )
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateGuidance { .. }));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn labels_are_byte_exact_keys() {
        let mut table = DoseModificationTable::new();
        table
            .insert(Drug::Pluvicto, IssueType::Fatigue, "Grade ≥ 3".into(), "a")
            .unwrap();
        table
            .insert(Drug::Pluvicto, IssueType::Fatigue, "Grade >= 3".into(), "b")
            .unwrap();
        let guidance = table
            .guidance_for(Drug::Pluvicto, IssueType::Fatigue)
            .unwrap();
        assert_eq!(guidance.get("Grade ≥ 3").map(String::as_str), Some("a"));
        assert_eq!(guidance.get("Grade >= 3").map(String::as_str), Some("b"));
        assert!(guidance.get("Grade ≥3").is_none());
    }
}
