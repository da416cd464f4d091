//! Guidance lookup: exact label first, grade-threshold fallback second.

use react_model::{
    ConditionLabel, DoseModificationTable, Drug, GradeThreshold, IssueGuidance, IssueType,
    ThresholdOperator,
};
use tracing::debug;

/// Looks up guidance text in a [`DoseModificationTable`].
#[derive(Debug, Clone, Copy)]
pub struct GuidanceResolver<'a> {
    table: &'a DoseModificationTable,
}

impl<'a> GuidanceResolver<'a> {
    pub fn new(table: &'a DoseModificationTable) -> Self {
        Self { table }
    }

    pub fn has_drug(&self, drug: Drug) -> bool {
        self.table.drug(drug).is_some()
    }

    pub fn resolve(
        &self,
        drug: Drug,
        issue_type: IssueType,
        condition: &ConditionLabel,
    ) -> Option<&'a String> {
        let entries = self.table.guidance_for(drug, issue_type)?;
        let found = resolve_in(entries, condition);
        debug!(
            %drug,
            %issue_type,
            %condition,
            resolved = found.is_some(),
            "guidance lookup"
        );
        found
    }
}

/// Resolves `condition` against the labels of one issue type.
///
/// 1. A key equal to `condition` wins outright.
/// 2. Otherwise the grade in `condition` is matched against the non-recurrent
///    keys: an exact `Grade N` key wins over any `Grade ≥ N` key, and among
///    `≥` keys the tightest threshold wins.
/// 3. The same scan then runs over the `Recurrent` keys.
///
/// Free-text conditions only ever match exactly.
pub fn resolve_in<'t>(
    entries: &'t IssueGuidance,
    condition: &ConditionLabel,
) -> Option<&'t String> {
    if let Some(text) = entries.get(condition) {
        return Some(text);
    }

    let query = condition.parse()?.value;

    scan(entries, query, false).or_else(|| scan(entries, query, true))
}

fn scan(entries: &IssueGuidance, query: u32, recurrent: bool) -> Option<&String> {
    let mut best: Option<(GradeThreshold, &String)> = None;

    for (label, text) in entries {
        if label.is_recurrent() != recurrent {
            continue;
        }
        let Some(threshold) = label.parse() else {
            continue;
        };
        if !threshold.admits(query) {
            continue;
        }
        match threshold.operator {
            ThresholdOperator::Exact => return Some(text),
            ThresholdOperator::AtLeast => {
                best = match best {
                    Some((current, current_text)) => {
                        let tighter = tighter_threshold(current, threshold);
                        if tighter == current {
                            Some((current, current_text))
                        } else {
                            Some((threshold, text))
                        }
                    }
                    None => Some((threshold, text)),
                };
            }
        }
    }

    best.map(|(_, text)| text)
}

/// The more specific of two `≥` thresholds that both admit a grade.
///
/// `≥ 3` is tighter than `≥ 2`. On a tie the first one is kept.
pub fn tighter_threshold(current: GradeThreshold, candidate: GradeThreshold) -> GradeThreshold {
    if candidate.value > current.value {
        candidate
    } else {
        current
    }
}
