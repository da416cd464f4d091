#![deny(unsafe_code)]

use std::path::Path;

use react_model::{ConditionLabel, DoseModificationTable, Drug, IssueType};

use super::read_rows;
use crate::error::StandardsError;

const COLUMNS: &[&str] = &["Drug", "Issue Type", "Condition", "Guidance"];

/// Parses the label-derived guidance table.
///
/// Condition labels are kept byte-exact apart from surrounding whitespace;
/// `Grade ≥ 3` and `Grade >= 3` stay distinct keys.
pub fn parse_dose_modifications_csv(path: &Path) -> Result<DoseModificationTable, StandardsError> {
    let rows = read_rows(path, COLUMNS)?;
    let mut table = DoseModificationTable::new();

    for row in &rows {
        let model_err = |source| StandardsError::Model {
            path: path.to_path_buf(),
            row: row.number,
            source,
        };

        let drug: Drug = row.require(path, "Drug")?.parse().map_err(model_err)?;
        let issue_type: IssueType = row
            .require(path, "Issue Type")?
            .parse()
            .map_err(model_err)?;
        let condition = ConditionLabel::new(row.require(path, "Condition")?);
        let guidance = row.require(path, "Guidance")?;

        table
            .insert(drug, issue_type, condition, guidance)
            .map_err(model_err)?;
    }

    Ok(table)
}
