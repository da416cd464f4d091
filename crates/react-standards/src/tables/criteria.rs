#![deny(unsafe_code)]

use std::path::Path;

use react_model::{CriteriaSet, Grade, LabBound, LabParameter, Toxicity};

use super::{CsvRow, read_rows};
use crate::error::StandardsError;

const COLUMNS: &[&str] = &["Toxicity", "Grade", "Parameter", "Min", "Max", "Below LLN"];

/// Parses the CTCAE grading table into a validated [`CriteriaSet`].
///
/// Each row contributes one lab-field bound to a (toxicity, grade) pair.
/// Blank `Min`/`Max` cells are open bounds.
pub fn parse_criteria_csv(path: &Path) -> Result<CriteriaSet, StandardsError> {
    let rows = read_rows(path, COLUMNS)?;
    let mut criteria = CriteriaSet::new();

    for row in &rows {
        let model_err = |source| StandardsError::Model {
            path: path.to_path_buf(),
            row: row.number,
            source,
        };

        let toxicity: Toxicity = row
            .require(path, "Toxicity")?
            .parse()
            .map_err(model_err)?;
        let grade: Grade = row.require(path, "Grade")?.parse().map_err(model_err)?;
        let parameter: LabParameter = row
            .require(path, "Parameter")?
            .parse()
            .map_err(model_err)?;

        let min = parse_bound(path, row, "Min")?;
        let max = parse_bound(path, row, "Max")?;
        let mut bound = LabBound::new(parameter, min, max);
        if parse_flag(path, row, "Below LLN")? {
            bound = bound.below_lln();
        }

        criteria
            .insert(toxicity, grade, bound)
            .map_err(model_err)?;
    }

    Ok(criteria)
}

fn parse_bound(path: &Path, row: &CsvRow, column: &str) -> Result<Option<f64>, StandardsError> {
    let Some(text) = row.get(column) else {
        return Ok(None);
    };
    text.replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| {
            StandardsError::csv(
                path,
                format!("row {}: invalid {column} value '{text}'", row.number),
            )
        })
}

fn parse_flag(path: &Path, row: &CsvRow, column: &str) -> Result<bool, StandardsError> {
    match row.get(column).map(str::to_ascii_lowercase).as_deref() {
        None | Some("no" | "n" | "false") => Ok(false),
        Some("yes" | "y" | "true") => Ok(true),
        Some(other) => Err(StandardsError::csv(
            path,
            format!("row {}: invalid {column} flag '{other}'", row.number),
        )),
    }
}
