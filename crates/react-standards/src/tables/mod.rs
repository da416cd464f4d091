//! Parsers for the reference tables listed in the manifest.

pub mod criteria;
pub mod modifications;

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::StandardsError;

pub use criteria::parse_criteria_csv;
pub use modifications::parse_dose_modifications_csv;

/// One data row keyed by header name, with its 1-based record number.
#[derive(Debug, Clone)]
pub(crate) struct CsvRow {
    pub(crate) number: usize,
    fields: BTreeMap<String, String>,
}

impl CsvRow {
    /// Trimmed value of a column, `None` when missing or blank.
    pub(crate) fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    pub(crate) fn require(&self, path: &Path, name: &str) -> Result<&str, StandardsError> {
        self.get(name).ok_or_else(|| {
            StandardsError::csv(path, format!("row {}: missing {name}", self.number))
        })
    }
}

/// Reads a headed CSV file, requiring every column in `required`.
pub(crate) fn read_rows(path: &Path, required: &[&str]) -> Result<Vec<CsvRow>, StandardsError> {
    let bytes = std::fs::read(path).map_err(|e| StandardsError::io(path, e))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes.as_slice());
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| StandardsError::csv(path, e.to_string()))?
        .iter()
        .map(|h| h.trim_matches('\u{feff}').trim().to_string())
        .collect();

    for column in required {
        if !headers.iter().any(|h| h == column) {
            return Err(StandardsError::csv(
                path,
                format!("missing column: {column}"),
            ));
        }
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| StandardsError::csv(path, e.to_string()))?;
        let fields = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.clone(), value.trim().to_string()))
            .collect();
        rows.push(CsvRow {
            number: idx + 1,
            fields,
        });
    }
    Ok(rows)
}
