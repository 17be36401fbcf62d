//! Test-case template generation

use courserag_core::{Error, Result};
use courserag_evals::sample_cases;
use std::path::Path;

/// Writes the built-in sample test cases to `path` as JSON
///
/// Returns the number of cases written. The file is meant as a starting
/// point: users replace the queries and expected sources with ones that
/// match their own uploaded documents.
pub fn write_template(path: &Path) -> Result<usize> {
    let cases = sample_cases();
    let json = serde_json::to_string_pretty(&cases)
        .map_err(|e| Error::config(format!("Failed to serialize template: {e}")))?;
    std::fs::write(path, json)?;
    Ok(cases.len())
}
