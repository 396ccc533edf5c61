//! Demo cases bundled with the viewer.

use super::case::Case;

/// Embedded demo case list (JSON)
const SAMPLE_CASES: &str = include_str!("../../assets/sample_cases.json");

/// Parse the bundled demo cases.
pub fn sample_cases() -> Result<Vec<Case>, serde_json::Error> {
    serde_json::from_str(SAMPLE_CASES)
}
