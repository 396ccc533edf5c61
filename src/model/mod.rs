//! Data models for the MedView viewer.

mod case;
mod finding;
mod sample;

pub use case::{Case, CaseStatus, Exposure, Gender, Modality, TechnicalMetrics};
pub use finding::{CoordinateIssue, Coordinates, Finding, Severity};
pub use sample::sample_cases;
