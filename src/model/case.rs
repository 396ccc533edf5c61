//! Case records: one imaging study plus its AI-derived annotations.

use serde::{Deserialize, Serialize};

use super::finding::{Coordinates, Finding};

/// Triage status. Set when the case is created, never derived from findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Critical,
    Review,
    Normal,
}

impl CaseStatus {
    pub fn name(&self) -> &'static str {
        match self {
            CaseStatus::Critical => "critical",
            CaseStatus::Review => "review",
            CaseStatus::Normal => "normal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
}

/// Imaging modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modality {
    #[serde(rename = "X-Ray")]
    XRay,
    #[serde(rename = "CT")]
    Ct,
    #[serde(rename = "MRI")]
    Mri,
    Ultrasound,
    #[serde(rename = "Uploaded Image")]
    UploadedImage,
}

impl Modality {
    /// Get the display name for this modality.
    pub fn name(&self) -> &'static str {
        match self {
            Modality::XRay => "X-Ray",
            Modality::Ct => "CT",
            Modality::Mri => "MRI",
            Modality::Ultrasound => "Ultrasound",
            Modality::UploadedImage => "Uploaded Image",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Exposure {
    Normal,
    Overexposed,
    Underexposed,
}

/// Image quality metrics, produced once at ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalMetrics {
    pub exposure: Exposure,
    /// 0-100
    pub sharpness: u8,
    /// 0-100
    pub contrast: u8,
    /// Signal to noise ratio in dB
    pub snr: f32,
    pub artifacts_detected: bool,
}

/// One patient imaging study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: String,
    pub patient_name: String,
    pub patient_id: String,
    pub age: u32,
    pub gender: Gender,
    pub modality: Modality,
    pub body_part: String,
    /// Acquisition date (ISO 8601)
    pub date: String,
    pub status: CaseStatus,
    /// Base image reference (remote URL or local upload reference)
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heatmap_url: Option<String>,
    #[serde(default)]
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub history: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_metrics: Option<TechnicalMetrics>,
}

impl Case {
    /// Look up a finding by id.
    pub fn finding(&self, id: &str) -> Option<&Finding> {
        self.findings.iter().find(|f| f.id == id)
    }

    /// Findings that can be drawn as boxes, with their raw coordinates, in draw order.
    pub fn localized_findings(&self) -> impl DoubleEndedIterator<Item = (&Finding, Coordinates)> {
        self.findings
            .iter()
            .filter_map(|f| f.coordinates.map(|coords| (f, coords)))
    }

    /// Case-insensitive match on patient name or patient id.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.patient_name.to_lowercase().contains(&needle)
            || self.patient_id.to_lowercase().contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Severity, sample_cases};

    #[test]
    fn test_localized_findings_skip_global_ones() {
        let mut case = sample_cases().unwrap().remove(0);
        case.findings.insert(
            0,
            Finding {
                id: "f-global".into(),
                label: "Cardiomegaly".into(),
                confidence: 0.7,
                severity: Severity::Medium,
                coordinates: None,
                explanation: String::new(),
            },
        );

        let ids: Vec<&str> = case.localized_findings().map(|(f, _)| f.id.as_str()).collect();
        assert_eq!(ids, vec!["f1", "f2"]);
        let (topmost, coords) = case.localized_findings().next_back().unwrap();
        assert_eq!(topmost.id, "f2");
        assert_eq!(Some(coords), topmost.coordinates);
    }

    #[test]
    fn test_status_name_matches_json() {
        for status in [CaseStatus::Critical, CaseStatus::Review, CaseStatus::Normal] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.name()));
        }
    }
}
