//! Builds the case record for a finished upload.

use web_time::{SystemTime, UNIX_EPOCH};

use crate::error::ViewerError;
use crate::model::{
    Case, CaseStatus, Coordinates, Exposure, Finding, Gender, Modality, Severity, TechnicalMetrics,
};

use super::pipeline::JobId;
use super::validation::UploadFile;

/// Local reference under which an upload's bytes are registered.
pub fn upload_url(case_id: &str, file_name: &str) -> String {
    format!("local://uploads/{case_id}/{file_name}")
}

/// Produces the case for a completed ingestion job.
pub trait CaseFactory {
    fn build(&mut self, upload: &UploadFile, job: JobId) -> Result<Case, ViewerError>;
}

/// Synthesizes placeholder patient data and a fixed pair of findings.
///
/// Uploaded cases always start in `review`; nothing here classifies them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoCaseFactory;

impl DemoCaseFactory {
    fn findings(stamp: u128) -> Vec<Finding> {
        vec![
            Finding {
                id: format!("f-new-{stamp}-1"),
                label: "Infiltration".to_string(),
                confidence: 0.89,
                severity: Severity::Medium,
                coordinates: Some(Coordinates::new(35.0, 45.0, 25.0, 20.0)),
                explanation: "Patchy opacities identified in the mid-lung zone, suggestive of \
                              interstitial infiltration. Correlation with clinical symptoms \
                              (fever, cough) recommended."
                    .to_string(),
            },
            Finding {
                id: format!("f-new-{stamp}-2"),
                label: "Nodule".to_string(),
                confidence: 0.65,
                severity: Severity::Low,
                coordinates: Some(Coordinates::new(65.0, 30.0, 10.0, 10.0)),
                explanation: "Small, well-defined nodular density observed in the upper lobe. \
                              Low confidence suggests potential calcified granuloma or artifact."
                    .to_string(),
            },
        ]
    }
}

impl CaseFactory for DemoCaseFactory {
    fn build(&mut self, upload: &UploadFile, job: JobId) -> Result<Case, ViewerError> {
        let now = SystemTime::now();
        let stamp = now
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ViewerError::Ingestion(format!("system clock before epoch: {e}")))?
            .as_millis();
        let id = format!("new-{stamp}-{}", job.0);

        Ok(Case {
            image_url: upload_url(&id, &upload.name),
            patient_name: "Anonymous Patient".to_string(),
            patient_id: format!("TMP-{}", (stamp + u128::from(job.0)) % 10_000),
            age: 45,
            gender: Gender::Other,
            modality: Modality::UploadedImage,
            body_part: "Chest (Auto-detected)".to_string(),
            date: iso_timestamp(now),
            status: CaseStatus::Review,
            heatmap_url: None,
            findings: Self::findings(stamp),
            history: vec!["No previous records found.".to_string()],
            technical_metrics: Some(TechnicalMetrics {
                exposure: Exposure::Normal,
                sharpness: 92,
                contrast: 88,
                snr: 45.2,
                artifacts_detected: false,
            }),
            id,
        })
    }
}

/// Format a time as ISO 8601 UTC (`YYYY-MM-DDTHH:MM:SSZ`).
pub fn iso_timestamp(time: SystemTime) -> String {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let (year, month, day) = civil_from_days((secs / 86_400) as i64);
    let rem = secs % 86_400;
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}Z",
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60
    )
}

/// Days since 1970-01-01 to a proleptic Gregorian date.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
