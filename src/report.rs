//! Plain-text preliminary report for a case.

use std::fmt::Write;

use crate::model::Case;

const IMPRESSION_ABNORMAL: &str =
    "Abnormalities detected as detailed above. Clinical correlation recommended.";
const IMPRESSION_NORMAL: &str = "No acute cardiopulmonary process.";

/// Render the report text for `case`.
///
/// Output depends only on the case: one line per finding in stored order,
/// confidence as a rounded whole percent.
pub fn generate_report(case: &Case) -> String {
    let mut findings = String::new();
    for (i, finding) in case.findings.iter().enumerate() {
        if i > 0 {
            findings.push('\n');
        }
        // Writing into a String cannot fail
        let _ = write!(
            findings,
            "- {} ({}% confidence): {}",
            finding.label,
            finding.confidence_percent(),
            finding.explanation
        );
    }

    let impression = if case.findings.is_empty() {
        IMPRESSION_NORMAL
    } else {
        IMPRESSION_ABNORMAL
    };

    format!(
        "RADIOLOGY REPORT\n\n\
         PATIENT: {} ({})\n\
         DATE: {}\n\
         MODALITY: {} - {}\n\n\
         FINDINGS:\n{}\n\n\
         IMPRESSION:\n{}\n\n\
         AI ASSISTED PRELIMINARY REPORT",
        case.patient_name,
        case.patient_id,
        case.date,
        case.modality.name(),
        case.body_part,
        findings,
        impression
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sample_cases;

    #[test]
    fn test_report_lists_findings_in_order() {
        let case = sample_cases().unwrap().remove(0);
        let report = generate_report(&case);

        assert!(report.starts_with("RADIOLOGY REPORT\n\nPATIENT: "));
        let pneumonia = report.find("- Pneumonia (98% confidence): ").unwrap();
        let effusion = report.find("- Pleural Effusion (85% confidence): ").unwrap();
        assert!(pneumonia < effusion);
        assert!(report.contains(IMPRESSION_ABNORMAL));
        assert!(report.ends_with("\n\nAI ASSISTED PRELIMINARY REPORT"));
    }

    #[test]
    fn test_report_without_findings() {
        let case = sample_cases().unwrap().remove(2);
        assert!(case.findings.is_empty());
        let report = generate_report(&case);
        assert!(report.contains("FINDINGS:\n\n\nIMPRESSION:\nNo acute cardiopulmonary process."));
    }

    #[test]
    fn test_report_header() {
        let case = sample_cases().unwrap().remove(1);
        let report = generate_report(&case);
        let header = format!(
            "PATIENT: {} ({})\nDATE: {}\nMODALITY: {} - {}\n",
            case.patient_name,
            case.patient_id,
            case.date,
            case.modality.name(),
            case.body_part
        );
        assert!(report.contains(&header));
    }
}
