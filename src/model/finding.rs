//! AI findings and their percentage-based locations.

use serde::{Deserialize, Serialize};

use crate::constants::HIGH_CONFIDENCE;

/// Severity assigned to a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Why a coordinate box is out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateIssue {
    /// A value is NaN or infinite.
    NotFinite,
    /// A value is below zero.
    Negative,
    /// The box extends past 100% on some axis.
    Overflow,
}

/// Box in percent space: all values are percentages of the drawn image (0..100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Coordinates {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check the box against the 0..100 range. Touching 100 is legal.
    pub fn validate(&self) -> Result<(), CoordinateIssue> {
        let values = [self.x, self.y, self.width, self.height];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(CoordinateIssue::NotFinite);
        }
        if values.iter().any(|v| *v < 0.0) {
            return Err(CoordinateIssue::Negative);
        }
        if self.x + self.width > 100.0 || self.y + self.height > 100.0 {
            return Err(CoordinateIssue::Overflow);
        }
        Ok(())
    }

    /// Intersect the box with the image (0..100 on both axes).
    /// Non-finite values collapse to zero; a box fully outside ends up empty.
    pub fn clamped(&self) -> Coordinates {
        fn finite(v: f32) -> f32 {
            if v.is_finite() { v } else { 0.0 }
        }
        fn span(start: f32, extent: f32) -> (f32, f32) {
            let (start, extent) = (finite(start), finite(extent));
            let lo = start.clamp(0.0, 100.0);
            let hi = (start + extent).clamp(0.0, 100.0);
            (lo, (hi - lo).max(0.0))
        }
        let (x, width) = span(self.x, self.width);
        let (y, height) = span(self.y, self.height);
        Coordinates {
            x,
            y,
            width,
            height,
        }
    }
}

/// One AI-detected abnormality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    pub label: String,
    /// Model confidence, nominally in [0, 1]
    pub confidence: f32,
    pub severity: Severity,
    /// Absent when the finding cannot be localized; such findings are never drawn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    pub explanation: String,
}

impl Finding {
    /// Confidence clamped to [0, 1]. NaN reads as 0.
    pub fn confidence(&self) -> f32 {
        if self.confidence.is_nan() {
            0.0
        } else {
            self.confidence.clamp(0.0, 1.0)
        }
    }

    /// Confidence as a whole percentage, rounded half away from zero.
    pub fn confidence_percent(&self) -> u32 {
        (self.confidence() * 100.0).round() as u32
    }

    /// Whether the list entry should use high-confidence emphasis.
    pub fn is_high_confidence(&self) -> bool {
        self.confidence() > HIGH_CONFIDENCE
    }

    /// Label drawn next to the box, e.g. `Pneumonia (98%)`.
    pub fn display_label(&self) -> String {
        format!("{} ({}%)", self.label, self.confidence_percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(confidence: f32) -> Finding {
        Finding {
            id: "f".to_string(),
            label: "Nodule".to_string(),
            confidence,
            severity: Severity::Low,
            coordinates: None,
            explanation: String::new(),
        }
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(finding(1.7).confidence(), 1.0);
        assert_eq!(finding(-0.2).confidence(), 0.0);
        assert_eq!(finding(f32::NAN).confidence(), 0.0);
        assert_eq!(finding(0.85).confidence_percent(), 85);
        assert_eq!(finding(1.7).confidence_percent(), 100);
    }

    #[test]
    fn test_display_label() {
        assert_eq!(finding(0.654).display_label(), "Nodule (65%)");
        assert!(finding(0.98).is_high_confidence());
        assert!(!finding(0.9).is_high_confidence());
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(Coordinates::new(30.0, 40.0, 25.0, 30.0).validate().is_ok());
        assert!(Coordinates::new(0.0, 0.0, 100.0, 100.0).validate().is_ok());
        assert_eq!(
            Coordinates::new(90.0, 0.0, 20.0, 10.0).validate(),
            Err(CoordinateIssue::Overflow)
        );
        assert_eq!(
            Coordinates::new(-1.0, 0.0, 20.0, 10.0).validate(),
            Err(CoordinateIssue::Negative)
        );
        assert_eq!(
            Coordinates::new(f32::NAN, 0.0, 20.0, 10.0).validate(),
            Err(CoordinateIssue::NotFinite)
        );
    }

    #[test]
    fn test_clamped_stays_inside_image() {
        let c = Coordinates::new(90.0, -5.0, 30.0, 200.0).clamped();
        assert_eq!(c, Coordinates::new(90.0, 0.0, 10.0, 100.0));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_clamped_cuts_off_instead_of_shifting() {
        // Right edge stays at 20 when the origin is left of the image
        let c = Coordinates::new(-10.0, 0.0, 30.0, 10.0).clamped();
        assert_eq!(c, Coordinates::new(0.0, 0.0, 20.0, 10.0));

        let c = Coordinates::new(40.0, -25.0, 10.0, 50.0).clamped();
        assert_eq!(c, Coordinates::new(40.0, 0.0, 10.0, 25.0));

        // Entirely off-image boxes become empty
        let c = Coordinates::new(-50.0, 110.0, 20.0, 5.0).clamped();
        assert_eq!(c.width, 0.0);
        assert_eq!(c.height, 0.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_missing_coordinates_deserialize_as_none() {
        let json = r#"{"id":"f9","label":"Edema","confidence":0.4,"severity":"medium","explanation":"diffuse"}"#;
        let f: Finding = serde_json::from_str(json).unwrap();
        assert_eq!(f.coordinates, None);
        assert_eq!(f.severity, Severity::Medium);
    }
}
