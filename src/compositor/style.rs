//! Colors and sizes used when composing frames.

use serde::{Deserialize, Serialize};

use crate::constants::{BOX_STROKE_WIDTH, HEATMAP_OPACITY, LABEL_FONT_SIZE, LABEL_OFFSET};

use super::frame::Rgba;

/// Render styling. Sizes are at zoom 1.0; the compositor divides by zoom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    /// Canvas clear color
    pub background: Rgba,
    /// Stroke/label color of unselected boxes
    pub box_color: Rgba,
    /// Stroke/label color of the selected box
    pub selected_color: Rgba,
    pub stroke_width: f32,
    pub label_font_size: f32,
    /// Gap between box top and label baseline (local units)
    pub label_offset: f32,
    /// Heatmap opacity in [0, 1]
    pub heatmap_opacity: f32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background: [0, 0, 0, 255],
            box_color: [0xef, 0x44, 0x44, 255],
            selected_color: [0xff, 0xff, 0x00, 255],
            stroke_width: BOX_STROKE_WIDTH,
            label_font_size: LABEL_FONT_SIZE,
            label_offset: LABEL_OFFSET,
            heatmap_opacity: HEATMAP_OPACITY,
        }
    }
}

impl RenderStyle {
    /// Replace out-of-range values with defaults. Returns the names of fixed fields.
    pub fn sanitize(&mut self) -> Vec<&'static str> {
        let defaults = Self::default();
        let mut fixed = Vec::new();
        if !(0.0..=1.0).contains(&self.heatmap_opacity) {
            self.heatmap_opacity = defaults.heatmap_opacity;
            fixed.push("heatmap_opacity");
        }
        if !(self.stroke_width.is_finite() && self.stroke_width > 0.0) {
            self.stroke_width = defaults.stroke_width;
            fixed.push("stroke_width");
        }
        if !(self.label_font_size.is_finite() && self.label_font_size > 0.0) {
            self.label_font_size = defaults.label_font_size;
            fixed.push("label_font_size");
        }
        if !self.label_offset.is_finite() {
            self.label_offset = defaults.label_offset;
            fixed.push("label_offset");
        }
        fixed
    }
}
