//! Per-session viewport state.

use crate::geometry::{Transform, ZoomStep};

/// Zoom, pan, overlay toggles and the selected finding.
///
/// Created per viewing session and reset whenever another case is opened.
/// Only the interaction controller mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportState {
    transform: Transform,
    show_heatmap: bool,
    show_boxes: bool,
    selected: Option<String>,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            transform: Transform::identity(),
            show_heatmap: true,
            show_boxes: true,
            selected: None,
        }
    }
}

impl ViewportState {
    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn zoom(&self) -> f32 {
        self.transform.zoom
    }

    pub fn pan(&self) -> (f32, f32) {
        (self.transform.pan_x, self.transform.pan_y)
    }

    pub fn show_heatmap(&self) -> bool {
        self.show_heatmap
    }

    pub fn show_boxes(&self) -> bool {
        self.show_boxes
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_selected(&self, finding_id: &str) -> bool {
        self.selected.as_deref() == Some(finding_id)
    }

    pub(crate) fn set_pan(&mut self, x: f32, y: f32) {
        self.transform = self.transform.with_pan(x, y);
    }

    pub(crate) fn zoom_step(&mut self, step: ZoomStep) {
        self.transform = self.transform.zoom_step(step);
    }

    /// Zoom 1.0 and pan (0, 0) in one assignment.
    pub(crate) fn reset_view(&mut self) {
        self.transform = Transform::identity();
    }

    pub(crate) fn toggle_heatmap(&mut self) {
        self.show_heatmap = !self.show_heatmap;
    }

    pub(crate) fn toggle_boxes(&mut self) {
        self.show_boxes = !self.show_boxes;
    }

    /// Select `finding_id`, or clear the selection if it is already selected.
    pub(crate) fn toggle_selection(&mut self, finding_id: &str) {
        if self.is_selected(finding_id) {
            self.selected = None;
        } else {
            self.selected = Some(finding_id.to_string());
        }
    }
}
