//! Pointer/wheel state machine driving the viewport.
//!
//! ```text
//! Idle --pointer down--> Panning --pointer up / leave--> Idle
//!                          |  pointer move: pan = pointer - drag origin
//! wheel (any state): zoom step, pan untouched
//! ```
//!
//! Every mutation marks the controller dirty; the host takes the flag once the
//! handler has finished so a redraw always sees fully updated state.

use crate::constants::CLICK_SLOP;
use crate::geometry::{Point, ViewGeometry, ZoomStep};
use crate::model::Case;

use super::state::ViewportState;

/// Pointer half of the interaction state machine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum PointerState {
    #[default]
    Idle,
    Panning {
        /// Pointer position minus pan at press time
        drag_origin: Point,
        /// Where the press happened
        press: Point,
        /// Farthest distance from the press seen so far
        travelled: f32,
    },
}

/// What a pointer release turned out to be.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerRelease {
    /// Press and release without meaningful travel
    Click(Point),
    /// End of a drag
    PanEnd,
    /// Release without a matching press
    Ignored,
}

/// Owns the viewport state for the active case.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: ViewportState,
    pointer: PointerState,
    case_id: Option<String>,
    needs_redraw: bool,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.pointer, PointerState::Panning { .. })
    }

    pub fn case_id(&self) -> Option<&str> {
        self.case_id.as_deref()
    }

    /// Start a viewing session for another case. Nothing carries over.
    pub fn open_case(&mut self, case_id: &str) {
        log::debug!("Viewport: opening case '{}'", case_id);
        self.state = ViewportState::default();
        self.pointer = PointerState::Idle;
        self.case_id = Some(case_id.to_string());
        self.needs_redraw = true;
    }

    pub fn close_case(&mut self) {
        self.state = ViewportState::default();
        self.pointer = PointerState::Idle;
        self.case_id = None;
        self.needs_redraw = true;
    }

    pub fn pointer_down(&mut self, pos: Point) {
        let (pan_x, pan_y) = self.state.pan();
        self.pointer = PointerState::Panning {
            drag_origin: Point::new(pos.x - pan_x, pos.y - pan_y),
            press: pos,
            travelled: 0.0,
        };
    }

    /// Returns true if the pan changed.
    pub fn pointer_move(&mut self, pos: Point) -> bool {
        let PointerState::Panning {
            drag_origin,
            press,
            travelled,
        } = self.pointer
        else {
            return false;
        };

        self.pointer = PointerState::Panning {
            drag_origin,
            press,
            travelled: travelled.max(press.distance_to(pos)),
        };
        self.state.set_pan(pos.x - drag_origin.x, pos.y - drag_origin.y);
        self.needs_redraw = true;
        true
    }

    pub fn pointer_up(&mut self, pos: Point) -> PointerRelease {
        let released = std::mem::take(&mut self.pointer);
        match released {
            PointerState::Idle => PointerRelease::Ignored,
            PointerState::Panning {
                press, travelled, ..
            } => {
                if travelled.max(press.distance_to(pos)) < CLICK_SLOP {
                    PointerRelease::Click(pos)
                } else {
                    PointerRelease::PanEnd
                }
            }
        }
    }

    /// Leaving the canvas ends a drag; it never counts as a click.
    pub fn pointer_leave(&mut self) {
        self.pointer = PointerState::Idle;
    }

    /// Wheel zoom. A zero delta does nothing.
    pub fn wheel(&mut self, delta_y: f32) -> bool {
        match ZoomStep::from_wheel(delta_y) {
            Some(step) => self.zoom(step),
            None => false,
        }
    }

    /// One zoom step, clamped. Returns true if zoom changed.
    pub fn zoom(&mut self, step: ZoomStep) -> bool {
        let before = self.state.zoom();
        self.state.zoom_step(step);
        let changed = self.state.zoom() != before;
        self.needs_redraw |= changed;
        changed
    }

    pub fn reset_view(&mut self) {
        self.state.reset_view();
        self.needs_redraw = true;
    }

    pub fn toggle_heatmap(&mut self) {
        self.state.toggle_heatmap();
        self.needs_redraw = true;
    }

    pub fn toggle_boxes(&mut self) {
        self.state.toggle_boxes();
        self.needs_redraw = true;
    }

    /// Toggle selection of a finding (from the canvas or the findings list).
    pub fn toggle_selection(&mut self, finding_id: &str) -> Option<&str> {
        self.state.toggle_selection(finding_id);
        self.needs_redraw = true;
        self.state.selected()
    }

    /// Topmost visible box under a device-space point.
    ///
    /// Boxes are drawn in finding order, so the last hit wins. Hidden boxes
    /// cannot be picked.
    pub fn pick_finding<'a>(
        &self,
        case: &'a Case,
        geometry: &ViewGeometry,
        pos: Point,
    ) -> Option<&'a str> {
        if !self.state.show_boxes() {
            return None;
        }
        case.localized_findings()
            .rev()
            .find(|(_, coords)| geometry.percent_to_device(&coords.clamped()).contains(pos))
            .map(|(f, _)| f.id.as_str())
    }

    /// Mark state as changed outside of pointer handling (resize, image load).
    pub fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Consume the pending redraw flag.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }
}
