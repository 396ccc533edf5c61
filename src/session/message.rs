//! Input events and outgoing requests of a viewing session.

use crate::geometry::{Point, Size};

/// Events delivered to the session by the host, one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerMessage {
    // Pointer (device pixels, relative to the canvas)
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
    /// Pointer left the canvas; ends a drag
    PointerLeave,
    /// Wheel delta; positive zooms out, negative zooms in
    Wheel(f32),

    // Toolbar
    ZoomIn,
    ZoomOut,
    ResetView,
    ToggleHeatmap,
    ToggleBoxes,

    /// Finding chosen from the findings list (toggles)
    SelectFinding(String),

    /// Canvas size changed
    Resized(Size),
}

/// Requests the session makes of the routing layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Show the viewer for a case
    OpenViewer(String),
}
