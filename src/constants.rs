//! Global constants for the MedView viewer

/// Lower zoom bound
pub const MIN_ZOOM: f32 = 0.5;

/// Upper zoom bound
pub const MAX_ZOOM: f32 = 5.0;

/// Zoom applied when a session starts or the view is reset
pub const DEFAULT_ZOOM: f32 = 1.0;

/// Multiplier for one zoom-in step (wheel up or toolbar button)
pub const ZOOM_IN_FACTOR: f32 = 1.1;

/// Multiplier for one zoom-out step (wheel down or toolbar button)
pub const ZOOM_OUT_FACTOR: f32 = 0.9;

/// Fraction of the constrained canvas side the fitted image occupies
pub const FIT_FRACTION: f32 = 0.9;

/// Pointer travel (device pixels) below which a press/release counts as a click
pub const CLICK_SLOP: f32 = 3.0;

/// Heatmap opacity when composited over the base image
pub const HEATMAP_OPACITY: f32 = 0.4;

/// Box stroke width at zoom 1.0 (device pixels)
pub const BOX_STROKE_WIDTH: f32 = 2.0;

/// Label font size at zoom 1.0 (device pixels)
pub const LABEL_FONT_SIZE: f32 = 12.0;

/// Gap between a box's top edge and its label baseline at zoom 1.0
pub const LABEL_OFFSET: f32 = 5.0;

/// Interval between ingestion stage advances
pub const INGEST_TICK_MS: u64 = 800;

/// Confidence above which a finding gets high-confidence emphasis
pub const HIGH_CONFIDENCE: f32 = 0.9;
