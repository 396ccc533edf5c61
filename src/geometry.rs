//! Viewport geometry: zoom/pan transform and coordinate mapping.
//!
//! Three coordinate spaces are involved when a case is displayed:
//! - **image space**: intrinsic pixels of the base image,
//! - **percent space**: resolution independent annotation coordinates (0..100 per axis),
//! - **device space**: canvas pixels after pan and zoom.
//!
//! The image is first fitted into the canvas ("local" space, centered on the
//! origin), then translated to the canvas center plus pan and scaled by zoom.
//! Everything here is pure math so the compositor and the interaction
//! controller agree on where things are.

use crate::constants::{
    DEFAULT_ZOOM, FIT_FRACTION, MAX_ZOOM, MIN_ZOOM, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR,
};
use crate::model::Coordinates;

/// Errors reported by the geometry engine instead of dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    /// The image has no usable intrinsic dimensions yet.
    #[error("image not ready: intrinsic dimensions unavailable")]
    ImageNotReady,
    /// The canvas has zero area.
    #[error("viewport has zero area")]
    EmptyViewport,
}

/// Clamp a zoom value into the allowed range.
///
/// NaN falls back to the default zoom so the result is always inside the bounds.
pub fn clamp_zoom(zoom: f32) -> f32 {
    if zoom.is_nan() {
        return DEFAULT_ZOOM;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Width and height.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when both sides are finite and strictly positive.
    pub fn has_area(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// An axis-aligned rectangle defined by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if a point is inside the rectangle (edges inclusive).
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Which way a zoom gesture goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomStep {
    In,
    Out,
}

impl ZoomStep {
    /// Map a wheel delta to a step. Positive deltas (scrolling down) zoom out.
    pub fn from_wheel(delta_y: f32) -> Option<Self> {
        if delta_y > 0.0 {
            Some(ZoomStep::Out)
        } else if delta_y < 0.0 {
            Some(ZoomStep::In)
        } else {
            None
        }
    }

    pub fn factor(self) -> f32 {
        match self {
            ZoomStep::In => ZOOM_IN_FACTOR,
            ZoomStep::Out => ZOOM_OUT_FACTOR,
        }
    }
}

/// Represents pan/zoom transform state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub zoom: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl Transform {
    /// Create a new transform with the given zoom and pan. Zoom is clamped.
    pub fn new(zoom: f32, pan_x: f32, pan_y: f32) -> Self {
        Self {
            zoom: clamp_zoom(zoom),
            pan_x,
            pan_y,
        }
    }

    /// Create an identity transform (zoom=1, no pan).
    pub fn identity() -> Self {
        Self::new(DEFAULT_ZOOM, 0.0, 0.0)
    }

    /// Return a transform with the pan offset replaced.
    pub fn with_pan(&self, pan_x: f32, pan_y: f32) -> Transform {
        Transform {
            zoom: self.zoom,
            pan_x,
            pan_y,
        }
    }

    /// Apply a pan delta to the transform.
    pub fn pan_by(&self, dx: f32, dy: f32) -> Transform {
        self.with_pan(self.pan_x + dx, self.pan_y + dy)
    }

    /// Multiply zoom by the step factor, re-applying the clamp after every step.
    pub fn zoom_step(&self, step: ZoomStep) -> Transform {
        Transform {
            zoom: clamp_zoom(self.zoom * step.factor()),
            pan_x: self.pan_x,
            pan_y: self.pan_y,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Fit an image into the canvas, preserving aspect ratio.
///
/// The result is in local space: centered on the origin, before pan and zoom.
/// The constrained side uses `FIT_FRACTION` of the canvas.
pub fn fit_rect(image: Size, viewport: Size) -> Result<Rect, GeometryError> {
    if !image.has_area() {
        return Err(GeometryError::ImageNotReady);
    }
    if !viewport.has_area() {
        return Err(GeometryError::EmptyViewport);
    }

    let image_aspect = image.width / image.height;
    let viewport_aspect = viewport.width / viewport.height;

    let (width, height) = if image_aspect > viewport_aspect {
        let width = viewport.width * FIT_FRACTION;
        (width, width / image_aspect)
    } else {
        let height = viewport.height * FIT_FRACTION;
        (height * image_aspect, height)
    };

    Ok(Rect::new(-width / 2.0, -height / 2.0, width, height))
}

/// Resolved geometry for one frame: fitted image rectangle plus transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewGeometry {
    viewport: Size,
    transform: Transform,
    local: Rect,
}

impl ViewGeometry {
    pub fn new(image: Size, viewport: Size, transform: Transform) -> Result<Self, GeometryError> {
        let local = fit_rect(image, viewport)?;
        Ok(Self {
            viewport,
            transform,
            local,
        })
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// The fitted image rectangle in local (pre-zoom) space.
    pub fn local_image_rect(&self) -> Rect {
        self.local
    }

    /// Device-space position of the local origin.
    pub fn origin(&self) -> Point {
        Point::new(
            self.viewport.width / 2.0 + self.transform.pan_x,
            self.viewport.height / 2.0 + self.transform.pan_y,
        )
    }

    pub fn local_to_device(&self, p: Point) -> Point {
        let origin = self.origin();
        Point::new(
            origin.x + p.x * self.transform.zoom,
            origin.y + p.y * self.transform.zoom,
        )
    }

    pub fn device_to_local(&self, p: Point) -> Point {
        let origin = self.origin();
        Point::new(
            (p.x - origin.x) / self.transform.zoom,
            (p.y - origin.y) / self.transform.zoom,
        )
    }

    /// The drawn image rectangle in device space.
    pub fn image_rect(&self) -> Rect {
        self.local_rect_to_device(self.local)
    }

    pub fn local_rect_to_device(&self, r: Rect) -> Rect {
        let top_left = self.local_to_device(Point::new(r.x, r.y));
        Rect::new(
            top_left.x,
            top_left.y,
            r.width * self.transform.zoom,
            r.height * self.transform.zoom,
        )
    }

    /// Percent-space box to local space, using the fitted image as reference frame.
    pub fn percent_to_local(&self, c: &Coordinates) -> Rect {
        Rect::new(
            self.local.x + c.x / 100.0 * self.local.width,
            self.local.y + c.y / 100.0 * self.local.height,
            c.width / 100.0 * self.local.width,
            c.height / 100.0 * self.local.height,
        )
    }

    pub fn percent_to_device(&self, c: &Coordinates) -> Rect {
        self.local_rect_to_device(self.percent_to_local(c))
    }

    /// Device-space point to percent space (may fall outside 0..100).
    pub fn device_to_percent(&self, p: Point) -> Point {
        let local = self.device_to_local(p);
        Point::new(
            (local.x - self.local.x) / self.local.width * 100.0,
            (local.y - self.local.y) / self.local.height * 100.0,
        )
    }

    /// Inverse of [`percent_to_device`](Self::percent_to_device).
    pub fn device_to_percent_rect(&self, r: Rect) -> Coordinates {
        let top_left = self.device_to_percent(Point::new(r.x, r.y));
        let scale = self.transform.zoom;
        Coordinates {
            x: top_left.x,
            y: top_left.y,
            width: r.width / scale / self.local.width * 100.0,
            height: r.height / scale / self.local.height * 100.0,
        }
    }
}
