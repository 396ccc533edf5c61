//! Display list produced by the compositor.

use crate::geometry::{Rect, Size};

/// RGBA color, 8 bits per channel.
pub type Rgba = [u8; 4];

/// How an image layer combines with what is already drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Source-over
    #[default]
    Normal,
    /// Lightening blend: `1 - (1 - dst) * (1 - src)`
    Screen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Base,
    Heatmap,
}

/// One drawing operation. Geometry after `SetTransform` is in local space.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole canvas.
    Clear { color: Rgba },
    /// Device = translate + local * scale, until `ResetTransform`.
    SetTransform {
        translate_x: f32,
        translate_y: f32,
        scale: f32,
    },
    ResetTransform,
    /// Set global alpha and blend mode for the following draws.
    SetComposite { alpha: f32, blend: BlendMode },
    DrawImage { layer: LayerKind, dest: Rect },
    /// Unfilled rectangle around a finding.
    StrokeRect {
        finding_id: String,
        rect: Rect,
        color: Rgba,
        line_width: f32,
    },
    FillText {
        text: String,
        x: f32,
        y: f32,
        color: Rgba,
        font_size: f32,
    },
}

/// A drawn box, as seen by tests and hit-testing hosts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxDraw<'a> {
    pub finding_id: &'a str,
    pub rect: Rect,
    pub color: Rgba,
    pub line_width: f32,
}

/// A fully composed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub(super) viewport: Size,
    pub(super) zoom: f32,
    pub(super) commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Boxes in draw order.
    pub fn boxes(&self) -> impl Iterator<Item = BoxDraw<'_>> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::StrokeRect {
                finding_id,
                rect,
                color,
                line_width,
            } => Some(BoxDraw {
                finding_id: finding_id.as_str(),
                rect: *rect,
                color: *color,
                line_width: *line_width,
            }),
            _ => None,
        })
    }

    pub fn draws_layer(&self, layer: LayerKind) -> bool {
        self.commands
            .iter()
            .any(|cmd| matches!(cmd, DrawCommand::DrawImage { layer: l, .. } if *l == layer))
    }
}
