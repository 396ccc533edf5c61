//! Software rasterizer for composed frames.
//!
//! Replays a [`Frame`] into an RGBA buffer with nearest-neighbour sampling.
//! Text commands are skipped; labels are left to the host's font stack.

use image::{Rgba as Pixel, RgbaImage};

use crate::geometry::Rect;

use super::frame::{BlendMode, DrawCommand, Frame, LayerKind, Rgba};

#[derive(Debug, Clone, Copy)]
struct DeviceTransform {
    translate_x: f32,
    translate_y: f32,
    scale: f32,
}

impl DeviceTransform {
    const IDENTITY: DeviceTransform = DeviceTransform {
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
    };

    fn apply(&self, r: Rect) -> Rect {
        Rect::new(
            self.translate_x + r.x * self.scale,
            self.translate_y + r.y * self.scale,
            r.width * self.scale,
            r.height * self.scale,
        )
    }
}

/// Rasterize `frame` using the decoded layer images.
pub fn rasterize(frame: &Frame, base: &RgbaImage, heatmap: Option<&RgbaImage>) -> RgbaImage {
    let viewport = frame.viewport();
    let width = viewport.width.round().max(1.0) as u32;
    let height = viewport.height.round().max(1.0) as u32;
    let mut canvas = RgbaImage::new(width, height);

    let mut transform = DeviceTransform::IDENTITY;
    let mut alpha = 1.0_f32;
    let mut blend = BlendMode::Normal;

    for command in frame.commands() {
        match command {
            DrawCommand::Clear { color } => {
                for pixel in canvas.pixels_mut() {
                    *pixel = Pixel(*color);
                }
            }
            DrawCommand::SetTransform {
                translate_x,
                translate_y,
                scale,
            } => {
                transform = DeviceTransform {
                    translate_x: *translate_x,
                    translate_y: *translate_y,
                    scale: *scale,
                };
            }
            DrawCommand::ResetTransform => transform = DeviceTransform::IDENTITY,
            DrawCommand::SetComposite {
                alpha: a,
                blend: b,
            } => {
                alpha = *a;
                blend = *b;
            }
            DrawCommand::DrawImage { layer, dest } => {
                let source = match layer {
                    LayerKind::Base => Some(base),
                    LayerKind::Heatmap => heatmap,
                };
                if let Some(source) = source {
                    draw_image(&mut canvas, source, transform.apply(*dest), alpha, blend);
                }
            }
            DrawCommand::StrokeRect {
                rect,
                color,
                line_width,
                ..
            } => {
                let device_width = line_width * transform.scale;
                stroke_rect(&mut canvas, transform.apply(*rect), device_width, *color, alpha);
            }
            DrawCommand::FillText { .. } => {}
        }
    }

    canvas
}

/// Pixel index range covered by `[start, end)` in device space, clipped to `limit`.
fn span(start: f32, end: f32, limit: u32) -> std::ops::Range<u32> {
    let lo = start.floor().max(0.0) as u32;
    let hi = end.ceil().clamp(0.0, limit as f32) as u32;
    lo.min(hi)..hi
}

fn draw_image(canvas: &mut RgbaImage, source: &RgbaImage, dest: Rect, alpha: f32, blend: BlendMode) {
    if dest.width <= 0.0 || dest.height <= 0.0 || source.width() == 0 || source.height() == 0 {
        return;
    }
    let (cw, ch) = canvas.dimensions();
    for py in span(dest.y, dest.y + dest.height, ch) {
        let v = (py as f32 + 0.5 - dest.y) / dest.height;
        if !(0.0..1.0).contains(&v) {
            continue;
        }
        let sy = ((v * source.height() as f32) as u32).min(source.height() - 1);
        for px in span(dest.x, dest.x + dest.width, cw) {
            let u = (px as f32 + 0.5 - dest.x) / dest.width;
            if !(0.0..1.0).contains(&u) {
                continue;
            }
            let sx = ((u * source.width() as f32) as u32).min(source.width() - 1);
            let src = source.get_pixel(sx, sy).0;
            blend_pixel(canvas.get_pixel_mut(px, py), src, alpha, blend);
        }
    }
}

fn stroke_rect(canvas: &mut RgbaImage, rect: Rect, line_width: f32, color: Rgba, alpha: f32) {
    let half = (line_width / 2.0).max(0.5);
    let outer = Rect::new(
        rect.x - half,
        rect.y - half,
        rect.width + 2.0 * half,
        rect.height + 2.0 * half,
    );
    let inner = Rect::new(
        rect.x + half,
        rect.y + half,
        rect.width - 2.0 * half,
        rect.height - 2.0 * half,
    );

    let (cw, ch) = canvas.dimensions();
    for py in span(outer.y, outer.y + outer.height, ch) {
        let cy = py as f32 + 0.5;
        for px in span(outer.x, outer.x + outer.width, cw) {
            let cx = px as f32 + 0.5;
            let in_inner = inner.width > 0.0
                && inner.height > 0.0
                && cx > inner.x
                && cx < inner.x + inner.width
                && cy > inner.y
                && cy < inner.y + inner.height;
            if !in_inner {
                blend_pixel(canvas.get_pixel_mut(px, py), color, alpha, BlendMode::Normal);
            }
        }
    }
}

fn blend_pixel(dst: &mut Pixel<u8>, src: Rgba, alpha: f32, blend: BlendMode) {
    let a = alpha.clamp(0.0, 1.0) * src[3] as f32 / 255.0;
    if a <= 0.0 {
        return;
    }
    for c in 0..3 {
        let d = dst.0[c] as f32 / 255.0;
        let s = src[c] as f32 / 255.0;
        let mixed = match blend {
            BlendMode::Normal => s,
            BlendMode::Screen => 1.0 - (1.0 - d) * (1.0 - s),
        };
        let out = d * (1.0 - a) + mixed * a;
        dst.0[c] = (out * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    let da = dst.0[3] as f32 / 255.0;
    dst.0[3] = ((a + da * (1.0 - a)) * 255.0).round().clamp(0.0, 255.0) as u8;
}
