//! Pure frame composition.

use thiserror::Error;

use crate::error::ViewerError;
use crate::geometry::{GeometryError, Size, ViewGeometry};
use crate::model::Case;
use crate::viewport::{AssetState, ViewportState};

use super::frame::{BlendMode, DrawCommand, Frame, LayerKind};
use super::style::RenderStyle;

/// Why no frame was produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComposeError {
    /// Base image still loading (or no load started)
    #[error("base image not loaded yet")]
    BaseNotLoaded,
    /// Base image load failed; the host shows an error instead of a canvas
    #[error("base image failed to load: {0}")]
    BaseLoadFailed(ViewerError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Everything a frame depends on.
#[derive(Debug, Clone, Copy)]
pub struct ComposeInput<'a> {
    pub case: &'a Case,
    pub state: &'a ViewportState,
    /// Canvas size in device pixels
    pub viewport: Size,
    pub base: &'a AssetState,
    pub heatmap: &'a AssetState,
}

/// Compose a full frame: clear, base image, heatmap, boxes (back to front).
///
/// Always a full redraw; nothing is patched incrementally.
pub fn compose(input: &ComposeInput<'_>, style: &RenderStyle) -> Result<Frame, ComposeError> {
    let base_size = match input.base {
        AssetState::Loaded(_) => input.base.size().ok_or(ComposeError::BaseNotLoaded)?,
        AssetState::Failed(error) => return Err(ComposeError::BaseLoadFailed(error.clone())),
        AssetState::Absent | AssetState::Loading => return Err(ComposeError::BaseNotLoaded),
    };

    let geometry = ViewGeometry::new(base_size, input.viewport, input.state.transform())?;
    let zoom = input.state.zoom();
    let origin = geometry.origin();
    let image_rect = geometry.local_image_rect();

    let mut commands = vec![
        DrawCommand::Clear {
            color: style.background,
        },
        DrawCommand::SetTransform {
            translate_x: origin.x,
            translate_y: origin.y,
            scale: zoom,
        },
        DrawCommand::DrawImage {
            layer: LayerKind::Base,
            dest: image_rect,
        },
    ];

    // A missing or failed heatmap is logged once when its load completes
    if input.state.show_heatmap()
        && input.case.heatmap_url.is_some()
        && input.heatmap.size().is_some_and(|s| s.has_area())
    {
        commands.push(DrawCommand::SetComposite {
            alpha: style.heatmap_opacity,
            blend: BlendMode::Screen,
        });
        commands.push(DrawCommand::DrawImage {
            layer: LayerKind::Heatmap,
            dest: image_rect,
        });
        commands.push(DrawCommand::SetComposite {
            alpha: 1.0,
            blend: BlendMode::Normal,
        });
    }

    if input.state.show_boxes() {
        let line_width = style.stroke_width / zoom;
        let font_size = style.label_font_size / zoom;

        for (finding, coords) in input.case.localized_findings() {
            if let Err(issue) = coords.validate() {
                log::debug!(
                    "Finding '{}' has out-of-range coordinates ({:?}), clamping",
                    finding.id,
                    issue
                );
            }
            let rect = geometry.percent_to_local(&coords.clamped());
            let color = if input.state.is_selected(&finding.id) {
                style.selected_color
            } else {
                style.box_color
            };

            commands.push(DrawCommand::StrokeRect {
                finding_id: finding.id.clone(),
                rect,
                color,
                line_width,
            });
            commands.push(DrawCommand::FillText {
                text: finding.display_label(),
                x: rect.x,
                y: rect.y - style.label_offset,
                color,
                font_size,
            });
        }
    }

    commands.push(DrawCommand::ResetTransform);

    Ok(Frame {
        viewport: input.viewport,
        zoom,
        commands,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ZoomStep;
    use crate::model::{Coordinates, Finding, Severity, sample_cases};
    use image::RgbaImage;

    fn loaded(w: u32, h: u32) -> AssetState {
        AssetState::Loaded(RgbaImage::new(w, h))
    }

    fn three_findings_case() -> Case {
        let mut case = sample_cases().unwrap().remove(0);
        case.findings.push(Finding {
            id: "f9".into(),
            label: "Cardiomegaly".into(),
            confidence: 0.55,
            severity: Severity::Low,
            coordinates: None,
            explanation: "Global finding without location.".into(),
        });
        case
    }

    fn frame_for(case: &Case, state: &ViewportState, heatmap: &AssetState) -> Frame {
        let base = loaded(800, 600);
        compose(
            &ComposeInput {
                case,
                state,
                viewport: Size::new(1000.0, 800.0),
                base: &base,
                heatmap,
            },
            &RenderStyle::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_unlocalized_finding_never_drawn() {
        let case = three_findings_case();
        let heatmap = loaded(800, 600);
        for (heat, boxes) in [(true, true), (false, true), (true, false), (false, false)] {
            let mut state = ViewportState::default();
            if !heat {
                state.toggle_heatmap();
            }
            if !boxes {
                state.toggle_boxes();
            }
            let frame = frame_for(&case, &state, &heatmap);
            let ids: Vec<&str> = frame.boxes().map(|b| b.finding_id).collect();
            assert!(!ids.contains(&"f9"));
            assert_eq!(ids.len(), if boxes { 2 } else { 0 });
        }
    }

    #[test]
    fn test_draw_order_and_blend_restore() {
        let case = sample_cases().unwrap().remove(0);
        let heatmap = loaded(800, 600);
        let frame = frame_for(&case, &ViewportState::default(), &heatmap);
        let cmds = frame.commands();

        assert!(matches!(cmds[0], DrawCommand::Clear { .. }));
        assert!(matches!(cmds[2], DrawCommand::DrawImage { layer: LayerKind::Base, .. }));
        assert_eq!(
            cmds[3],
            DrawCommand::SetComposite {
                alpha: 0.4,
                blend: BlendMode::Screen
            }
        );
        assert!(matches!(cmds[4], DrawCommand::DrawImage { layer: LayerKind::Heatmap, .. }));
        assert_eq!(
            cmds[5],
            DrawCommand::SetComposite {
                alpha: 1.0,
                blend: BlendMode::Normal
            }
        );
        assert!(matches!(cmds[6], DrawCommand::StrokeRect { .. }));
        assert_eq!(cmds.last(), Some(&DrawCommand::ResetTransform));
    }

    #[test]
    fn test_missing_heatmap_degrades_silently() {
        let case = sample_cases().unwrap().remove(0);
        for heatmap in [
            AssetState::Absent,
            AssetState::Loading,
            AssetState::Failed(ViewerError::image_load("heat.png", "blocked")),
        ] {
            let frame = frame_for(&case, &ViewportState::default(), &heatmap);
            assert!(!frame.draws_layer(LayerKind::Heatmap));
            assert!(frame.draws_layer(LayerKind::Base));
            assert_eq!(frame.boxes().count(), 2);
        }
    }

    #[test]
    fn test_heatmap_requires_case_url_and_toggle() {
        let mut case = sample_cases().unwrap().remove(0);
        let heatmap = loaded(800, 600);

        let mut state = ViewportState::default();
        state.toggle_heatmap();
        assert!(!frame_for(&case, &state, &heatmap).draws_layer(LayerKind::Heatmap));

        case.heatmap_url = None;
        let frame = frame_for(&case, &ViewportState::default(), &heatmap);
        assert!(!frame.draws_layer(LayerKind::Heatmap));
    }

    #[test]
    fn test_stroke_scaled_by_inverse_zoom() {
        let case = sample_cases().unwrap().remove(0);
        let mut state = ViewportState::default();
        for _ in 0..8 {
            state.zoom_step(ZoomStep::In);
        }
        let frame = frame_for(&case, &state, &AssetState::Absent);
        let zoom = frame.zoom();
        for b in frame.boxes() {
            assert!((b.line_width * zoom - 2.0).abs() < 1e-4);
        }
        let font = frame.commands().iter().find_map(|c| match c {
            DrawCommand::FillText { font_size, .. } => Some(*font_size),
            _ => None,
        });
        assert!((font.unwrap() * zoom - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_selected_box_uses_distinct_color() {
        let case = sample_cases().unwrap().remove(0);
        let style = RenderStyle::default();
        let mut state = ViewportState::default();
        state.toggle_selection("f2");

        let frame = frame_for(&case, &state, &AssetState::Absent);
        let boxes: Vec<_> = frame.boxes().collect();
        assert_eq!(boxes[0].color, style.box_color);
        assert_eq!(boxes[1].color, style.selected_color);
        assert_ne!(style.box_color, style.selected_color);
    }

    #[test]
    fn test_label_text_and_position() {
        let case = sample_cases().unwrap().remove(0);
        let frame = frame_for(&case, &ViewportState::default(), &AssetState::Absent);
        let first_box = frame.boxes().next().unwrap().rect;
        let label = frame.commands().iter().find_map(|c| match c {
            DrawCommand::FillText { text, x, y, .. } => Some((text.clone(), *x, *y)),
            _ => None,
        });
        let (text, x, y) = label.unwrap();
        assert_eq!(text, "Pneumonia (98%)");
        assert_eq!(x, first_box.x);
        assert_eq!(y, first_box.y - 5.0);
    }

    #[test]
    fn test_out_of_range_box_is_clamped() {
        let mut case = sample_cases().unwrap().remove(2);
        case.findings.push(Finding {
            id: "wide".into(),
            label: "Artifact".into(),
            confidence: 1.4,
            severity: Severity::Low,
            coordinates: Some(Coordinates::new(80.0, 80.0, 50.0, 50.0)),
            explanation: String::new(),
        });
        let frame = frame_for(&case, &ViewportState::default(), &AssetState::Absent);
        let image = match frame.commands()[2] {
            DrawCommand::DrawImage { dest, .. } => dest,
            _ => unreachable!(),
        };
        let b = frame.boxes().next().unwrap().rect;
        assert!((b.x + b.width - (image.x + image.width)).abs() < 1e-3);
        assert!((b.y + b.height - (image.y + image.height)).abs() < 1e-3);
    }

    #[test]
    fn test_box_left_of_image_is_cut_off() {
        let mut case = sample_cases().unwrap().remove(2);
        case.findings.push(Finding {
            id: "edge".into(),
            label: "Artifact".into(),
            confidence: 0.5,
            severity: Severity::Low,
            coordinates: Some(Coordinates::new(-10.0, 0.0, 30.0, 10.0)),
            explanation: String::new(),
        });
        let frame = frame_for(&case, &ViewportState::default(), &AssetState::Absent);
        let image = match frame.commands()[2] {
            DrawCommand::DrawImage { dest, .. } => dest,
            _ => unreachable!(),
        };
        let b = frame.boxes().next().unwrap().rect;
        assert!((b.x - image.x).abs() < 1e-3);
        assert!((b.x + b.width - (image.x + image.width * 0.2)).abs() < 1e-3);
    }

    fn compose_with_base(case: &Case, base: &AssetState) -> Result<Frame, ComposeError> {
        compose(
            &ComposeInput {
                case,
                state: &ViewportState::default(),
                viewport: Size::new(100.0, 100.0),
                base,
                heatmap: &AssetState::Absent,
            },
            &RenderStyle::default(),
        )
    }

    #[test]
    fn test_base_not_loaded_vs_failed() {
        let case = sample_cases().unwrap().remove(0);

        assert_eq!(
            compose_with_base(&case, &AssetState::Loading),
            Err(ComposeError::BaseNotLoaded)
        );
        assert_eq!(
            compose_with_base(&case, &AssetState::Failed(ViewerError::image_load("a.png", "bad"))),
            Err(ComposeError::BaseLoadFailed(ViewerError::image_load("a.png", "bad")))
        );
    }

    #[test]
    fn test_zero_viewport_skips_frame() {
        let case = sample_cases().unwrap().remove(0);
        let state = ViewportState::default();
        let base = loaded(10, 10);
        let result = compose(
            &ComposeInput {
                case: &case,
                state: &state,
                viewport: Size::new(0.0, 480.0),
                base: &base,
                heatmap: &AssetState::Absent,
            },
            &RenderStyle::default(),
        );
        assert_eq!(
            result,
            Err(ComposeError::Geometry(GeometryError::EmptyViewport))
        );
    }
}
