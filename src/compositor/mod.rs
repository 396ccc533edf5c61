//! Layer compositor.
//!
//! [`compose`] turns the viewport state and a case into a [`Frame`]: an
//! ordered display list (base image, heatmap, boxes) that any surface can
//! replay. It needs no live surface, which keeps it testable. [`rasterize`]
//! replays a frame into an RGBA buffer.

mod compose;
mod frame;
mod raster;
mod style;

pub use compose::{ComposeError, ComposeInput, compose};
pub use frame::{BlendMode, BoxDraw, DrawCommand, Frame, LayerKind, Rgba};
pub use raster::rasterize;
pub use style::RenderStyle;
