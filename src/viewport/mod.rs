//! Live viewing state: pan/zoom/selection, pointer handling and image loads.

mod assets;
mod controller;
mod state;

pub use assets::{AssetKind, AssetState, LoadRequest, LoadTicket, ViewerAssets};
pub use controller::{InteractionController, PointerRelease};
pub use state::ViewportState;
