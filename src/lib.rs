//! MedView - annotated medical image viewer core
//!
//! Renders a base image, an optional heatmap overlay and percentage-positioned
//! finding boxes under pan and zoom, and turns uploaded files into new case
//! records through a staged ingestion pipeline. Hosts (the native binary or
//! the browser bindings) own the event loop and feed a [`ViewerSession`].

pub mod compositor;
pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod ingest;
pub mod model;
pub mod report;
pub mod session;
pub mod store;
pub mod viewport;

pub use config::AppConfig;
pub use error::ViewerError;
pub use report::generate_report;
pub use session::{Navigation, ViewerMessage, ViewerSession, ViewerStatus};
pub use store::CaseStore;

// Native host helpers
#[cfg(not(target_arch = "wasm32"))]
pub mod native;

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
