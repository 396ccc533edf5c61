//! Base/heatmap image load tracking.
//!
//! Image loads are fire-and-forget on the host side. Every load carries a
//! [`LoadTicket`] naming the case and session generation it was started for;
//! a completion whose ticket no longer matches the active session is dropped,
//! so a slow image from a previous case can never be drawn over the current one.

use std::collections::HashMap;

use image::RgbaImage;

use crate::error::ViewerError;
use crate::geometry::Size;
use crate::model::Case;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Base,
    Heatmap,
}

/// Identifies one outstanding image load.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub case_id: String,
    pub generation: u64,
    pub kind: AssetKind,
}

/// A load the host should start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub url: String,
}

/// Load state of one image layer.
#[derive(Debug, Clone, Default)]
pub enum AssetState {
    /// Nothing to load (no case, or the case has no heatmap)
    #[default]
    Absent,
    /// Load started, not finished yet
    Loading,
    Loaded(RgbaImage),
    /// Load finished with an error
    Failed(ViewerError),
}

impl AssetState {
    pub fn image(&self) -> Option<&RgbaImage> {
        match self {
            AssetState::Loaded(img) => Some(img),
            _ => None,
        }
    }

    /// Intrinsic size, if loaded.
    pub fn size(&self) -> Option<Size> {
        self.image()
            .map(|img| Size::new(img.width() as f32, img.height() as f32))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AssetState::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, AssetState::Failed(_))
    }
}

/// Image layers of the active viewing session.
#[derive(Debug, Clone, Default)]
pub struct ViewerAssets {
    case_id: Option<String>,
    generation: u64,
    urls: HashMap<AssetKind, String>,
    base: AssetState,
    heatmap: AssetState,
}

impl ViewerAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base(&self) -> &AssetState {
        &self.base
    }

    pub fn heatmap(&self) -> &AssetState {
        &self.heatmap
    }

    /// Start a new session for `case`, invalidating every outstanding ticket.
    ///
    /// Returns the loads the host has to perform.
    pub fn begin(&mut self, case: &Case) -> Vec<LoadRequest> {
        self.generation += 1;
        self.case_id = Some(case.id.clone());
        self.urls.clear();
        self.base = AssetState::Loading;
        self.heatmap = AssetState::Absent;

        let mut requests = vec![self.request(AssetKind::Base, &case.image_url)];
        if let Some(url) = &case.heatmap_url {
            self.heatmap = AssetState::Loading;
            requests.push(self.request(AssetKind::Heatmap, url));
        }
        requests
    }

    /// Drop the session; pending loads become stale.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.case_id = None;
        self.urls.clear();
        self.base = AssetState::Absent;
        self.heatmap = AssetState::Absent;
    }

    fn request(&mut self, kind: AssetKind, url: &str) -> LoadRequest {
        self.urls.insert(kind, url.to_string());
        LoadRequest {
            ticket: LoadTicket {
                case_id: self.case_id.clone().unwrap_or_default(),
                generation: self.generation,
                kind,
            },
            url: url.to_string(),
        }
    }

    /// Whether a ticket still belongs to the active session.
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation && self.case_id.as_deref() == Some(&ticket.case_id)
    }

    /// Record a finished load. Returns true if it was applied (one redraw is due).
    ///
    /// Heatmap failures degrade silently: the layer just stays undrawn.
    pub fn complete(
        &mut self,
        ticket: &LoadTicket,
        result: Result<RgbaImage, ViewerError>,
    ) -> bool {
        if !self.is_current(ticket) {
            log::debug!(
                "Ignoring stale {:?} load for case '{}' (generation {}, active {})",
                ticket.kind,
                ticket.case_id,
                ticket.generation,
                self.generation
            );
            return false;
        }

        let url = self.urls.get(&ticket.kind).map(String::as_str).unwrap_or_default();
        let result = result
            .map_err(|e| match e {
                ViewerError::ImageLoad { .. } => e,
                other => ViewerError::image_load(url, other.to_string()),
            })
            .and_then(|img| {
                if img.width() == 0 || img.height() == 0 {
                    Err(ViewerError::image_load(url, "decoded image has no pixels"))
                } else {
                    Ok(img)
                }
            });

        match (ticket.kind, result) {
            (AssetKind::Base, Ok(img)) => {
                log::debug!(
                    "Base image for '{}' loaded ({}x{})",
                    ticket.case_id,
                    img.width(),
                    img.height()
                );
                self.base = AssetState::Loaded(img);
            }
            (AssetKind::Base, Err(error)) => {
                log::error!("Failed to load base image for '{}': {}", ticket.case_id, error);
                self.base = AssetState::Failed(error);
            }
            (AssetKind::Heatmap, Ok(img)) => {
                self.heatmap = AssetState::Loaded(img);
            }
            (AssetKind::Heatmap, Err(error)) => {
                log::debug!(
                    "Heatmap for '{}' unavailable, drawing without it: {}",
                    ticket.case_id,
                    error
                );
                self.heatmap = AssetState::Failed(error);
            }
        }
        true
    }
}
