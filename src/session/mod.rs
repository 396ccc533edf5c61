//! Viewing session: ties the store, the viewport and the ingestion pipeline
//! together behind one event-driven handle.
//!
//! The host owns the event loop. It forwards [`ViewerMessage`]s, performs the
//! image loads the session asks for, calls [`ViewerSession::poll`] from its
//! timer, and redraws when [`ViewerSession::take_redraw`] says so. Every
//! handler finishes mutating state before the redraw flag is read, so a frame
//! never sees half-applied input.

mod message;
mod uploads;

#[cfg(test)]
mod tests;

use image::RgbaImage;
use web_time::Instant;

use crate::compositor::{ComposeInput, Frame, RenderStyle, compose, rasterize};
use crate::config::AppConfig;
use crate::error::ViewerError;
use crate::geometry::{Point, Size, ViewGeometry, ZoomStep};
use crate::ingest::{IngestionPipeline, JobId, PipelineEvent, UploadFile};
use crate::model::{Case, sample_cases};
use crate::report::generate_report;
use crate::store::CaseStore;
use crate::viewport::{
    AssetState, InteractionController, LoadRequest, LoadTicket, PointerRelease, ViewerAssets,
    ViewportState,
};

pub use message::{Navigation, ViewerMessage};
pub use uploads::{LOCAL_SCHEME, UploadRegistry};

/// What the viewer area should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerStatus {
    /// No case opened yet
    NoCase,
    /// Requested case id is not in the store
    NotFound(String),
    /// Base image still loading
    Loading,
    /// Frames can be composed
    Ready,
    /// Base image failed; show an error instead of the canvas
    ImageLoadError(ViewerError),
}

pub struct ViewerSession {
    store: CaseStore,
    controller: InteractionController,
    assets: ViewerAssets,
    pipeline: IngestionPipeline,
    uploads: UploadRegistry,
    style: RenderStyle,
    viewport: Size,
    missing_case: Option<String>,
    navigation: Vec<Navigation>,
}

impl ViewerSession {
    pub fn new(store: CaseStore, config: &AppConfig) -> Self {
        Self {
            store,
            controller: InteractionController::new(),
            assets: ViewerAssets::new(),
            pipeline: config.ingestion.pipeline(),
            uploads: UploadRegistry::new(),
            style: config.render.clone(),
            viewport: Size::new(0.0, 0.0),
            missing_case: None,
            navigation: Vec::new(),
        }
    }

    /// Session over the bundled sample cases.
    pub fn with_sample_cases(config: &AppConfig) -> Result<Self, serde_json::Error> {
        Ok(Self::new(CaseStore::with_cases(sample_cases()?), config))
    }

    /// Replace the ingestion pipeline (custom factory or timing).
    pub fn with_pipeline(mut self, pipeline: IngestionPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn store(&self) -> &CaseStore {
        &self.store
    }

    pub fn uploads(&self) -> &UploadRegistry {
        &self.uploads
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn viewport_state(&self) -> &ViewportState {
        self.controller.state()
    }

    pub fn active_case(&self) -> Option<&Case> {
        self.controller.case_id().and_then(|id| self.store.get(id))
    }

    pub fn status(&self) -> ViewerStatus {
        if let Some(id) = &self.missing_case {
            return ViewerStatus::NotFound(id.clone());
        }
        if self.controller.case_id().is_none() {
            return ViewerStatus::NoCase;
        }
        match self.assets.base() {
            AssetState::Loaded(_) => ViewerStatus::Ready,
            AssetState::Failed(error) => ViewerStatus::ImageLoadError(error.clone()),
            AssetState::Absent | AssetState::Loading => ViewerStatus::Loading,
        }
    }

    /// Open the viewer for `case_id`. Returns the image loads the host must start.
    ///
    /// Uploaded images are not included: they are decoded in place from the
    /// upload registry. Any outstanding load of the previous case goes stale.
    pub fn open_case(&mut self, case_id: &str) -> Result<Vec<LoadRequest>, ViewerError> {
        let Some(case) = self.store.get(case_id) else {
            log::warn!("Viewer: case '{}' not found", case_id);
            self.controller.close_case();
            self.assets.clear();
            self.missing_case = Some(case_id.to_string());
            return Err(ViewerError::not_found(case_id));
        };

        log::info!("Viewer: opening case '{}'", case_id);
        self.missing_case = None;
        self.controller.open_case(case_id);
        let requests = self.assets.begin(case);

        let mut remote = Vec::with_capacity(requests.len());
        for request in requests {
            if UploadRegistry::is_local(&request.url) {
                let result = self.uploads.decode(&request.url);
                self.image_loaded(&request.ticket, result);
            } else {
                remote.push(request);
            }
        }
        Ok(remote)
    }

    /// Leave the viewer.
    pub fn close_case(&mut self) {
        self.controller.close_case();
        self.assets.clear();
        self.missing_case = None;
    }

    /// Deliver a finished image load. Stale tickets are ignored.
    ///
    /// Returns true if the load was applied.
    pub fn image_loaded(
        &mut self,
        ticket: &LoadTicket,
        result: Result<RgbaImage, ViewerError>,
    ) -> bool {
        let applied = self.assets.complete(ticket, result);
        if applied {
            self.controller.request_redraw();
        }
        applied
    }

    fn geometry(&self) -> Option<ViewGeometry> {
        let image = self.assets.base().size()?;
        ViewGeometry::new(image, self.viewport, self.controller.state().transform()).ok()
    }

    /// Apply one input event.
    pub fn handle(&mut self, message: ViewerMessage) {
        match message {
            ViewerMessage::PointerDown(pos) => self.controller.pointer_down(pos),
            ViewerMessage::PointerMove(pos) => {
                self.controller.pointer_move(pos);
            }
            ViewerMessage::PointerUp(pos) => {
                if let PointerRelease::Click(at) = self.controller.pointer_up(pos) {
                    self.click(at);
                }
            }
            ViewerMessage::PointerLeave => self.controller.pointer_leave(),
            ViewerMessage::Wheel(delta_y) => {
                self.controller.wheel(delta_y);
            }
            ViewerMessage::ZoomIn => {
                self.controller.zoom(ZoomStep::In);
            }
            ViewerMessage::ZoomOut => {
                self.controller.zoom(ZoomStep::Out);
            }
            ViewerMessage::ResetView => self.controller.reset_view(),
            ViewerMessage::ToggleHeatmap => self.controller.toggle_heatmap(),
            ViewerMessage::ToggleBoxes => self.controller.toggle_boxes(),
            ViewerMessage::SelectFinding(id) => self.select_finding(&id),
            ViewerMessage::Resized(size) => {
                if size != self.viewport {
                    log::debug!("Viewer: canvas resized to {}x{}", size.width, size.height);
                    self.viewport = size;
                    self.controller.request_redraw();
                }
            }
        }
    }

    fn click(&mut self, at: Point) {
        let Some(geometry) = self.geometry() else {
            return;
        };
        let picked = self
            .active_case()
            .and_then(|case| self.controller.pick_finding(case, &geometry, at))
            .map(str::to_string);
        if let Some(id) = picked {
            self.controller.toggle_selection(&id);
        }
    }

    fn select_finding(&mut self, finding_id: &str) {
        let known = self
            .active_case()
            .is_some_and(|case| case.finding(finding_id).is_some());
        if known {
            self.controller.toggle_selection(finding_id);
        } else {
            log::debug!("Viewer: ignoring selection of unknown finding '{}'", finding_id);
        }
    }

    /// Consume the pending redraw flag.
    pub fn take_redraw(&mut self) -> bool {
        self.controller.take_redraw()
    }

    /// Compose the current frame, or `None` if nothing can be drawn.
    ///
    /// [`ViewerSession::status`] tells the host what to show instead.
    pub fn frame(&self) -> Option<Frame> {
        let case = self.active_case()?;
        let input = ComposeInput {
            case,
            state: self.controller.state(),
            viewport: self.viewport,
            base: self.assets.base(),
            heatmap: self.assets.heatmap(),
        };
        compose(&input, &self.style)
            .inspect_err(|e| log::trace!("Viewer: no frame for '{}': {}", case.id, e))
            .ok()
    }

    /// Compose and rasterize the current frame.
    pub fn render(&self) -> Option<RgbaImage> {
        let frame = self.frame()?;
        let base = self.assets.base().image()?;
        Some(rasterize(&frame, base, self.assets.heatmap().image()))
    }

    /// Start ingesting an upload, replacing any upload in flight.
    pub fn submit_upload(&mut self, file: UploadFile, now: Instant) -> Result<JobId, ViewerError> {
        self.pipeline.submit(file, now)
    }

    /// Label of the stage the active upload is in.
    pub fn ingestion_stage(&self) -> Option<&str> {
        self.pipeline.current_stage().map(|(_, label)| label)
    }

    pub fn is_ingesting(&self) -> bool {
        self.pipeline.is_active()
    }

    /// How long the host may sleep before the next [`ViewerSession::poll`] is due.
    pub fn time_until_tick(&self, now: Instant) -> Option<std::time::Duration> {
        self.pipeline.time_until_tick(now)
    }

    /// Run ingestion ticks that are due at `now`.
    pub fn poll(&mut self, now: Instant) -> Result<Vec<PipelineEvent>, ViewerError> {
        let events = self.pipeline.poll(now, &mut self.store)?;
        for event in &events {
            self.on_pipeline_event(event);
        }
        Ok(events)
    }

    /// Run one ingestion tick regardless of timing.
    pub fn advance_ingestion(&mut self) -> Result<Option<PipelineEvent>, ViewerError> {
        let event = self.pipeline.advance(&mut self.store)?;
        if let Some(event) = &event {
            self.on_pipeline_event(event);
        }
        Ok(event)
    }

    fn on_pipeline_event(&mut self, event: &PipelineEvent) {
        let PipelineEvent::Completed {
            case_id, upload, ..
        } = event
        else {
            return;
        };
        if let Some(case) = self.store.get(case_id) {
            self.uploads.insert(case.image_url.clone(), upload.bytes.clone());
        }
        self.navigation.push(Navigation::OpenViewer(case_id.clone()));
    }

    /// Drain pending navigation requests.
    pub fn take_navigation(&mut self) -> Vec<Navigation> {
        std::mem::take(&mut self.navigation)
    }

    /// Report text for the active case.
    pub fn report(&self) -> Option<String> {
        self.active_case().map(generate_report)
    }

    /// Report text for any stored case.
    pub fn report_for(&self, case_id: &str) -> Result<String, ViewerError> {
        self.store.find(case_id).map(generate_report)
    }
}
