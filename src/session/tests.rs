//! End-to-end session scenarios.

use std::io::Cursor;
use std::time::Duration;

use image::{ImageFormat, Rgba, RgbaImage};

use super::*;
use crate::compositor::LayerKind;
use crate::geometry::Transform;
use crate::ingest::CaseFactory;
use crate::model::{CaseStatus, Finding, Severity};
use crate::viewport::AssetKind;

fn session() -> ViewerSession {
    ViewerSession::with_sample_cases(&AppConfig::default()).unwrap()
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([40, 40, 40, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Open `case_id` and satisfy every load it asks for with a blank image.
fn open_loaded(session: &mut ViewerSession, case_id: &str, size: u32) {
    session.handle(ViewerMessage::Resized(Size::new(size as f32, size as f32)));
    for request in session.open_case(case_id).unwrap() {
        assert!(session.image_loaded(&request.ticket, Ok(RgbaImage::new(size, size))));
    }
    assert_eq!(session.status(), ViewerStatus::Ready);
}

#[test]
fn test_upload_scan_png_becomes_first_review_case() {
    let mut session = session();
    session
        .submit_upload(
            UploadFile::new("scan.png", "image/png", png_bytes(8, 6)),
            Instant::now(),
        )
        .unwrap();
    assert_eq!(session.ingestion_stage(), Some("Uploading DICOM/Image data..."));

    let mut last = None;
    for _ in 0..5 {
        last = session.advance_ingestion().unwrap();
    }
    let Some(PipelineEvent::Completed { case_id, .. }) = last else {
        panic!("fifth tick should complete the upload");
    };
    assert!(!session.is_ingesting());

    let first = &session.store().list()[0];
    assert_eq!(first.id, case_id);
    assert_eq!(first.status, CaseStatus::Review);
    assert_eq!(first.heatmap_url, None);
    assert_eq!(first.findings.len(), 2);
    assert_eq!(
        session.take_navigation(),
        vec![Navigation::OpenViewer(case_id.clone())]
    );

    // Uploaded bytes are decoded in place; nothing left for the host to fetch
    let requests = session.open_case(&case_id).unwrap();
    assert!(requests.is_empty());
    session.handle(ViewerMessage::Resized(Size::new(400.0, 300.0)));
    assert_eq!(session.status(), ViewerStatus::Ready);

    let frame = session.frame().unwrap();
    assert_eq!(frame.boxes().count(), 2);
    assert!(!frame.draws_layer(LayerKind::Heatmap));
    assert!(session.render().is_some());
}

#[test]
fn test_undecodable_upload_reports_image_load_error() {
    let mut session = session();
    session.handle(ViewerMessage::Resized(Size::new(100.0, 100.0)));
    session
        .submit_upload(
            UploadFile::new("scan.png", "image/png", vec![1, 2, 3]),
            Instant::now(),
        )
        .unwrap();
    while session.is_ingesting() {
        session.advance_ingestion().unwrap();
    }
    let Some(Navigation::OpenViewer(case_id)) = session.take_navigation().pop() else {
        panic!("upload should still produce a case");
    };

    assert!(session.open_case(&case_id).unwrap().is_empty());
    let image_url = session.active_case().unwrap().image_url.clone();
    let ViewerStatus::ImageLoadError(ViewerError::ImageLoad { url, .. }) = session.status() else {
        panic!("garbage bytes should fail to decode");
    };
    assert_eq!(url, image_url);
    assert!(session.frame().is_none());
}

struct UnavailableModel;

impl CaseFactory for UnavailableModel {
    fn build(&mut self, _upload: &UploadFile, _job: JobId) -> Result<Case, ViewerError> {
        Err(ViewerError::Ingestion("model unavailable".into()))
    }
}

#[test]
fn test_factory_failure_leaves_session_unchanged() {
    let pipeline = IngestionPipeline::new(vec!["Scanning".into()], Duration::from_millis(10))
        .with_factory(UnavailableModel);
    let mut session = session().with_pipeline(pipeline);
    let before = session.store().list().to_vec();

    let start = Instant::now();
    session
        .submit_upload(UploadFile::new("scan.png", "image/png", png_bytes(4, 4)), start)
        .unwrap();
    assert_eq!(session.ingestion_stage(), Some("Scanning"));

    let err = session.poll(start + Duration::from_millis(50)).unwrap_err();
    assert_eq!(err, ViewerError::Ingestion("model unavailable".into()));
    assert!(!session.is_ingesting());
    assert!(session.take_navigation().is_empty());
    assert!(session.uploads().is_empty());
    assert_eq!(session.store().list(), before.as_slice());
}

#[test]
fn test_missing_case_is_not_found_without_frame() {
    let mut session = session();
    session.handle(ViewerMessage::Resized(Size::new(640.0, 480.0)));

    let err = session.open_case("does-not-exist").unwrap_err();
    assert_eq!(err, ViewerError::not_found("does-not-exist"));
    assert_eq!(
        session.status(),
        ViewerStatus::NotFound("does-not-exist".into())
    );
    assert!(session.frame().is_none());
    assert!(session.render().is_none());
}

#[test]
fn test_twenty_zoom_outs_clamp_at_half() {
    let mut session = session();
    open_loaded(&mut session, "c1", 100);
    for _ in 0..20 {
        session.handle(ViewerMessage::Wheel(120.0));
    }
    assert_eq!(session.viewport_state().zoom(), 0.5);
    assert_eq!(session.frame().unwrap().zoom(), 0.5);
}

#[test]
fn test_three_findings_two_localized_draw_two_boxes() {
    let mut cases = sample_cases().unwrap();
    cases[0].findings.push(Finding {
        id: "f-global".into(),
        label: "Cardiomegaly".into(),
        confidence: 0.7,
        severity: Severity::Medium,
        coordinates: None,
        explanation: "Enlarged cardiac silhouette.".into(),
    });
    assert_eq!(cases[0].findings.len(), 3);

    let mut session = ViewerSession::new(CaseStore::with_cases(cases), &AppConfig::default());
    open_loaded(&mut session, "c1", 200);

    let frame = session.frame().unwrap();
    let ids: Vec<&str> = frame.boxes().map(|b| b.finding_id).collect();
    assert_eq!(ids, vec!["f1", "f2"]);
}

#[test]
fn test_superseded_upload_creates_one_case() {
    let mut session = session();
    let before = session.store().len();
    let start = Instant::now();
    let tick = Duration::from_millis(800);

    session
        .submit_upload(UploadFile::new("first.png", "image/png", png_bytes(4, 4)), start)
        .unwrap();
    session.poll(start + tick * 2).unwrap();

    let restart = start + tick * 2 + Duration::from_millis(100);
    let second = session
        .submit_upload(UploadFile::new("second.jpg", "", png_bytes(4, 4)), restart)
        .unwrap();
    let events = session.poll(restart + tick * 10).unwrap();

    let completed: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            PipelineEvent::Completed { job, .. } => Some(*job),
            _ => None,
        })
        .collect();
    assert_eq!(completed, vec![second]);
    assert_eq!(session.store().len(), before + 1);
    assert!(session.store().list()[0].image_url.ends_with("/second.jpg"));
    assert_eq!(session.take_navigation().len(), 1);
}

#[test]
fn test_rejected_upload_changes_nothing() {
    let mut session = session();
    let before = session.store().list().to_vec();
    let err = session
        .submit_upload(UploadFile::new("notes.txt", "text/plain", b"hi".to_vec()), Instant::now())
        .unwrap_err();
    assert!(matches!(err, ViewerError::Validation { .. }));
    assert!(!session.is_ingesting());
    assert_eq!(session.store().list(), before.as_slice());
}

#[test]
fn test_stale_image_load_is_ignored() {
    let mut session = session();
    session.handle(ViewerMessage::Resized(Size::new(100.0, 100.0)));
    let old = session.open_case("c1").unwrap();
    session.open_case("c2").unwrap();

    assert!(!session.image_loaded(&old[0].ticket, Ok(RgbaImage::new(10, 10))));
    assert_eq!(session.status(), ViewerStatus::Loading);
    assert!(session.frame().is_none());
}

#[test]
fn test_base_failure_reported_distinctly() {
    let mut session = session();
    session.handle(ViewerMessage::Resized(Size::new(100.0, 100.0)));
    let requests = session.open_case("c2").unwrap();
    assert_eq!(session.status(), ViewerStatus::Loading);

    let error = ViewerError::image_load(&requests[0].url, "404 Not Found");
    session.image_loaded(&requests[0].ticket, Err(error.clone()));
    assert_eq!(session.status(), ViewerStatus::ImageLoadError(error));
    assert!(session.frame().is_none());

    // Choosing another case recovers
    open_loaded(&mut session, "c3", 50);
}

#[test]
fn test_heatmap_failure_degrades_silently() {
    let mut session = session();
    session.handle(ViewerMessage::Resized(Size::new(100.0, 100.0)));
    for request in session.open_case("c1").unwrap() {
        let result = match request.ticket.kind {
            AssetKind::Base => Ok(RgbaImage::new(10, 10)),
            AssetKind::Heatmap => Err(ViewerError::image_load(&request.url, "blocked")),
        };
        session.image_loaded(&request.ticket, result);
    }
    assert_eq!(session.status(), ViewerStatus::Ready);
    let frame = session.frame().unwrap();
    assert!(!frame.draws_layer(LayerKind::Heatmap));
    assert_eq!(frame.boxes().count(), 2);
}

#[test]
fn test_click_on_box_toggles_selection() {
    let mut session = session();
    open_loaded(&mut session, "c1", 1000);
    let case = session.active_case().unwrap().clone();
    let geometry = ViewGeometry::new(
        Size::new(1000.0, 1000.0),
        Size::new(1000.0, 1000.0),
        Transform::identity(),
    )
    .unwrap();
    let target = geometry
        .percent_to_device(case.findings[0].coordinates.as_ref().unwrap())
        .center();

    session.handle(ViewerMessage::PointerDown(target));
    session.handle(ViewerMessage::PointerUp(target));
    assert_eq!(session.viewport_state().selected(), Some("f1"));

    session.handle(ViewerMessage::PointerDown(target));
    session.handle(ViewerMessage::PointerUp(target));
    assert_eq!(session.viewport_state().selected(), None);
}

#[test]
fn test_drag_pans_without_selecting() {
    let mut session = session();
    open_loaded(&mut session, "c1", 1000);
    session.take_redraw();

    session.handle(ViewerMessage::PointerDown(Point::new(500.0, 500.0)));
    session.handle(ViewerMessage::PointerMove(Point::new(540.0, 520.0)));
    session.handle(ViewerMessage::PointerUp(Point::new(540.0, 520.0)));
    assert_eq!(session.viewport_state().pan(), (40.0, 20.0));
    assert_eq!(session.viewport_state().selected(), None);
    assert!(session.take_redraw());
}

#[test]
fn test_list_selection_ignores_unknown_ids() {
    let mut session = session();
    open_loaded(&mut session, "c1", 100);
    session.handle(ViewerMessage::SelectFinding("f2".into()));
    assert_eq!(session.viewport_state().selected(), Some("f2"));
    session.handle(ViewerMessage::SelectFinding("nope".into()));
    assert_eq!(session.viewport_state().selected(), Some("f2"));
    session.handle(ViewerMessage::SelectFinding("f2".into()));
    assert_eq!(session.viewport_state().selected(), None);
}

#[test]
fn test_opening_another_case_resets_view() {
    let mut session = session();
    open_loaded(&mut session, "c1", 100);
    session.handle(ViewerMessage::ZoomIn);
    session.handle(ViewerMessage::ToggleHeatmap);
    session.handle(ViewerMessage::SelectFinding("f1".into()));

    open_loaded(&mut session, "c2", 100);
    assert_eq!(session.viewport_state(), &ViewportState::default());
}

#[test]
fn test_reset_view_and_toolbar_zoom() {
    let mut session = session();
    open_loaded(&mut session, "c1", 100);
    session.handle(ViewerMessage::ZoomIn);
    session.handle(ViewerMessage::ZoomIn);
    session.handle(ViewerMessage::PointerDown(Point::new(0.0, 0.0)));
    session.handle(ViewerMessage::PointerMove(Point::new(30.0, 30.0)));
    session.handle(ViewerMessage::PointerLeave);

    session.handle(ViewerMessage::ResetView);
    assert_eq!(session.viewport_state().zoom(), 1.0);
    assert_eq!(session.viewport_state().pan(), (0.0, 0.0));
}

#[test]
fn test_resize_requests_redraw_once() {
    let mut session = session();
    open_loaded(&mut session, "c1", 100);
    session.take_redraw();

    session.handle(ViewerMessage::Resized(Size::new(320.0, 200.0)));
    assert!(session.take_redraw());
    session.handle(ViewerMessage::Resized(Size::new(320.0, 200.0)));
    assert!(!session.take_redraw());
    assert_eq!(session.frame().unwrap().viewport(), Size::new(320.0, 200.0));
}

#[test]
fn test_zero_sized_canvas_has_no_frame() {
    let mut session = session();
    open_loaded(&mut session, "c1", 100);
    session.handle(ViewerMessage::Resized(Size::new(0.0, 0.0)));
    assert_eq!(session.status(), ViewerStatus::Ready);
    assert!(session.frame().is_none());
}

#[test]
fn test_report_for_active_case() {
    let mut session = session();
    assert!(session.report().is_none());
    open_loaded(&mut session, "c3", 10);
    let report = session.report().unwrap();
    assert!(report.contains("No acute cardiopulmonary process."));
    assert!(matches!(
        session.report_for("zzz"),
        Err(ViewerError::NotFound { .. })
    ));
}
