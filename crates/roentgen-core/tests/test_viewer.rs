mod common;

use std::time::Duration;

use common::{gradient_raster, speckled_raster, study_from, FailingRunner, SlowRunner};
use roentgen_core::annotations::MeasurementKind;
use roentgen_core::processing::FilterEngine;
use roentgen_core::raster::{Color, PointF, Raster};
use roentgen_core::tools::Tool;
use roentgen_core::viewer::ViewerSession;

/// Drive the session until background work settles or the deadline hits.
fn settle(session: &mut ViewerSession, deadline: Duration) {
    let start = std::time::Instant::now();
    loop {
        session.tick();
        if !session.is_processing() {
            return;
        }
        if start.elapsed() > deadline {
            panic!("session did not settle within {deadline:?}");
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}

// ---------------------------------------------------------------------------
// Measurement workflow
// ---------------------------------------------------------------------------

#[test]
fn test_ruler_reports_image_space_distance() {
    let mut session = ViewerSession::new();
    session.set_canvas_size(800, 600);
    session.select_image(study_from(gradient_raster(400, 300)));

    session.set_tool(Tool::Ruler);
    session.pointer_down(PointF::new(100.0, 100.0));
    session.pointer_up(PointF::new(400.0, 100.0));

    let measurements = session.annotations().measurements();
    assert_eq!(measurements.len(), 1);
    match &measurements[0].kind {
        MeasurementKind::Distance { value_px, .. } => {
            assert!((value_px - 300.0).abs() < 1e-3);
        }
        other => panic!("expected a distance, got {other:?}"),
    }
    assert_eq!(measurements[0].kind.format_value(), "300.00 px");
}

#[test]
fn test_measured_span_doubles_on_screen_at_double_zoom() {
    let mut session = ViewerSession::new();
    session.set_canvas_size(800, 600);
    session.select_image(study_from(gradient_raster(400, 300)));

    session.set_tool(Tool::Ruler);
    session.pointer_down(PointF::new(100.0, 100.0));
    session.pointer_up(PointF::new(400.0, 100.0));

    session.set_zoom(2.0);
    let (start, end) = match &session.annotations().measurements()[0].kind {
        MeasurementKind::Distance { start, end, .. } => (*start, *end),
        other => panic!("expected a distance, got {other:?}"),
    };

    // The stored value stays 300 px; only the screen separation doubles.
    let t = session.current_transform();
    let screen_span = t.to_screen(start).distance_to(t.to_screen(end));
    assert!((screen_span - 600.0).abs() < 1e-2);
    assert!((start.distance_to(end) - 300.0).abs() < 1e-3);
}

#[test]
fn test_annotation_keeps_its_image_anchor_across_view_changes() {
    let mut session = ViewerSession::new();
    session.set_canvas_size(800, 600);
    session.select_image(study_from(gradient_raster(400, 300)));

    // Draw while zoomed and rotated; the stored shape must be the
    // inverse-transformed gesture.
    session.set_zoom(2.5);
    session.rotate_by(90);
    session.set_tool(Tool::Line);

    let down = PointF::new(300.0, 200.0);
    let up = PointF::new(500.0, 400.0);
    session.pointer_down(down);
    session.pointer_up(up);

    let t = session.current_transform();
    let shape = &session.annotations().annotations()[0].shape;
    match shape {
        roentgen_core::annotations::Shape::Line { start, end } => {
            let back_down = t.to_screen(*start);
            let back_up = t.to_screen(*end);
            assert!((back_down.x - down.x).abs() < 1e-2);
            assert!((back_down.y - down.y).abs() < 1e-2);
            assert!((back_up.x - up.x).abs() < 1e-2);
            assert!((back_up.y - up.y).abs() < 1e-2);
        }
        other => panic!("expected a line, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Clearing
// ---------------------------------------------------------------------------

#[test]
fn test_clear_all_removes_annotations_and_measurements_together() {
    let mut session = ViewerSession::new();
    session.set_canvas_size(800, 600);
    session.select_image(study_from(gradient_raster(400, 300)));

    session.set_tool(Tool::Line);
    for i in 0..3 {
        let y = 50.0 + 40.0 * i as f32;
        session.pointer_down(PointF::new(100.0, y));
        session.pointer_up(PointF::new(300.0, y));
    }
    session.set_tool(Tool::Ruler);
    for i in 0..2 {
        let y = 250.0 + 40.0 * i as f32;
        session.pointer_down(PointF::new(100.0, y));
        session.pointer_up(PointF::new(400.0, y));
    }
    assert_eq!(session.annotations().annotations().len(), 3);
    assert_eq!(session.annotations().measurements().len(), 2);

    session.clear_annotations();
    assert!(session.annotations().is_empty());

    session.tick();
    let overlay = session.overlay_layer();
    for y in 0..600i64 {
        for x in 0..800i64 {
            assert_eq!(overlay.get(x, y).a, 0, "overlay pixel ({x},{y}) survived clear");
        }
    }
}

// ---------------------------------------------------------------------------
// Filter chain end to end
// ---------------------------------------------------------------------------

#[test]
fn test_filter_chain_replaces_base_pixels_when_done() {
    let mut session = ViewerSession::new();
    session.set_canvas_size(200, 150);
    session.select_image(study_from(speckled_raster(100, 75)));

    session.tick();
    let unfiltered = session.base_layer().clone();

    session.set_noise_threshold(0.8);
    // The transient frame right after the slider change shows the
    // unfiltered image while the chain runs.
    session.tick();
    assert_eq!(session.base_layer().as_bytes(), unfiltered.as_bytes());

    settle(&mut session, Duration::from_secs(10));
    assert_ne!(
        session.base_layer().as_bytes(),
        unfiltered.as_bytes(),
        "filtered pixels should replace the base layer"
    );
}

#[test]
fn test_full_three_stage_chain_settles() {
    let mut session = ViewerSession::new();
    session.set_canvas_size(160, 120);
    session.select_image(study_from(speckled_raster(80, 60)));

    session.set_noise_threshold(0.5);
    session.set_bone_removal(0.5);
    session.set_flesh_removal(0.5);
    settle(&mut session, Duration::from_secs(20));

    // Returning the sliders to zero restores the unfiltered rendering.
    session.set_noise_threshold(0.0);
    session.set_bone_removal(0.0);
    session.set_flesh_removal(0.0);
    settle(&mut session, Duration::from_secs(5));
    assert!(!session.is_processing());
}

#[test]
fn test_superseded_slider_value_never_wins() {
    let mut session = ViewerSession::new();
    session.set_canvas_size(160, 120);
    session.select_image(study_from(speckled_raster(80, 60)));

    // Rapid consecutive changes: only the last one decides the output.
    session.set_noise_threshold(0.2);
    session.tick();
    session.set_noise_threshold(0.9);
    settle(&mut session, Duration::from_secs(10));

    let settled = session.base_layer().clone();

    // A fresh session going straight to 0.9 renders the same pixels.
    let mut direct = ViewerSession::new();
    direct.set_canvas_size(160, 120);
    direct.select_image(study_from(speckled_raster(80, 60)));
    direct.set_noise_threshold(0.9);
    settle(&mut direct, Duration::from_secs(10));

    assert_eq!(settled.as_bytes(), direct.base_layer().as_bytes());
}

#[test]
fn test_timed_out_chain_keeps_unfiltered_image() {
    let engine = FilterEngine::with_runner(
        SlowRunner {
            delay: Duration::from_millis(400),
        },
        8,
        Duration::from_millis(40),
    );
    let mut session = ViewerSession::with_engine(engine);
    session.set_canvas_size(160, 120);
    session.select_image(study_from(speckled_raster(80, 60)));

    session.tick();
    let unfiltered = session.base_layer().clone();

    session.set_noise_threshold(0.7);
    settle(&mut session, Duration::from_secs(5));

    assert_eq!(
        session.base_layer().as_bytes(),
        unfiltered.as_bytes(),
        "timeout must fall back to the unfiltered image"
    );

    // The worker's late reply must not flip the displayed pixels.
    std::thread::sleep(Duration::from_millis(500));
    session.tick();
    assert_eq!(session.base_layer().as_bytes(), unfiltered.as_bytes());
}

#[test]
fn test_failed_stage_keeps_unfiltered_image() {
    let engine = FilterEngine::with_runner(FailingRunner, 8, Duration::from_secs(5));
    let mut session = ViewerSession::with_engine(engine);
    session.set_canvas_size(160, 120);
    session.select_image(study_from(speckled_raster(80, 60)));

    session.tick();
    let unfiltered = session.base_layer().clone();

    session.set_bone_removal(0.6);
    settle(&mut session, Duration::from_secs(5));
    assert_eq!(session.base_layer().as_bytes(), unfiltered.as_bytes());
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[test]
fn test_export_includes_annotations_at_canvas_size() {
    let mut session = ViewerSession::new();
    session.set_canvas_size(320, 240);
    session.select_image(study_from(Raster::filled(160, 120, Color::rgb(40, 40, 40))));

    session.set_tool(Tool::Line);
    session.pointer_down(PointF::new(60.0, 120.0));
    session.pointer_up(PointF::new(260.0, 120.0));

    let bytes = session.export_annotated_image().unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(decoded.width(), 320);
    assert_eq!(decoded.height(), 240);

    // The annotation stroke appears in the flattened export.
    let stroke = decoded.get_pixel(160, 120);
    assert_ne!([stroke.0[0], stroke.0[1], stroke.0[2]], [40, 40, 40]);
}
