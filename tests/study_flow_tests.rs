mod support;

use approx::assert_relative_eq;
use futures::executor::block_on;
use serde_json::json;
use study_map::api::{LifecyclePhase, SessionConfig, StudyLifecycle};
use study_map::core::{CustomerId, LngLat, StudyDraft};
use study_map::interaction::{CursorStyle, DrawEvent, DrawMode, LayerEvent};
use study_map::render::{
    BOUNDARY_FILL_LAYER_ID, BOUNDARY_LINE_LAYER_ID, BOUNDARY_SOURCE_ID, Camera, Color,
    HeadlessMap, LayerPaint, MapSurface, STORES_LAYER_ID,
};

use support::{
    RecordingView, ScriptedBackend, collection, empty_collection, surrey_boundaries,
    surrey_north_area,
};

type Session = StudyLifecycle<ScriptedBackend, HeadlessMap, RecordingView>;

fn processed_session(backend: ScriptedBackend) -> Session {
    let config = SessionConfig::default();
    let map = HeadlessMap::new(config.initial_view);
    let mut session =
        StudyLifecycle::new(config, backend, map, RecordingView::default()).expect("session");

    session.handle_draw_event(DrawEvent::ModeChanged(DrawMode::DrawPolygon));
    session.handle_draw_event(DrawEvent::Created(surrey_north_area()));
    let draft = session.with_captured_area(
        StudyDraft::new("Surrey North").with_customer(CustomerId::new(3)),
    );
    block_on(session.create_study(draft)).expect("create");
    block_on(session.process_study()).expect("process");
    session
}

#[test]
fn surrey_north_end_to_end() {
    let mut session = processed_session(ScriptedBackend::new(42));
    assert_eq!(session.study_id().map(|id| id.get()), Some(42));

    let outcome = block_on(session.run_analysis()).expect("analysis renders");
    assert_eq!(session.phase(), LifecyclePhase::Rendered);
    assert_eq!(outcome.boundary_features, Some(2));
    assert_eq!(outcome.store_features, Some(1));

    let map = session.map();
    assert_eq!(
        map.layer_ids(),
        vec![BOUNDARY_FILL_LAYER_ID, BOUNDARY_LINE_LAYER_ID, STORES_LAYER_ID]
    );
    assert_eq!(map.draw_mode(), None);
    assert_eq!(
        map.caption(),
        Some("Click on boundaries or stores for details. Red = undersupply, Green = oversupply.")
    );

    let fill = map.layer(BOUNDARY_FILL_LAYER_ID).expect("fill layer");
    let LayerPaint::Fill(paint) = &fill.paint else {
        panic!("fill layer should carry fill paint");
    };
    assert_relative_eq!(paint.opacity, 0.7);
    let red = Color::from_hex("#d73027").expect("red");
    let halfway = paint.color.color_at(Some(-500.0));
    assert_eq!(halfway, red.lerp(Color::WHITE, 0.5));
    assert_relative_eq!(halfway.red, (215.0 / 255.0 + 1.0) / 2.0, epsilon = 1e-12);
    assert_relative_eq!(halfway.green, (48.0 / 255.0 + 1.0) / 2.0, epsilon = 1e-12);

    let stores = map.layer(STORES_LAYER_ID).expect("stores layer");
    let LayerPaint::Circle(circle) = &stores.paint else {
        panic!("stores layer should carry circle paint");
    };
    assert_relative_eq!(circle.radius.radius_at(Some(25_000.0)), 8.0, epsilon = 1e-12);

    let Camera::Fitted { bounds, padding } = map.camera() else {
        panic!("camera should be fitted to the boundaries");
    };
    assert_relative_eq!(padding, 50.0);
    assert_relative_eq!(bounds.south_west.lng, -122.90);
    assert_relative_eq!(bounds.north_east.lng, -122.77);
    assert_relative_eq!(bounds.north_east.lat, 49.23);

    let view = session.view();
    assert_eq!(view.last_progress(), Some(("Analysis complete!", 100)));
    assert_eq!(
        view.results,
        vec!["Analysis results are displayed on the map.".to_owned()]
    );
    assert!(view.controls.results_visible);
    assert!(!view.controls.analysis_enabled);

    let percentages: Vec<u8> = view.progress.iter().map(|(_, pct)| *pct).collect();
    assert_eq!(&percentages[percentages.len() - 3..], &[80, 90, 100]);
    assert_eq!(
        session.backend().calls(),
        vec!["create", "process", "analysis", "boundaries", "stores"]
    );
}

#[test]
fn empty_stores_are_skipped() {
    let backend = ScriptedBackend::new(7)
        .with_results(Some(surrey_boundaries()), Some(empty_collection()));
    let mut session = processed_session(backend);

    let outcome = block_on(session.run_analysis()).expect("renders");
    assert_eq!(outcome.store_features, None);
    assert!(!session.map().has_layer(STORES_LAYER_ID));
    assert!(session.map().has_layer(BOUNDARY_FILL_LAYER_ID));
}

#[test]
fn absent_boundaries_leave_camera_untouched() {
    let backend = ScriptedBackend::new(7).with_results(None, None);
    let mut session = processed_session(backend);

    let outcome = block_on(session.run_analysis()).expect("renders nothing");
    assert_eq!(outcome.boundary_features, None);
    assert_eq!(outcome.fitted_bounds, None);
    assert!(session.map().layer_ids().is_empty());
    assert!(matches!(session.map().camera(), Camera::Initial(_)));
    assert_eq!(session.phase(), LifecyclePhase::Rendered);
}

#[test]
fn empty_boundaries_are_still_drawn() {
    let backend = ScriptedBackend::new(7).with_results(Some(empty_collection()), None);
    let mut session = processed_session(backend);

    let outcome = block_on(session.run_analysis()).expect("renders");
    assert_eq!(outcome.boundary_features, Some(0));
    assert!(session.map().has_source(BOUNDARY_SOURCE_ID));
    assert!(matches!(session.map().camera(), Camera::Initial(_)));
}

#[test]
fn inconsistent_residual_fails_analysis_without_touching_map() {
    let bad = collection(json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": { "boundary_id": "bad", "demand": 10.0, "supply": 20.0, "residual": 5.0 },
            "geometry": { "type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0]]] }
        }]
    }));
    let backend = ScriptedBackend::new(7).with_results(Some(bad), None);
    let mut session = processed_session(backend);

    block_on(session.run_analysis()).expect_err("invalid residual");
    assert!(session.map().layer_ids().is_empty());
    assert!(
        session
            .view()
            .last_error()
            .is_some_and(|message| message.starts_with("Failed to run analysis: invalid data"))
    );
}

#[test]
fn clicking_rendered_layers_shows_tooltips() {
    let mut session = processed_session(ScriptedBackend::new(42));
    block_on(session.run_analysis()).expect("renders");

    let boundary = surrey_boundaries();
    let properties = boundary.features[0].properties.clone().expect("properties");
    let position = LngLat::new(-122.87, 49.19);
    let map = session.map_mut();

    map.dispatch(BOUNDARY_FILL_LAYER_ID, LayerEvent::PointerEnter);
    assert_eq!(map.cursor(), CursorStyle::Pointer);
    map.dispatch(
        BOUNDARY_FILL_LAYER_ID,
        LayerEvent::Click {
            position,
            properties: &properties,
        },
    );
    let popup = map.popup().expect("popup open");
    assert_eq!(popup.tooltip.title, "Boundary Analysis");
    assert_eq!(
        popup.tooltip.lines,
        vec!["Demand: 1500", "Supply: 1000", "Residual: -500"]
    );
    map.dispatch(BOUNDARY_FILL_LAYER_ID, LayerEvent::PointerLeave);
    assert_eq!(map.cursor(), CursorStyle::Default);

    let stores = support::surrey_stores();
    let properties = stores.features[0].properties.clone().expect("properties");
    map.dispatch(
        STORES_LAYER_ID,
        LayerEvent::Click {
            position,
            properties: &properties,
        },
    );
    let popup = map.popup().expect("popup open");
    assert_eq!(popup.tooltip.title, "Guildford Self Storage");
    assert_eq!(popup.tooltip.lines[2], "Rentable SqFt: 25,000");
}
