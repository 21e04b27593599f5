mod support;

use geojson::{Feature, Geometry, Value};
use study_map::core::{exterior_bounds, polygon_vertex_count};
use study_map::interaction::{CaptureStatus, DrawEvent, DrawMode, GeometryCapture};

use support::{collection, surrey_boundaries, surrey_north_area};

#[test]
fn five_vertex_polygon_is_ready_and_delete_clears_it() {
    let mut capture = GeometryCapture::new();
    assert_eq!(capture.status(), CaptureStatus::NotReady);

    let status = capture.apply(DrawEvent::Created(surrey_north_area()));
    assert_eq!(status, CaptureStatus::Ready(5));
    assert_eq!(status.to_string(), "Area selected (5 points)");
    assert_eq!(polygon_vertex_count(&surrey_north_area()), 5);

    let status = capture.apply(DrawEvent::ModeChanged(DrawMode::DirectSelect));
    assert_eq!(status, CaptureStatus::Ready(5));

    let status = capture.apply(DrawEvent::Deleted);
    assert_eq!(status, CaptureStatus::NotReady);
    assert_eq!(status.to_string(), "No area selected");
    assert!(capture.current_feature().is_none());
}

#[test]
fn updated_polygon_replaces_the_previous_one() {
    let mut capture = GeometryCapture::new();
    capture.apply(DrawEvent::Created(surrey_north_area()));

    let triangle = Feature::from(Geometry::new(Value::Polygon(vec![vec![
        vec![0.0, 0.0],
        vec![1.0, 0.0],
        vec![0.0, 1.0],
        vec![0.0, 0.0],
    ]])));
    let status = capture.apply(DrawEvent::Updated(triangle.clone()));
    assert_eq!(status, CaptureStatus::Ready(3));
    assert_eq!(capture.current_feature(), Some(&triangle));
}

#[test]
fn bounds_cover_polygons_and_multipolygons() {
    let bounds = exterior_bounds(&surrey_boundaries())
        .expect("valid coordinates")
        .expect("non-empty");
    assert_eq!(bounds.south_west.lng, -122.90);
    assert_eq!(bounds.south_west.lat, 49.18);
    assert_eq!(bounds.north_east.lng, -122.77);
    assert_eq!(bounds.north_east.lat, 49.23);
}

#[test]
fn collections_without_polygons_have_no_bounds() {
    let points = collection(serde_json::json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {},
            "geometry": {"type": "Point", "coordinates": [-122.8, 49.1]}
        }]
    }));
    assert_eq!(exterior_bounds(&points).expect("valid"), None);
}
