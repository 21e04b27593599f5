use geojson::{Feature, FeatureCollection, Value};

use crate::core::types::{BoundsAccumulator, LngLat, LngLatBounds};
use crate::error::StudyResult;

/// Exterior rings (ring 0) of a polygonal geometry.
///
/// Polygons yield one ring, multipolygons yield the exterior ring of each
/// member polygon, every other geometry yields nothing. Holes never
/// contribute.
#[must_use]
pub fn exterior_rings(value: &Value) -> Vec<&[Vec<f64>]> {
    match value {
        Value::Polygon(rings) => rings.first().map(Vec::as_slice).into_iter().collect(),
        Value::MultiPolygon(polygons) => polygons
            .iter()
            .filter_map(|rings| rings.first().map(Vec::as_slice))
            .collect(),
        _ => Vec::new(),
    }
}

#[must_use]
pub fn is_polygon(feature: &Feature) -> bool {
    matches!(
        feature.geometry.as_ref().map(|geometry| &geometry.value),
        Some(Value::Polygon(_))
    )
}

/// Number of distinct vertices a drawn polygon has.
///
/// The closing vertex repeats the first one and is not counted.
#[must_use]
pub fn polygon_vertex_count(feature: &Feature) -> usize {
    feature
        .geometry
        .as_ref()
        .and_then(|geometry| exterior_rings(&geometry.value).first().map(|ring| ring.len()))
        .map_or(0, |len| len.saturating_sub(1))
}

/// Bounding box over the exterior ring of every polygonal feature.
///
/// Returns `None` when the collection contributes no coordinate, in which
/// case callers leave the viewport alone.
pub fn exterior_bounds(collection: &FeatureCollection) -> StudyResult<Option<LngLatBounds>> {
    let mut bounds = BoundsAccumulator::default();
    for feature in &collection.features {
        let Some(geometry) = &feature.geometry else {
            continue;
        };
        for ring in exterior_rings(&geometry.value) {
            for position in ring {
                bounds.push(LngLat::from_position(position)?);
            }
        }
    }
    Ok(bounds.finish())
}
