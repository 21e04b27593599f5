use serde::{Deserialize, Serialize};

use crate::error::{StudyError, StudyResult};

/// Longitude/latitude pair in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    #[must_use]
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Reads a GeoJSON position. Extra ordinates (altitude) are ignored.
    pub fn from_position(position: &[f64]) -> StudyResult<Self> {
        match position {
            [lng, lat, ..] if lng.is_finite() && lat.is_finite() => Ok(Self::new(*lng, *lat)),
            [_, _, ..] => Err(StudyError::InvalidData(
                "position ordinates must be finite".to_owned(),
            )),
            _ => Err(StudyError::InvalidData(format!(
                "position needs at least 2 ordinates, got {}",
                position.len()
            ))),
        }
    }
}

/// Axis-aligned bounding box grown one coordinate at a time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLatBounds {
    pub south_west: LngLat,
    pub north_east: LngLat,
}

impl LngLatBounds {
    #[must_use]
    pub const fn from_point(point: LngLat) -> Self {
        Self {
            south_west: point,
            north_east: point,
        }
    }

    pub fn extend(&mut self, point: LngLat) {
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
    }
}

/// Accumulates an optional bounding box; stays `None` until the first point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundsAccumulator {
    bounds: Option<LngLatBounds>,
}

impl BoundsAccumulator {
    pub fn push(&mut self, point: LngLat) {
        match &mut self.bounds {
            Some(bounds) => bounds.extend(point),
            None => self.bounds = Some(LngLatBounds::from_point(point)),
        }
    }

    #[must_use]
    pub fn finish(self) -> Option<LngLatBounds> {
        self.bounds
    }
}

/// Camera placement before any result has been fitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: LngLat,
    pub zoom: f64,
}

impl MapView {
    #[must_use]
    pub const fn new(center: LngLat, zoom: f64) -> Self {
        Self { center, zoom }
    }
}
