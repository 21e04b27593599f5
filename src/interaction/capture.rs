use std::fmt;

use geojson::Feature;
use tracing::{debug, trace};

use crate::core::geometry::{is_polygon, polygon_vertex_count};
use crate::interaction::DrawEvent;

/// Whether a study area is available for submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    /// One polygon is held; carries its vertex count.
    Ready(usize),
    NotReady,
}

impl CaptureStatus {
    #[must_use]
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

impl fmt::Display for CaptureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(points) => write!(f, "Area selected ({points} points)"),
            Self::NotReady => f.write_str("No area selected"),
        }
    }
}

/// Holds the single polygon the user drew.
///
/// A new polygon replaces the previous one. Geometry is not validated beyond
/// being present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryCapture {
    feature: Option<Feature>,
    locked: bool,
}

impl GeometryCapture {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current_feature(&self) -> Option<&Feature> {
        self.feature.as_ref()
    }

    #[must_use]
    pub fn status(&self) -> CaptureStatus {
        match &self.feature {
            Some(feature) if is_polygon(feature) => {
                CaptureStatus::Ready(polygon_vertex_count(feature))
            }
            _ => CaptureStatus::NotReady,
        }
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Freezes the captured area once it has been submitted.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Applies a draw signal and returns the recomputed status.
    ///
    /// Edits are ignored once the capture is locked; mode changes never touch
    /// the held feature.
    pub fn apply(&mut self, event: DrawEvent) -> CaptureStatus {
        if self.locked {
            debug!(?event, "ignoring draw event on locked study area");
            return self.status();
        }
        match event {
            DrawEvent::Created(feature) | DrawEvent::Updated(feature) => {
                self.feature = Some(feature);
            }
            DrawEvent::Deleted => self.feature = None,
            DrawEvent::ModeChanged(_) => {}
        }
        let status = self.status();
        trace!(%status, "geometry capture updated");
        status
    }
}

#[cfg(test)]
mod tests {
    use geojson::{Feature, Geometry, Value};

    use super::{CaptureStatus, GeometryCapture};
    use crate::interaction::DrawEvent;

    fn polygon(vertices: usize) -> Feature {
        let mut ring: Vec<Vec<f64>> = (0..vertices)
            .map(|i| {
                let angle = i as f64 / vertices as f64 * std::f64::consts::TAU;
                vec![angle.cos(), angle.sin()]
            })
            .collect();
        ring.push(ring[0].clone());
        Feature::from(Geometry::new(Value::Polygon(vec![ring])))
    }

    #[test]
    fn five_vertex_polygon_reports_ready_five_then_not_ready_on_delete() {
        let mut capture = GeometryCapture::new();
        assert_eq!(capture.status(), CaptureStatus::NotReady);

        assert_eq!(
            capture.apply(DrawEvent::Created(polygon(5))),
            CaptureStatus::Ready(5)
        );
        assert_eq!(capture.status().to_string(), "Area selected (5 points)");

        assert_eq!(capture.apply(DrawEvent::Deleted), CaptureStatus::NotReady);
        assert!(capture.current_feature().is_none());
    }

    #[test]
    fn second_polygon_replaces_first() {
        let mut capture = GeometryCapture::new();
        capture.apply(DrawEvent::Created(polygon(5)));
        assert_eq!(
            capture.apply(DrawEvent::Created(polygon(3))),
            CaptureStatus::Ready(3)
        );
        assert_eq!(capture.current_feature(), Some(&polygon(3)));
    }

    #[test]
    fn locked_capture_ignores_edits() {
        let mut capture = GeometryCapture::new();
        capture.apply(DrawEvent::Created(polygon(4)));
        capture.lock();
        assert_eq!(capture.apply(DrawEvent::Deleted), CaptureStatus::Ready(4));
        assert_eq!(
            capture.apply(DrawEvent::Updated(polygon(6))),
            CaptureStatus::Ready(4)
        );
    }
}
