//! Drawing and pointer input delivered by the map collaborator.

pub mod capture;
pub mod tooltip;

use geojson::{Feature, JsonObject};
use serde::{Deserialize, Serialize};

use crate::core::LngLat;

pub use capture::{CaptureStatus, GeometryCapture};
pub use tooltip::{Tooltip, boundary_tooltip, store_tooltip};

/// Mode of the polygon draw control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    /// Features can be selected but not reshaped.
    SimpleSelect,
    /// Vertices of the selected feature can be dragged.
    DirectSelect,
    /// Clicks add polygon vertices.
    DrawPolygon,
}

/// Draw-control signal.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawEvent {
    Created(Feature),
    Updated(Feature),
    Deleted,
    ModeChanged(DrawMode),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorStyle {
    #[default]
    Default,
    Pointer,
}

/// Pointer event scoped to one rendered layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayerEvent<'a> {
    Click {
        position: LngLat,
        properties: &'a JsonObject,
    },
    PointerEnter,
    PointerLeave,
}

/// What the map should do in response to a [`LayerEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEffect {
    ShowPopup { position: LngLat, tooltip: Tooltip },
    SetCursor(CursorStyle),
}

/// Subscription callback. Receives only the event data; never the map.
pub type LayerHandler = Box<dyn Fn(&LayerEvent<'_>) -> Option<InteractionEffect>>;

/// Handler showing a tooltip on click and a pointer cursor while hovered.
#[must_use]
pub fn popup_handler(format: fn(&JsonObject) -> Tooltip) -> LayerHandler {
    Box::new(move |event| match *event {
        LayerEvent::Click {
            position,
            properties,
        } => Some(InteractionEffect::ShowPopup {
            position,
            tooltip: format(properties),
        }),
        LayerEvent::PointerEnter => Some(InteractionEffect::SetCursor(CursorStyle::Pointer)),
        LayerEvent::PointerLeave => Some(InteractionEffect::SetCursor(CursorStyle::Default)),
    })
}
