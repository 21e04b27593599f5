mod headless_map;
mod layer;
mod paint;
mod primitives;
mod results;

pub use headless_map::{Camera, HeadlessMap, Popup};
pub use layer::{
    BOUNDARY_FILL_LAYER_ID, BOUNDARY_LINE_LAYER_ID, BOUNDARY_SOURCE_ID, LayerKind, LayerSpec,
    STORES_LAYER_ID, STORES_SOURCE_ID,
};
pub use paint::{CirclePaint, ColorRamp, ColorStop, FillPaint, LayerPaint, LinePaint, SqrtRadiusScale};
pub use primitives::Color;
pub use results::{RenderOutcome, ResultRenderer, ResultStyle};

use geojson::FeatureCollection;

use crate::core::LngLatBounds;
use crate::error::StudyResult;
use crate::interaction::{DrawMode, LayerHandler};

/// Contract implemented by any map engine the session draws into.
///
/// The contract mirrors a vector-tile map: sources hold GeoJSON, layers style
/// one source, and ids are unique per kind. Adding a duplicate id or removing
/// a source still referenced by a layer is an error. Removing a layer drops
/// every subscription registered on it.
pub trait MapSurface {
    fn has_source(&self, source_id: &str) -> bool;
    fn has_layer(&self, layer_id: &str) -> bool;

    fn add_source(&mut self, source_id: &str, data: &FeatureCollection) -> StudyResult<()>;
    fn remove_source(&mut self, source_id: &str) -> StudyResult<()>;

    fn add_layer(&mut self, layer: &LayerSpec) -> StudyResult<()>;
    fn remove_layer(&mut self, layer_id: &str) -> StudyResult<()>;

    /// Registers a click/hover handler for features of `layer_id`.
    fn subscribe(&mut self, layer_id: &str, handler: LayerHandler) -> StudyResult<()>;

    fn fit_bounds(&mut self, bounds: LngLatBounds, padding: f64);

    fn set_draw_mode(&mut self, mode: DrawMode);

    /// Detaches the polygon draw control for the rest of the session.
    fn remove_draw_control(&mut self);

    /// Replaces the instructional caption over the map; `None` hides it.
    fn set_caption(&mut self, caption: Option<&str>);
}
