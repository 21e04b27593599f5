use geojson::FeatureCollection;
use indexmap::IndexMap;

use crate::core::{LngLat, LngLatBounds, MapView};
use crate::error::{StudyError, StudyResult};
use crate::interaction::{
    CursorStyle, DrawMode, InteractionEffect, LayerEvent, LayerHandler, Tooltip,
};
use crate::render::{LayerSpec, MapSurface};

/// Popup currently open on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub position: LngLat,
    pub tooltip: Tooltip,
}

/// Camera state tracked by [`HeadlessMap`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Camera {
    Initial(MapView),
    Fitted { bounds: LngLatBounds, padding: f64 },
}

/// In-memory map used by tests and headless sessions.
///
/// It enforces the same id rules as a real map engine so render passes that
/// would fail there fail here too, and it can replay pointer events through
/// registered handlers.
pub struct HeadlessMap {
    sources: IndexMap<String, FeatureCollection>,
    layers: IndexMap<String, LayerSpec>,
    handlers: IndexMap<String, Vec<LayerHandler>>,
    camera: Camera,
    draw_mode: Option<DrawMode>,
    caption: Option<String>,
    cursor: CursorStyle,
    popup: Option<Popup>,
}

impl HeadlessMap {
    #[must_use]
    pub fn new(view: MapView) -> Self {
        Self {
            sources: IndexMap::new(),
            layers: IndexMap::new(),
            handlers: IndexMap::new(),
            camera: Camera::Initial(view),
            draw_mode: Some(DrawMode::SimpleSelect),
            caption: None,
            cursor: CursorStyle::Default,
            popup: None,
        }
    }

    #[must_use]
    pub fn source(&self, source_id: &str) -> Option<&FeatureCollection> {
        self.sources.get(source_id)
    }

    #[must_use]
    pub fn layer(&self, layer_id: &str) -> Option<&LayerSpec> {
        self.layers.get(layer_id)
    }

    /// Layer ids in draw order.
    #[must_use]
    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn source_ids(&self) -> Vec<&str> {
        self.sources.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn handler_count(&self, layer_id: &str) -> usize {
        self.handlers.get(layer_id).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// `None` once the draw control has been removed.
    #[must_use]
    pub fn draw_mode(&self) -> Option<DrawMode> {
        self.draw_mode
    }

    #[must_use]
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    #[must_use]
    pub fn cursor(&self) -> CursorStyle {
        self.cursor
    }

    #[must_use]
    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    /// Feeds a pointer event to the handlers of `layer_id` and applies their
    /// effects. Returns the effects in handler order.
    pub fn dispatch(&mut self, layer_id: &str, event: LayerEvent<'_>) -> Vec<InteractionEffect> {
        let effects: Vec<InteractionEffect> = self
            .handlers
            .get(layer_id)
            .into_iter()
            .flatten()
            .filter_map(|handler| handler(&event))
            .collect();

        for effect in &effects {
            match effect {
                InteractionEffect::ShowPopup { position, tooltip } => {
                    self.popup = Some(Popup {
                        position: *position,
                        tooltip: tooltip.clone(),
                    });
                }
                InteractionEffect::SetCursor(cursor) => self.cursor = *cursor,
            }
        }
        effects
    }
}

impl MapSurface for HeadlessMap {
    fn has_source(&self, source_id: &str) -> bool {
        self.sources.contains_key(source_id)
    }

    fn has_layer(&self, layer_id: &str) -> bool {
        self.layers.contains_key(layer_id)
    }

    fn add_source(&mut self, source_id: &str, data: &FeatureCollection) -> StudyResult<()> {
        if self.sources.contains_key(source_id) {
            return Err(StudyError::InvalidData(format!(
                "source `{source_id}` already exists"
            )));
        }
        self.sources.insert(source_id.to_owned(), data.clone());
        Ok(())
    }

    fn remove_source(&mut self, source_id: &str) -> StudyResult<()> {
        if let Some(layer) = self.layers.values().find(|layer| layer.source == source_id) {
            return Err(StudyError::InvalidData(format!(
                "source `{source_id}` is still used by layer `{}`",
                layer.id
            )));
        }
        self.sources
            .shift_remove(source_id)
            .map(|_| ())
            .ok_or_else(|| StudyError::InvalidData(format!("source `{source_id}` does not exist")))
    }

    fn add_layer(&mut self, layer: &LayerSpec) -> StudyResult<()> {
        layer.validate()?;
        if self.layers.contains_key(&layer.id) {
            return Err(StudyError::InvalidData(format!(
                "layer `{}` already exists",
                layer.id
            )));
        }
        if !self.sources.contains_key(&layer.source) {
            return Err(StudyError::InvalidData(format!(
                "layer `{}` references missing source `{}`",
                layer.id, layer.source
            )));
        }
        self.layers.insert(layer.id.clone(), layer.clone());
        Ok(())
    }

    fn remove_layer(&mut self, layer_id: &str) -> StudyResult<()> {
        if self.layers.shift_remove(layer_id).is_none() {
            return Err(StudyError::InvalidData(format!(
                "layer `{layer_id}` does not exist"
            )));
        }
        self.handlers.shift_remove(layer_id);
        Ok(())
    }

    fn subscribe(&mut self, layer_id: &str, handler: LayerHandler) -> StudyResult<()> {
        if !self.layers.contains_key(layer_id) {
            return Err(StudyError::InvalidData(format!(
                "cannot subscribe to missing layer `{layer_id}`"
            )));
        }
        self.handlers
            .entry(layer_id.to_owned())
            .or_default()
            .push(handler);
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: LngLatBounds, padding: f64) {
        self.camera = Camera::Fitted { bounds, padding };
    }

    fn set_draw_mode(&mut self, mode: DrawMode) {
        if self.draw_mode.is_some() {
            self.draw_mode = Some(mode);
        }
    }

    fn remove_draw_control(&mut self) {
        self.draw_mode = None;
    }

    fn set_caption(&mut self, caption: Option<&str>) {
        self.caption = caption.map(str::to_owned);
    }
}
