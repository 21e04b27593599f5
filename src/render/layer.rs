use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{StudyError, StudyResult};
use crate::render::LayerPaint;

pub const BOUNDARY_SOURCE_ID: &str = "boundary-analysis";
pub const BOUNDARY_FILL_LAYER_ID: &str = "boundary-analysis-fill";
pub const BOUNDARY_LINE_LAYER_ID: &str = "boundary-analysis-line";
pub const STORES_SOURCE_ID: &str = "stores";
pub const STORES_LAYER_ID: &str = "stores";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Fill,
    Line,
    Circle,
}

/// One styled vector layer drawing features from a named source.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: String,
    pub source: String,
    pub paint: LayerPaint,
}

impl LayerSpec {
    #[must_use]
    pub fn new(id: impl Into<String>, source: impl Into<String>, paint: LayerPaint) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            paint,
        }
    }

    #[must_use]
    pub fn kind(&self) -> LayerKind {
        match self.paint {
            LayerPaint::Fill(_) => LayerKind::Fill,
            LayerPaint::Line(_) => LayerKind::Line,
            LayerPaint::Circle(_) => LayerKind::Circle,
        }
    }

    pub fn validate(&self) -> StudyResult<()> {
        if self.id.is_empty() || self.source.is_empty() {
            return Err(StudyError::InvalidData(
                "layer id and source id must not be empty".to_owned(),
            ));
        }
        self.paint.validate()
    }

    /// Layer definition in map-style JSON form.
    #[must_use]
    pub fn to_style_json(&self) -> Value {
        json!({
            "id": self.id,
            "type": self.kind(),
            "source": self.source,
            "paint": self.paint.to_style_json(),
        })
    }
}
