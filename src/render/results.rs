use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::dataset::{check_residuals, max_residual, sqft_extent};
use crate::core::{LngLatBounds, ResultDataset, exterior_bounds};
use crate::error::{StudyError, StudyResult};
use crate::interaction::{boundary_tooltip, popup_handler, store_tooltip};
use crate::render::{
    BOUNDARY_FILL_LAYER_ID, BOUNDARY_LINE_LAYER_ID, BOUNDARY_SOURCE_ID, CirclePaint, Color,
    ColorRamp, FillPaint, LayerPaint, LayerSpec, LinePaint, MapSurface, STORES_LAYER_ID,
    STORES_SOURCE_ID, SqrtRadiusScale,
};

/// Visual encoding of analysis results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultStyle {
    pub undersupply_color: Color,
    pub balanced_color: Color,
    pub oversupply_color: Color,
    pub fill_opacity: f64,
    pub outline_color: Color,
    pub outline_width: f64,
    pub store_color: Color,
    pub store_stroke_color: Color,
    pub store_stroke_width: f64,
    pub store_radius_min: f64,
    pub store_radius_max: f64,
    /// Padding around fitted result bounds, in screen units.
    pub fit_padding: f64,
    /// Caption shown over the map once results are displayed.
    pub legend_caption: String,
}

impl Default for ResultStyle {
    fn default() -> Self {
        Self {
            undersupply_color: Color::from_rgb8(0xd7, 0x30, 0x27),
            balanced_color: Color::WHITE,
            oversupply_color: Color::from_rgb8(0x1a, 0x98, 0x50),
            fill_opacity: 0.7,
            outline_color: Color::from_rgb8(0x33, 0x33, 0x33),
            outline_width: 0.5,
            store_color: Color::BLACK,
            store_stroke_color: Color::WHITE,
            store_stroke_width: 2.0,
            store_radius_min: 4.0,
            store_radius_max: 12.0,
            fit_padding: 50.0,
            legend_caption:
                "Click on boundaries or stores for details. Red = undersupply, Green = oversupply."
                    .to_owned(),
        }
    }
}

impl ResultStyle {
    pub fn validate(&self) -> StudyResult<()> {
        for color in [
            self.undersupply_color,
            self.balanced_color,
            self.oversupply_color,
            self.outline_color,
            self.store_color,
            self.store_stroke_color,
        ] {
            color.validate()?;
        }
        if !self.fill_opacity.is_finite() || !(0.0..=1.0).contains(&self.fill_opacity) {
            return Err(StudyError::InvalidData(
                "fill opacity must be in [0, 1]".to_owned(),
            ));
        }
        for (label, value) in [
            ("outline width", self.outline_width),
            ("store stroke width", self.store_stroke_width),
            ("store radius min", self.store_radius_min),
            ("store radius max", self.store_radius_max),
            ("fit padding", self.fit_padding),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(StudyError::InvalidData(format!(
                    "{label} must be finite and >= 0"
                )));
            }
        }
        Ok(())
    }
}

/// Summary of one render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOutcome {
    /// Feature count of the boundaries layer, `None` when it was not drawn.
    pub boundary_features: Option<usize>,
    /// Feature count of the stores layer, `None` when it was skipped.
    pub store_features: Option<usize>,
    /// Bounds the viewport was fitted to.
    pub fitted_bounds: Option<LngLatBounds>,
}

struct BoundaryPlan<'a> {
    data: &'a FeatureCollection,
    fill: LayerSpec,
    outline: LayerSpec,
    bounds: Option<LngLatBounds>,
}

struct StoresPlan<'a> {
    data: &'a FeatureCollection,
    layer: LayerSpec,
}

/// Turns analysis results into map layers.
///
/// The renderer owns the layer and source ids it creates and replaces them
/// on every pass, so rendering the same dataset twice leaves the same layer
/// set behind.
#[derive(Debug, Clone, Default)]
pub struct ResultRenderer {
    style: ResultStyle,
    owned_layers: Vec<&'static str>,
}

impl ResultRenderer {
    #[must_use]
    pub fn new(style: ResultStyle) -> Self {
        Self {
            style,
            owned_layers: Vec::new(),
        }
    }

    #[must_use]
    pub fn style(&self) -> &ResultStyle {
        &self.style
    }

    /// Layer ids currently on the map because of this renderer.
    #[must_use]
    pub fn owned_layers(&self) -> &[&'static str] {
        &self.owned_layers
    }

    pub fn residual_ramp(&self, boundaries: &FeatureCollection) -> StudyResult<ColorRamp> {
        ColorRamp::diverging(
            "residual",
            max_residual(boundaries),
            self.style.undersupply_color,
            self.style.balanced_color,
            self.style.oversupply_color,
        )
    }

    pub fn store_radius_scale(&self, stores: &FeatureCollection) -> StudyResult<SqrtRadiusScale> {
        let (min_sqft, max_sqft) = sqft_extent(stores);
        SqrtRadiusScale::new(
            "rentablesqft",
            min_sqft,
            max_sqft,
            self.style.store_radius_min,
            self.style.store_radius_max,
        )
    }

    /// Draws both result sets, fits the viewport and switches the map to
    /// read-only result display.
    ///
    /// Everything that can fail on the data is checked before the map is
    /// touched, so an error leaves the map as it was.
    pub fn render<M: MapSurface>(
        &mut self,
        map: &mut M,
        dataset: &ResultDataset,
    ) -> StudyResult<RenderOutcome> {
        let boundaries = dataset
            .boundaries
            .as_ref()
            .map(|data| self.plan_boundaries(data))
            .transpose()?;
        let stores = dataset
            .stores
            .as_ref()
            .filter(|data| !data.features.is_empty())
            .map(|data| self.plan_stores(data))
            .transpose()?;

        let mut outcome = RenderOutcome {
            boundary_features: None,
            store_features: None,
            fitted_bounds: None,
        };

        match boundaries {
            Some(plan) => {
                self.replace(
                    map,
                    &[BOUNDARY_FILL_LAYER_ID, BOUNDARY_LINE_LAYER_ID],
                    BOUNDARY_SOURCE_ID,
                )?;
                map.add_source(BOUNDARY_SOURCE_ID, plan.data)?;
                map.add_layer(&plan.fill)?;
                map.add_layer(&plan.outline)?;
                map.subscribe(BOUNDARY_FILL_LAYER_ID, popup_handler(boundary_tooltip))?;
                self.owned_layers
                    .extend([BOUNDARY_FILL_LAYER_ID, BOUNDARY_LINE_LAYER_ID]);
                outcome.boundary_features = Some(plan.data.features.len());

                if let Some(bounds) = plan.bounds {
                    map.fit_bounds(bounds, self.style.fit_padding);
                    outcome.fitted_bounds = Some(bounds);
                }
            }
            None => debug!("boundaries absent, leaving boundary layers untouched"),
        }

        // A stale stores layer from an earlier pass is removed even when the
        // new dataset has no stores.
        self.replace(map, &[STORES_LAYER_ID], STORES_SOURCE_ID)?;
        match stores {
            Some(plan) => {
                map.add_source(STORES_SOURCE_ID, plan.data)?;
                map.add_layer(&plan.layer)?;
                map.subscribe(STORES_LAYER_ID, popup_handler(store_tooltip))?;
                self.owned_layers.push(STORES_LAYER_ID);
                outcome.store_features = Some(plan.data.features.len());
            }
            None => debug!("no stores to draw, skipping stores layer"),
        }

        map.remove_draw_control();
        map.set_caption(Some(self.style.legend_caption.as_str()));

        debug!(
            boundary_features = ?outcome.boundary_features,
            store_features = ?outcome.store_features,
            fitted = outcome.fitted_bounds.is_some(),
            "rendered study results"
        );
        Ok(outcome)
    }

    fn plan_boundaries<'a>(&self, data: &'a FeatureCollection) -> StudyResult<BoundaryPlan<'a>> {
        check_residuals(data)?;
        let fill = LayerSpec::new(
            BOUNDARY_FILL_LAYER_ID,
            BOUNDARY_SOURCE_ID,
            LayerPaint::Fill(FillPaint {
                color: self.residual_ramp(data)?,
                opacity: self.style.fill_opacity,
            }),
        );
        let outline = LayerSpec::new(
            BOUNDARY_LINE_LAYER_ID,
            BOUNDARY_SOURCE_ID,
            LayerPaint::Line(LinePaint {
                color: self.style.outline_color,
                width: self.style.outline_width,
            }),
        );
        fill.validate()?;
        outline.validate()?;
        Ok(BoundaryPlan {
            data,
            fill,
            outline,
            bounds: exterior_bounds(data)?,
        })
    }

    fn plan_stores<'a>(&self, data: &'a FeatureCollection) -> StudyResult<StoresPlan<'a>> {
        let layer = LayerSpec::new(
            STORES_LAYER_ID,
            STORES_SOURCE_ID,
            LayerPaint::Circle(CirclePaint {
                radius: self.store_radius_scale(data)?,
                color: self.style.store_color,
                stroke_color: self.style.store_stroke_color,
                stroke_width: self.style.store_stroke_width,
            }),
        );
        layer.validate()?;
        Ok(StoresPlan { data, layer })
    }

    /// Removes `layers` then `source` when present on the map.
    fn replace<M: MapSurface>(
        &mut self,
        map: &mut M,
        layers: &[&'static str],
        source: &str,
    ) -> StudyResult<()> {
        for layer_id in layers {
            if map.has_layer(layer_id) {
                trace!(layer_id, "removing existing layer");
                map.remove_layer(layer_id)?;
            }
        }
        self.owned_layers.retain(|owned| !layers.contains(owned));
        if map.has_source(source) {
            map.remove_source(source)?;
        }
        Ok(())
    }
}
