use geojson::{Feature, FeatureCollection, JsonObject};

use crate::error::{StudyError, StudyResult};

pub const DEFAULT_MAX_RESIDUAL: f64 = 1000.0;
pub const DEFAULT_MIN_SQFT: f64 = 0.0;
pub const DEFAULT_MAX_SQFT: f64 = 100_000.0;

/// Residuals are shown rounded to whole units, so anything closer than half
/// a unit is the same number on screen.
const RESIDUAL_ABS_TOLERANCE: f64 = 0.5;
const RESIDUAL_REL_TOLERANCE: f64 = 1e-6;

/// Analysis output for one study.
///
/// `None` means the backend answered with a non-2xx status or without a
/// feature array; such a dataset is absent, not failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultDataset {
    pub boundaries: Option<FeatureCollection>,
    pub stores: Option<FeatureCollection>,
}

impl ResultDataset {
    #[must_use]
    pub fn new(boundaries: Option<FeatureCollection>, stores: Option<FeatureCollection>) -> Self {
        Self { boundaries, stores }
    }
}

/// Number stored under `metadata.<key>` of a collection.
///
/// Zero, null, non-numeric and non-finite values count as missing so callers
/// fall back to their defaults.
#[must_use]
pub fn metadata_number(collection: &FeatureCollection, key: &str) -> Option<f64> {
    collection
        .foreign_members
        .as_ref()
        .and_then(|members| members.get("metadata"))
        .and_then(|metadata| metadata.get(key))
        .and_then(serde_json::Value::as_f64)
        .filter(|value| value.is_finite() && *value != 0.0)
}

/// Colour-ramp extent for the boundary choropleth.
#[must_use]
pub fn max_residual(boundaries: &FeatureCollection) -> f64 {
    metadata_number(boundaries, "max_residual")
        .map(f64::abs)
        .unwrap_or(DEFAULT_MAX_RESIDUAL)
}

/// `(min, max)` rentable square footage used to size store circles.
#[must_use]
pub fn sqft_extent(stores: &FeatureCollection) -> (f64, f64) {
    (
        metadata_number(stores, "min_sqft").unwrap_or(DEFAULT_MIN_SQFT),
        metadata_number(stores, "max_sqft").unwrap_or(DEFAULT_MAX_SQFT),
    )
}

#[must_use]
pub fn number_property(properties: &JsonObject, key: &str) -> Option<f64> {
    properties
        .get(key)
        .and_then(serde_json::Value::as_f64)
        .filter(|value| value.is_finite())
}

/// Non-empty string property.
#[must_use]
pub fn text_property<'a>(properties: &'a JsonObject, key: &str) -> Option<&'a str> {
    properties
        .get(key)
        .and_then(serde_json::Value::as_str)
        .filter(|value| !value.is_empty())
}

/// Rejects boundary features whose residual is not `supply - demand`.
///
/// Features missing any of the three numbers are left alone; the renderer
/// treats them as "N/A".
pub fn check_residuals(boundaries: &FeatureCollection) -> StudyResult<()> {
    for (index, feature) in boundaries.features.iter().enumerate() {
        let Some(properties) = &feature.properties else {
            continue;
        };
        let (Some(demand), Some(supply), Some(residual)) = (
            number_property(properties, "demand"),
            number_property(properties, "supply"),
            number_property(properties, "residual"),
        ) else {
            continue;
        };

        let expected = supply - demand;
        let scale = expected.abs().max(residual.abs());
        let tolerance = RESIDUAL_ABS_TOLERANCE.max(RESIDUAL_REL_TOLERANCE * scale);
        if (expected - residual).abs() > tolerance {
            return Err(StudyError::InvalidData(format!(
                "boundary feature {} has residual {residual} but supply - demand = {expected}",
                feature_label(feature, index)
            )));
        }
    }
    Ok(())
}

fn feature_label(feature: &Feature, index: usize) -> String {
    feature
        .properties
        .as_ref()
        .and_then(|properties| properties.get("boundary_id"))
        .map_or_else(|| format!("#{index}"), ToString::to_string)
}
