use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use smallvec::SmallVec;

use crate::core::LinearScale;
use crate::error::{StudyError, StudyResult};
use crate::render::Color;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub value: f64,
    pub color: Color,
}

/// Piecewise-linear colour interpolation over one numeric feature property.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    property: String,
    stops: SmallVec<[ColorStop; 3]>,
    missing: Color,
}

impl ColorRamp {
    /// Stops must be finite and strictly increasing.
    pub fn new(
        property: impl Into<String>,
        stops: impl IntoIterator<Item = ColorStop>,
    ) -> StudyResult<Self> {
        let stops: SmallVec<[ColorStop; 3]> = stops.into_iter().collect();
        if stops.is_empty() {
            return Err(StudyError::InvalidData(
                "color ramp needs at least one stop".to_owned(),
            ));
        }
        for stop in &stops {
            if !stop.value.is_finite() {
                return Err(StudyError::InvalidData(
                    "color stop values must be finite".to_owned(),
                ));
            }
            stop.color.validate()?;
        }
        if stops.windows(2).any(|pair| pair[0].value >= pair[1].value) {
            return Err(StudyError::InvalidData(
                "color stop values must be strictly increasing".to_owned(),
            ));
        }

        let missing = stops[stops.len() / 2].color;
        Ok(Self {
            property: property.into(),
            stops,
            missing,
        })
    }

    /// Diverging ramp centred on zero: `-extent -> low`, `0 -> mid`,
    /// `+extent -> high`.
    pub fn diverging(
        property: impl Into<String>,
        extent: f64,
        low: Color,
        mid: Color,
        high: Color,
    ) -> StudyResult<Self> {
        if !extent.is_finite() || extent <= 0.0 {
            return Err(StudyError::InvalidData(
                "diverging ramp extent must be finite and > 0".to_owned(),
            ));
        }
        Self::new(
            property,
            [
                ColorStop {
                    value: -extent,
                    color: low,
                },
                ColorStop {
                    value: 0.0,
                    color: mid,
                },
                ColorStop {
                    value: extent,
                    color: high,
                },
            ],
        )
    }

    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    #[must_use]
    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Colour for features without a usable value: the middle stop, which
    /// is the balanced colour of a diverging ramp.
    #[must_use]
    pub fn missing_color(&self) -> Color {
        self.missing
    }

    /// Colour for `value`, holding the edge stop outside the stop range.
    /// A missing or non-finite value gets [`ColorRamp::missing_color`].
    #[must_use]
    pub fn color_at(&self, value: Option<f64>) -> Color {
        let Some(value) = value.filter(|value| value.is_finite()) else {
            return self.missing;
        };
        let first = self.stops[0];
        if value <= first.value {
            return first.color;
        }
        for pair in self.stops.windows(2) {
            let (lower, upper) = (pair[0], pair[1]);
            if value <= upper.value {
                if value == upper.value {
                    return upper.color;
                }
                let t = (value - lower.value) / (upper.value - lower.value);
                return lower.color.lerp(upper.color, t);
            }
        }
        self.stops[self.stops.len() - 1].color
    }

    /// Map-style expression equivalent of [`ColorRamp::color_at`].
    #[must_use]
    pub fn to_expression(&self) -> Value {
        let mut expression = vec![
            json!("interpolate"),
            json!(["linear"]),
            json!(["get", self.property]),
        ];
        for stop in &self.stops {
            expression.push(json!(stop.value));
            expression.push(json!(stop.color.to_hex()));
        }
        json!([
            "case",
            ["==", ["typeof", ["get", self.property]], "number"],
            Value::Array(expression),
            self.missing.to_hex()
        ])
    }
}

/// Circle radius driven by the square root of a normalized property.
///
/// `radius = lerp(min_radius, max_radius, sqrt((v - lo) / (hi - lo)))`, with
/// the normalized value clamped to `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SqrtRadiusScale {
    property: String,
    value_min: f64,
    value_max: f64,
    radius: LinearScale,
}

impl SqrtRadiusScale {
    pub fn new(
        property: impl Into<String>,
        value_min: f64,
        value_max: f64,
        radius_min: f64,
        radius_max: f64,
    ) -> StudyResult<Self> {
        if !value_min.is_finite() || !value_max.is_finite() {
            return Err(StudyError::InvalidData(
                "radius scale value extent must be finite".to_owned(),
            ));
        }
        if radius_min < 0.0 || radius_max < 0.0 {
            return Err(StudyError::InvalidData(
                "circle radii must be >= 0".to_owned(),
            ));
        }
        Ok(Self {
            property: property.into(),
            value_min,
            value_max,
            radius: LinearScale::new(0.0, 1.0, radius_min, radius_max)?,
        })
    }

    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    #[must_use]
    pub fn value_extent(&self) -> (f64, f64) {
        (self.value_min, self.value_max)
    }

    /// Radius for `value`; a missing value or a collapsed extent gets the
    /// smallest radius.
    #[must_use]
    pub fn radius_at(&self, value: Option<f64>) -> f64 {
        let normalized = match (
            value,
            LinearScale::new(self.value_min, self.value_max, 0.0, 1.0),
        ) {
            (Some(value), Ok(extent)) => extent.normalize(value),
            _ => 0.0,
        };
        self.radius.map(normalized.sqrt())
    }

    #[must_use]
    pub fn to_expression(&self) -> Value {
        let (radius_min, radius_max) = self.radius.range();
        json!([
            "interpolate",
            ["linear"],
            [
                "sqrt",
                [
                    "/",
                    ["-", ["get", self.property], self.value_min],
                    ["-", self.value_max, self.value_min]
                ]
            ],
            0,
            radius_min,
            1,
            radius_max
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillPaint {
    pub color: ColorRamp,
    pub opacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePaint {
    pub color: Color,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CirclePaint {
    pub radius: SqrtRadiusScale,
    pub color: Color,
    pub stroke_color: Color,
    pub stroke_width: f64,
}

/// Data-driven paint for one vector layer.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerPaint {
    Fill(FillPaint),
    Line(LinePaint),
    Circle(CirclePaint),
}

impl LayerPaint {
    pub fn validate(&self) -> StudyResult<()> {
        let (label, value) = match self {
            Self::Fill(paint) => ("fill opacity", paint.opacity),
            Self::Line(paint) => {
                paint.color.validate()?;
                ("line width", paint.width)
            }
            Self::Circle(paint) => {
                paint.color.validate()?;
                paint.stroke_color.validate()?;
                ("circle stroke width", paint.stroke_width)
            }
        };
        if !value.is_finite() || value < 0.0 {
            return Err(StudyError::InvalidData(format!(
                "{label} must be finite and >= 0"
            )));
        }
        if let Self::Fill(paint) = self {
            if paint.opacity > 1.0 {
                return Err(StudyError::InvalidData(
                    "fill opacity must be <= 1".to_owned(),
                ));
            }
        }
        Ok(())
    }

    /// `paint` object of a map-style layer definition.
    #[must_use]
    pub fn to_style_json(&self) -> Value {
        match self {
            Self::Fill(paint) => json!({
                "fill-color": paint.color.to_expression(),
                "fill-opacity": paint.opacity,
            }),
            Self::Line(paint) => json!({
                "line-color": paint.color.to_hex(),
                "line-width": paint.width,
            }),
            Self::Circle(paint) => json!({
                "circle-radius": paint.radius.to_expression(),
                "circle-color": paint.color.to_hex(),
                "circle-stroke-width": paint.stroke_width,
                "circle-stroke-color": paint.stroke_color.to_hex(),
            }),
        }
    }
}
