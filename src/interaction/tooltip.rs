use geojson::JsonObject;
use serde::{Deserialize, Serialize};

use crate::core::dataset::{number_property, text_property};

const MISSING_NUMBER: &str = "N/A";

/// Popup content for a clicked feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tooltip {
    pub title: String,
    pub lines: Vec<String>,
}

impl Tooltip {
    /// HTML fragment with escaped text: bold title, one `<br>` per line.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = format!("<strong>{}</strong>", escape_html(&self.title));
        for line in &self.lines {
            html.push_str("<br>");
            html.push_str(&escape_html(line));
        }
        html
    }
}

#[must_use]
pub fn boundary_tooltip(properties: &JsonObject) -> Tooltip {
    let field = |label: &str, key: &str| {
        format!(
            "{label}: {}",
            number_property(properties, key).map_or_else(|| MISSING_NUMBER.to_owned(), format_rounded)
        )
    };
    Tooltip {
        title: "Boundary Analysis".to_owned(),
        lines: vec![
            field("Demand", "demand"),
            field("Supply", "supply"),
            field("Residual", "residual"),
        ],
    }
}

#[must_use]
pub fn store_tooltip(properties: &JsonObject) -> Tooltip {
    let text = |key: &str| text_property(properties, key).unwrap_or_default().to_owned();
    Tooltip {
        title: text_property(properties, "storename")
            .unwrap_or("Store")
            .to_owned(),
        lines: vec![
            text("address"),
            text("city"),
            format!(
                "Rentable SqFt: {}",
                number_property(properties, "rentablesqft")
                    .map_or_else(|| MISSING_NUMBER.to_owned(), format_grouped)
            ),
        ],
    }
}

/// Whole number, rounding halves away from zero.
#[must_use]
pub fn format_rounded(value: f64) -> String {
    // `+ 0.0` folds -0 into 0.
    format!("{:.0}", value.round() + 0.0)
}

/// Comma-grouped thousands with at most three fraction digits.
#[must_use]
pub fn format_grouped(value: f64) -> String {
    let rounded = (value.abs() * 1000.0).round() / 1000.0;
    let integer = rounded.trunc();
    let fraction = format!("{:.3}", rounded - integer);
    let fraction = fraction.trim_start_matches('0').trim_end_matches('0');

    let digits = format!("{integer:.0}");
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 5);
    if value < 0.0 && rounded != 0.0 {
        grouped.push('-');
    }
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if fraction.len() > 1 {
        grouped.push_str(fraction);
    }
    grouped
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
