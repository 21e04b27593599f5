use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{LngLat, MapView};
use crate::error::{StudyError, StudyResult};
use crate::render::ResultStyle;

/// Session bootstrap configuration.
///
/// Serializable so hosts can ship it as JSON next to the page instead of
/// inventing their own format. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Origin the backend API paths are resolved against.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Per-request timeout. `None` waits indefinitely.
    #[serde(default, with = "optional_millis")]
    pub request_timeout: Option<Duration>,
    #[serde(default = "default_initial_view")]
    pub initial_view: MapView,
    #[serde(default = "default_map_style_url")]
    pub map_style_url: String,
    /// Caption shown over the map while a study area is being drawn.
    #[serde(default = "default_draw_caption")]
    pub draw_caption: String,
    #[serde(default)]
    pub result_style: ResultStyle,
    /// How long an error stays visible before dismissing itself.
    #[serde(default = "default_error_dismiss_after", with = "millis")]
    pub error_dismiss_after: Duration,
    /// Delay before a transient status message is replaced or cleared.
    #[serde(default = "default_status_delay", with = "millis")]
    pub status_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout: None,
            initial_view: default_initial_view(),
            map_style_url: default_map_style_url(),
            draw_caption: default_draw_caption(),
            result_style: ResultStyle::default(),
            error_dismiss_after: default_error_dismiss_after(),
            status_delay: default_status_delay(),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_initial_view(mut self, view: MapView) -> Self {
        self.initial_view = view;
        self
    }

    #[must_use]
    pub fn with_result_style(mut self, style: ResultStyle) -> Self {
        self.result_style = style;
        self
    }

    #[must_use]
    pub fn with_error_dismiss_after(mut self, delay: Duration) -> Self {
        self.error_dismiss_after = delay;
        self
    }

    #[must_use]
    pub fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = delay;
        self
    }

    pub fn validate(&self) -> StudyResult<()> {
        let base = self.api_base_url.trim();
        if !(base.is_empty() || base.starts_with("http://") || base.starts_with("https://")) {
            return Err(StudyError::InvalidData(format!(
                "api base url `{base}` must be empty or start with http:// or https://"
            )));
        }
        if self.request_timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(StudyError::InvalidData(
                "request timeout must be > 0 when set".to_owned(),
            ));
        }
        if self.map_style_url.trim().is_empty() {
            return Err(StudyError::InvalidData(
                "map style url must not be empty".to_owned(),
            ));
        }
        let view = self.initial_view;
        if !view.center.lng.is_finite()
            || !view.center.lat.is_finite()
            || !(0.0..=24.0).contains(&view.zoom)
        {
            return Err(StudyError::InvalidData(
                "initial view needs a finite center and zoom in [0, 24]".to_owned(),
            ));
        }
        self.result_style.validate()
    }

    /// Parses and validates a JSON config document.
    pub fn from_json_str(input: &str) -> StudyResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| StudyError::InvalidData(format!("failed to parse session config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> StudyResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| StudyError::InvalidData(format!("failed to serialize session config: {e}")))
    }

    /// Absolute URL for an API path such as `/api/config/`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn default_api_base_url() -> String {
    String::new()
}

fn default_initial_view() -> MapView {
    MapView::new(LngLat::new(-122.85, 49.19), 10.0)
}

fn default_map_style_url() -> String {
    "mapbox://styles/mapbox/streets-v12".to_owned()
}

fn default_draw_caption() -> String {
    "Draw a polygon on the map to define the study area.".to_owned()
}

fn default_error_dismiss_after() -> Duration {
    Duration::from_secs(10)
}

fn default_status_delay() -> Duration {
    Duration::from_secs(2)
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

mod optional_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => {
                serializer.serialize_some(&u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
            }
            None => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(deserializer).map(|millis| millis.map(Duration::from_millis))
    }
}
