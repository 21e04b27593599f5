use std::fmt;

use geojson::Feature;
use serde::{Deserialize, Serialize};

use crate::core::geometry::is_polygon;
use crate::error::{StudyError, StudyResult};

/// Server-assigned study identifier. Only ever echoed back in request paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudyId(u64);

impl StudyId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StudyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(u32);

impl CustomerId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
}

/// Census geography a study is analysed against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Country {
    #[default]
    #[serde(rename = "CA")]
    Canada,
    #[serde(rename = "US")]
    UnitedStates,
}

impl Country {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Canada => "CA",
            Self::UnitedStates => "US",
        }
    }
}

/// Study form contents plus the captured area, prior to submission.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyDraft {
    pub customer_id: Option<CustomerId>,
    pub name: String,
    pub description: String,
    pub country: Country,
    pub geometry: Option<Feature>,
}

impl StudyDraft {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            customer_id: None,
            name: name.into(),
            description: String::new(),
            country: Country::default(),
            geometry: None,
        }
    }

    #[must_use]
    pub fn with_customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_country(mut self, country: Country) -> Self {
        self.country = country;
        self
    }

    #[must_use]
    pub fn with_geometry(mut self, geometry: Feature) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Checks the draft and produces the create-study request body.
    ///
    /// The area is checked before the customer so the user is first pointed
    /// at the map.
    pub fn validate(&self) -> StudyResult<CreateStudyRequest> {
        let Some(geometry) = &self.geometry else {
            return Err(StudyError::Validation(
                "Please draw a study area on the map first.".to_owned(),
            ));
        };
        let Some(customer_id) = self.customer_id else {
            return Err(StudyError::Validation(
                "Please select a customer.".to_owned(),
            ));
        };
        if !is_polygon(geometry) {
            return Err(StudyError::Validation(
                "The study area must be a single polygon.".to_owned(),
            ));
        }

        Ok(CreateStudyRequest {
            customer_id,
            name: self.name.clone(),
            description: self.description.clone(),
            country: self.country,
            geometry: geometry.clone(),
        })
    }
}

/// Body of the create-study request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateStudyRequest {
    pub customer_id: CustomerId,
    pub name: String,
    pub description: String,
    pub country: Country,
    pub geometry: Feature,
}

/// A study the backend accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyRecord {
    pub study_id: StudyId,
    pub name: String,
}

/// Client configuration served by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub mapbox_token: Option<String>,
}

impl ClientConfig {
    /// Token usable by the map, ignoring the empty string the server sends
    /// when the key is unset.
    #[must_use]
    pub fn map_token(&self) -> Option<&str> {
        self.mapbox_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }
}
