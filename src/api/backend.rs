use async_trait::async_trait;
use geojson::FeatureCollection;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::{ClientConfig, CreateStudyRequest, Customer, StudyId, StudyRecord};
use crate::error::{StudyError, StudyResult};

pub const CONFIG_PATH: &str = "/api/config/";
pub const CUSTOMERS_PATH: &str = "/api/customers/";
pub const STUDIES_PATH: &str = "/api/studies/";

#[must_use]
pub fn process_path(study_id: StudyId) -> String {
    format!("/api/studies/{study_id}/process/")
}

#[must_use]
pub fn analysis_path(study_id: StudyId) -> String {
    format!("/api/studies/{study_id}/analysis/")
}

#[must_use]
pub fn boundaries_path(study_id: StudyId) -> String {
    format!("/api/studies/{study_id}/boundaries.geojson")
}

#[must_use]
pub fn stores_path(study_id: StudyId) -> String {
    format!("/api/studies/{study_id}/stores.geojson")
}

/// Remote study service.
///
/// Result fetches return `Ok(None)` when the server has nothing to show
/// (non-2xx or no `features`); `Err` is reserved for transport and decode
/// failures.
#[async_trait(?Send)]
pub trait StudyBackend {
    async fn client_config(&self) -> StudyResult<ClientConfig>;

    async fn customers(&self) -> StudyResult<Vec<Customer>>;

    async fn create_study(&self, request: &CreateStudyRequest) -> StudyResult<StudyRecord>;

    /// Runs demand/supply computation. May take minutes.
    async fn process_study(&self, study_id: StudyId) -> StudyResult<()>;

    async fn run_analysis(&self, study_id: StudyId) -> StudyResult<()>;

    async fn boundaries(&self, study_id: StudyId) -> StudyResult<Option<FeatureCollection>>;

    async fn stores(&self, study_id: StudyId) -> StudyResult<Option<FeatureCollection>>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CustomersBody {
    customers: Vec<Customer>,
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn backend_error(status: u16, body: &str) -> StudyError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.error);
    StudyError::Backend { status, message }
}

/// Decodes a JSON response body, turning non-2xx into
/// [`StudyError::Backend`] carrying the server's `error` field.
pub fn decode_json<T: DeserializeOwned>(status: u16, body: &str) -> StudyResult<T> {
    if !is_success(status) {
        return Err(backend_error(status, body));
    }
    serde_json::from_str(body).map_err(|e| StudyError::Decode(e.to_string()))
}

/// Like [`decode_json`] for endpoints whose success body carries nothing
/// the client needs.
pub fn decode_ack(status: u16, body: &str) -> StudyResult<()> {
    decode_json::<Value>(status, body).map(|_| ())
}

pub fn decode_customers(status: u16, body: &str) -> StudyResult<Vec<Customer>> {
    decode_json::<CustomersBody>(status, body).map(|body| body.customers)
}

/// Decodes a GeoJSON result fetch. Non-2xx and bodies without a
/// `features` array mean "absent".
pub fn decode_feature_collection(
    status: u16,
    body: &str,
) -> StudyResult<Option<FeatureCollection>> {
    if !is_success(status) {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(body).map_err(|e| StudyError::Decode(e.to_string()))?;
    if !value.get("features").is_some_and(Value::is_array) {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| StudyError::Decode(format!("invalid feature collection: {e}")))
}
