#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use async_trait::async_trait;
use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::json;
use study_map::api::{ControlState, StudyBackend, StudyView};
use study_map::core::{
    ClientConfig, CreateStudyRequest, Customer, CustomerId, StudyId, StudyRecord,
};
use study_map::error::{StudyError, StudyResult};
use study_map::interaction::CaptureStatus;

/// Backend answering from canned data and recording every call.
pub struct ScriptedBackend {
    study_id: u64,
    client_config: ClientConfig,
    customers: Vec<Customer>,
    boundaries: Option<FeatureCollection>,
    stores: Option<FeatureCollection>,
    calls: RefCell<Vec<&'static str>>,
    last_request: RefCell<Option<CreateStudyRequest>>,
    create_failures: RefCell<VecDeque<StudyError>>,
    process_failures: RefCell<VecDeque<StudyError>>,
    analysis_failures: RefCell<VecDeque<StudyError>>,
    stores_failures: RefCell<VecDeque<StudyError>>,
}

impl ScriptedBackend {
    pub fn new(study_id: u64) -> Self {
        Self {
            study_id,
            client_config: ClientConfig {
                mapbox_token: Some("pk.test".to_owned()),
            },
            customers: vec![Customer {
                id: CustomerId::new(3),
                name: "Fraser Valley Storage".to_owned(),
            }],
            boundaries: Some(surrey_boundaries()),
            stores: Some(surrey_stores()),
            calls: RefCell::new(Vec::new()),
            last_request: RefCell::new(None),
            create_failures: RefCell::new(VecDeque::new()),
            process_failures: RefCell::new(VecDeque::new()),
            analysis_failures: RefCell::new(VecDeque::new()),
            stores_failures: RefCell::new(VecDeque::new()),
        }
    }

    pub fn with_results(
        mut self,
        boundaries: Option<FeatureCollection>,
        stores: Option<FeatureCollection>,
    ) -> Self {
        self.boundaries = boundaries;
        self.stores = stores;
        self
    }

    pub fn with_client_config(mut self, client_config: ClientConfig) -> Self {
        self.client_config = client_config;
        self
    }

    pub fn fail_next_create(self, err: StudyError) -> Self {
        self.create_failures.borrow_mut().push_back(err);
        self
    }

    pub fn fail_next_process(self, err: StudyError) -> Self {
        self.process_failures.borrow_mut().push_back(err);
        self
    }

    pub fn fail_next_analysis(self, err: StudyError) -> Self {
        self.analysis_failures.borrow_mut().push_back(err);
        self
    }

    pub fn fail_next_stores(self, err: StudyError) -> Self {
        self.stores_failures.borrow_mut().push_back(err);
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    pub fn last_request(&self) -> Option<CreateStudyRequest> {
        self.last_request.borrow().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.borrow_mut().push(call);
    }
}

fn next_failure(queue: &RefCell<VecDeque<StudyError>>) -> StudyResult<()> {
    match queue.borrow_mut().pop_front() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[async_trait(?Send)]
impl StudyBackend for ScriptedBackend {
    async fn client_config(&self) -> StudyResult<ClientConfig> {
        self.record("config");
        Ok(self.client_config.clone())
    }

    async fn customers(&self) -> StudyResult<Vec<Customer>> {
        self.record("customers");
        Ok(self.customers.clone())
    }

    async fn create_study(&self, request: &CreateStudyRequest) -> StudyResult<StudyRecord> {
        self.record("create");
        next_failure(&self.create_failures)?;
        *self.last_request.borrow_mut() = Some(request.clone());
        Ok(StudyRecord {
            study_id: StudyId::new(self.study_id),
            name: request.name.clone(),
        })
    }

    async fn process_study(&self, _study_id: StudyId) -> StudyResult<()> {
        self.record("process");
        next_failure(&self.process_failures)
    }

    async fn run_analysis(&self, _study_id: StudyId) -> StudyResult<()> {
        self.record("analysis");
        next_failure(&self.analysis_failures)
    }

    async fn boundaries(&self, _study_id: StudyId) -> StudyResult<Option<FeatureCollection>> {
        self.record("boundaries");
        Ok(self.boundaries.clone())
    }

    async fn stores(&self, _study_id: StudyId) -> StudyResult<Option<FeatureCollection>> {
        self.record("stores");
        next_failure(&self.stores_failures)?;
        Ok(self.stores.clone())
    }
}

/// View that remembers everything it was asked to show.
#[derive(Debug, Default)]
pub struct RecordingView {
    pub progress: Vec<(String, u8)>,
    pub progress_visible: bool,
    pub errors: Vec<String>,
    pub error_visible: bool,
    pub controls: ControlState,
    pub capture: Vec<CaptureStatus>,
    pub studies: Vec<StudyRecord>,
    pub results: Vec<String>,
}

impl RecordingView {
    pub fn last_progress(&self) -> Option<(&str, u8)> {
        self.progress
            .last()
            .map(|(message, percentage)| (message.as_str(), *percentage))
    }

    pub fn last_error(&self) -> Option<&str> {
        self.errors.last().map(String::as_str)
    }
}

impl StudyView for RecordingView {
    fn show_progress(&mut self, message: &str, percentage: u8) {
        self.progress.push((message.to_owned(), percentage));
        self.progress_visible = true;
    }

    fn hide_progress(&mut self) {
        self.progress_visible = false;
    }

    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_owned());
        self.error_visible = true;
    }

    fn hide_error(&mut self) {
        self.error_visible = false;
    }

    fn apply_controls(&mut self, controls: &ControlState) {
        self.controls = *controls;
    }

    fn show_capture_status(&mut self, status: CaptureStatus) {
        self.capture.push(status);
    }

    fn show_study(&mut self, record: &StudyRecord) {
        self.studies.push(record.clone());
    }

    fn show_results(&mut self, message: &str) {
        self.results.push(message.to_owned());
    }
}

/// Five-vertex study area around Surrey North, closed ring.
pub fn surrey_north_area() -> Feature {
    Feature::from(Geometry::new(Value::Polygon(vec![vec![
        vec![-122.90, 49.18],
        vec![-122.80, 49.18],
        vec![-122.78, 49.21],
        vec![-122.85, 49.24],
        vec![-122.91, 49.21],
        vec![-122.90, 49.18],
    ]])))
}

pub fn collection(value: serde_json::Value) -> FeatureCollection {
    serde_json::from_value(value).expect("valid feature collection fixture")
}

/// Two boundaries: one undersupplied by 500, one oversupplied by 250.
pub fn surrey_boundaries() -> FeatureCollection {
    collection(json!({
        "type": "FeatureCollection",
        "metadata": { "max_residual": 1000 },
        "features": [
            {
                "type": "Feature",
                "properties": {
                    "boundary_id": "59150001", "demand": 1500.0, "supply": 1000.0, "residual": -500.0
                },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-122.90, 49.18], [-122.85, 49.18], [-122.85, 49.22], [-122.90, 49.18]]]
                }
            },
            {
                "type": "Feature",
                "properties": {
                    "boundary_id": "59150002", "demand": 750.0, "supply": 1000.0, "residual": 250.0
                },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[-122.85, 49.18], [-122.80, 49.18], [-122.80, 49.23], [-122.85, 49.18]]],
                        [[[-122.79, 49.20], [-122.77, 49.20], [-122.77, 49.21], [-122.79, 49.20]]]
                    ]
                }
            }
        ]
    }))
}

/// One store at 25,000 sqft inside a 0..100,000 extent.
pub fn surrey_stores() -> FeatureCollection {
    collection(json!({
        "type": "FeatureCollection",
        "metadata": { "min_sqft": 0, "max_sqft": 100000 },
        "features": [
            {
                "type": "Feature",
                "properties": {
                    "storename": "Guildford Self Storage",
                    "address": "10250 152 St",
                    "city": "Surrey",
                    "rentablesqft": 25000
                },
                "geometry": { "type": "Point", "coordinates": [-122.81, 49.19] }
            }
        ]
    }))
}

pub fn empty_collection() -> FeatureCollection {
    collection(json!({ "type": "FeatureCollection", "features": [] }))
}
