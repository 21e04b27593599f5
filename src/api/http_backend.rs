use async_trait::async_trait;
use geojson::FeatureCollection;
use reqwest::{Client, RequestBuilder};
use tracing::debug;

use crate::api::SessionConfig;
use crate::api::backend::{
    CONFIG_PATH, CUSTOMERS_PATH, STUDIES_PATH, StudyBackend, analysis_path, boundaries_path,
    decode_ack, decode_customers, decode_feature_collection, decode_json, process_path,
    stores_path,
};
use crate::core::{ClientConfig, CreateStudyRequest, Customer, StudyId, StudyRecord};
use crate::error::{StudyError, StudyResult};

/// [`StudyBackend`] speaking JSON over HTTP.
pub struct HttpStudyBackend {
    client: Client,
    config: SessionConfig,
}

impl HttpStudyBackend {
    /// Needs an absolute `api_base_url`.
    pub fn new(config: SessionConfig) -> StudyResult<Self> {
        config.validate()?;
        if config.api_base_url.trim().is_empty() {
            return Err(StudyError::InvalidData(
                "http backend needs an absolute api base url".to_owned(),
            ));
        }

        let builder = Client::builder();
        // Browser fetch has no per-request timeout.
        #[cfg(not(target_arch = "wasm32"))]
        let builder = match config.request_timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };
        let client = builder
            .build()
            .map_err(|e| StudyError::Transport(format!("http client error: {e}")))?;

        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    async fn send(&self, request: RequestBuilder) -> StudyResult<(u16, String)> {
        let response = request
            .send()
            .await
            .map_err(|e| StudyError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| StudyError::Transport(e.to_string()))?;
        debug!(%url, status, bytes = body.len(), "backend response");
        Ok((status, body))
    }

    async fn get(&self, path: &str) -> StudyResult<(u16, String)> {
        self.send(self.client.get(self.config.endpoint(path))).await
    }

    async fn post_empty(&self, path: &str) -> StudyResult<(u16, String)> {
        self.send(
            self.client
                .post(self.config.endpoint(path))
                .header(reqwest::header::CONTENT_TYPE, "application/json"),
        )
        .await
    }
}

#[async_trait(?Send)]
impl StudyBackend for HttpStudyBackend {
    async fn client_config(&self) -> StudyResult<ClientConfig> {
        let (status, body) = self.get(CONFIG_PATH).await?;
        decode_json(status, &body)
    }

    async fn customers(&self) -> StudyResult<Vec<Customer>> {
        let (status, body) = self.get(CUSTOMERS_PATH).await?;
        decode_customers(status, &body)
    }

    async fn create_study(&self, request: &CreateStudyRequest) -> StudyResult<StudyRecord> {
        let (status, body) = self
            .send(
                self.client
                    .post(self.config.endpoint(STUDIES_PATH))
                    .json(request),
            )
            .await?;
        decode_json(status, &body)
    }

    async fn process_study(&self, study_id: StudyId) -> StudyResult<()> {
        let (status, body) = self.post_empty(&process_path(study_id)).await?;
        decode_ack(status, &body)
    }

    async fn run_analysis(&self, study_id: StudyId) -> StudyResult<()> {
        let (status, body) = self.post_empty(&analysis_path(study_id)).await?;
        decode_ack(status, &body)
    }

    async fn boundaries(&self, study_id: StudyId) -> StudyResult<Option<FeatureCollection>> {
        let (status, body) = self.get(&boundaries_path(study_id)).await?;
        decode_feature_collection(status, &body)
    }

    async fn stores(&self, study_id: StudyId) -> StudyResult<Option<FeatureCollection>> {
        let (status, body) = self.get(&stores_path(study_id)).await?;
        decode_feature_collection(status, &body)
    }
}
