use std::time::Duration;

use tracing::{debug, info};

use crate::api::backend::StudyBackend;
use crate::api::lifecycle::{ControlState, FailedStage, LifecyclePhase};
use crate::api::progress::{ProgressReporter, StudyView};
use crate::api::SessionConfig;
use crate::core::{ClientConfig, Customer, ResultDataset, StudyDraft, StudyId, StudyRecord};
use crate::error::{StudyError, StudyResult};
use crate::interaction::{CaptureStatus, DrawEvent, DrawMode, GeometryCapture};
use crate::render::{MapSurface, RenderOutcome, ResultRenderer};

const NO_STUDY_MESSAGE: &str = "No study selected.";
const MISSING_TOKEN_MESSAGE: &str =
    "MapBox token not configured. Please set MB_PUBLIC_KEY in your environment.";

/// One study session: draw an area, create the study, process it, run the
/// analysis and show the results.
///
/// Every operation takes `&mut self`, so at most one backend step is ever
/// in flight. Failures are reported through the view and also returned.
pub struct StudyLifecycle<B, M, V>
where
    B: StudyBackend,
    M: MapSurface,
    V: StudyView,
{
    config: SessionConfig,
    backend: B,
    map: M,
    reporter: ProgressReporter<V>,
    capture: GeometryCapture,
    renderer: ResultRenderer,
    phase: LifecyclePhase,
    record: Option<StudyRecord>,
    submitted: Option<StudyDraft>,
    submitting: bool,
    last_render: Option<RenderOutcome>,
}

impl<B, M, V> StudyLifecycle<B, M, V>
where
    B: StudyBackend,
    M: MapSurface,
    V: StudyView,
{
    pub fn new(config: SessionConfig, backend: B, mut map: M, view: V) -> StudyResult<Self> {
        config.validate()?;
        map.set_caption(Some(config.draw_caption.as_str()));

        let mut session = Self {
            reporter: ProgressReporter::new(view, config.error_dismiss_after),
            renderer: ResultRenderer::new(config.result_style.clone()),
            config,
            backend,
            map,
            capture: GeometryCapture::new(),
            phase: LifecyclePhase::Idle,
            record: None,
            submitted: None,
            submitting: false,
            last_render: None,
        };
        let status = session.capture.status();
        session.reporter.view_mut().show_capture_status(status);
        session.publish_controls();
        Ok(session)
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    #[must_use]
    pub fn record(&self) -> Option<&StudyRecord> {
        self.record.as_ref()
    }

    #[must_use]
    pub fn study_id(&self) -> Option<StudyId> {
        self.record.as_ref().map(|record| record.study_id)
    }

    /// Draft the current study was created from.
    #[must_use]
    pub fn submitted_draft(&self) -> Option<&StudyDraft> {
        self.submitted.as_ref()
    }

    #[must_use]
    pub fn capture(&self) -> &GeometryCapture {
        &self.capture
    }

    #[must_use]
    pub fn controls(&self) -> ControlState {
        ControlState::derive(self.phase, self.capture.status().is_ready(), self.submitting)
    }

    #[must_use]
    pub fn last_render(&self) -> Option<RenderOutcome> {
        self.last_render
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    #[must_use]
    pub fn reporter(&self) -> &ProgressReporter<V> {
        &self.reporter
    }

    #[must_use]
    pub fn view(&self) -> &V {
        self.reporter.view()
    }

    /// Drives delayed status messages and error dismissal.
    pub fn advance(&mut self, elapsed: Duration) {
        self.reporter.advance(elapsed);
    }

    /// Fills `draft`'s area from the captured polygon.
    #[must_use]
    pub fn with_captured_area(&self, draft: StudyDraft) -> StudyDraft {
        match self.capture.current_feature() {
            Some(feature) => draft.with_geometry(feature.clone()),
            None => draft,
        }
    }

    /// Feeds a draw-control event into the capture.
    pub fn handle_draw_event(&mut self, event: DrawEvent) -> CaptureStatus {
        let starts_drawing = matches!(event, DrawEvent::ModeChanged(DrawMode::DrawPolygon));
        if starts_drawing && self.phase.is_drafting() {
            self.map.set_caption(None);
        }

        let status = self.capture.apply(event);
        if self.phase.is_drafting() {
            let next = if status.is_ready() {
                LifecyclePhase::Drawing
            } else {
                LifecyclePhase::Idle
            };
            if next != self.phase {
                self.enter(next);
            }
        }
        self.reporter.view_mut().show_capture_status(status);
        self.publish_controls();
        status
    }

    pub async fn load_client_config(&mut self) -> StudyResult<ClientConfig> {
        match self.backend.client_config().await {
            Ok(client) => {
                if client.map_token().is_none() {
                    self.reporter.fail(MISSING_TOKEN_MESSAGE);
                }
                Ok(client)
            }
            Err(err) => {
                self.reporter
                    .fail(format!("Failed to load configuration: {}", err.user_detail()));
                Err(err)
            }
        }
    }

    pub async fn load_customers(&mut self) -> StudyResult<Vec<Customer>> {
        match self.backend.customers().await {
            Ok(customers) => {
                debug!(count = customers.len(), "loaded customers");
                Ok(customers)
            }
            Err(err) => {
                self.reporter
                    .fail(format!("Failed to load customers: {}", err.user_detail()));
                Err(err)
            }
        }
    }

    /// Validates `draft` and submits it. Validation failures never reach
    /// the backend and leave the phase unchanged.
    pub async fn create_study(&mut self, draft: StudyDraft) -> StudyResult<StudyRecord> {
        if !self.phase.is_drafting() {
            return Err(self.reject(StudyError::State(format!(
                "a study already exists in this session ({})",
                self.phase
            ))));
        }
        let request = match draft.validate() {
            Ok(request) => request,
            Err(err) => return Err(self.reject(err)),
        };

        self.submitting = true;
        self.publish_controls();
        self.reporter.report("Creating study...", 10);
        let result = self.backend.create_study(&request).await;
        self.submitting = false;

        match result {
            Ok(record) => {
                self.transition(LifecyclePhase::Created)?;
                info!(study_id = %record.study_id, name = %record.name, "study created");
                self.capture.lock();
                self.map.set_draw_mode(DrawMode::SimpleSelect);
                self.record = Some(record.clone());
                self.submitted = Some(draft);
                self.reporter.view_mut().show_study(&record);
                self.reporter.report("Study created successfully!", 100);
                self.reporter.clear_after(self.config.status_delay);
                self.publish_controls();
                Ok(record)
            }
            Err(err) => {
                self.reporter
                    .fail(format!("Failed to create study: {}", err.user_detail()));
                self.reporter.clear();
                self.publish_controls();
                Err(err)
            }
        }
    }

    /// Runs demand/supply computation for the created study.
    pub async fn process_study(&mut self) -> StudyResult<()> {
        let study_id = self.require_study()?;
        if !matches!(
            self.phase,
            LifecyclePhase::Created | LifecyclePhase::Failed(FailedStage::Processing)
        ) {
            return Err(self.reject(StudyError::State(format!(
                "cannot process a study that is {}",
                self.phase
            ))));
        }

        self.transition(LifecyclePhase::Processing)?;
        self.publish_controls();
        self.reporter
            .report("Processing study... This may take several minutes.", 20);

        match self.backend.process_study(study_id).await {
            Ok(()) => {
                self.transition(LifecyclePhase::Processed)?;
                self.reporter
                    .report("Study processed! Demand and supply calculated.", 70);
                self.reporter
                    .report_after(self.config.status_delay, "Ready to generate map.", 70);
                self.publish_controls();
                Ok(())
            }
            Err(err) => {
                self.transition(LifecyclePhase::Failed(FailedStage::Processing))?;
                self.reporter
                    .fail(format!("Failed to process study: {}", err.user_detail()));
                self.reporter.clear();
                self.publish_controls();
                Err(err)
            }
        }
    }

    /// Runs the final analysis, fetches both result sets and renders them.
    pub async fn run_analysis(&mut self) -> StudyResult<RenderOutcome> {
        let study_id = self.require_study()?;
        if !matches!(
            self.phase,
            LifecyclePhase::Processed | LifecyclePhase::Failed(FailedStage::Analysis)
        ) {
            return Err(self.reject(StudyError::State(format!(
                "cannot run analysis on a study that is {}",
                self.phase
            ))));
        }

        self.transition(LifecyclePhase::Analyzing)?;
        self.publish_controls();
        self.reporter.report("Running final analysis...", 80);

        match self.analyze_and_render(study_id).await {
            Ok(outcome) => {
                self.transition(LifecyclePhase::Rendered)?;
                self.last_render = Some(outcome);
                self.reporter.report("Analysis complete!", 100);
                self.reporter
                    .view_mut()
                    .show_results("Analysis results are displayed on the map.");
                self.publish_controls();
                Ok(outcome)
            }
            Err(err) => {
                self.transition(LifecyclePhase::Failed(FailedStage::Analysis))?;
                self.reporter
                    .fail(format!("Failed to run analysis: {}", err.user_detail()));
                self.reporter.clear();
                self.publish_controls();
                Err(err)
            }
        }
    }

    async fn analyze_and_render(&mut self, study_id: StudyId) -> StudyResult<RenderOutcome> {
        self.backend.run_analysis(study_id).await?;
        self.reporter.report("Loading results on map...", 90);
        let dataset = self.load_results(study_id).await?;
        self.renderer.render(&mut self.map, &dataset)
    }

    /// Fetches boundaries and stores concurrently; either failing fails both.
    async fn load_results(&self, study_id: StudyId) -> StudyResult<ResultDataset> {
        let (boundaries, stores) = futures::join!(
            self.backend.boundaries(study_id),
            self.backend.stores(study_id)
        );
        match (boundaries, stores) {
            (Ok(boundaries), Ok(stores)) => {
                debug!(
                    %study_id,
                    boundaries = boundaries.is_some(),
                    stores = stores.is_some(),
                    "fetched study results"
                );
                Ok(ResultDataset::new(boundaries, stores))
            }
            (Err(err), _) | (_, Err(err)) => Err(StudyError::ResultLoad(err.user_detail())),
        }
    }

    fn require_study(&mut self) -> StudyResult<StudyId> {
        match self.study_id() {
            Some(study_id) => Ok(study_id),
            None => Err(self.reject(StudyError::State(NO_STUDY_MESSAGE.to_owned()))),
        }
    }

    /// Reports an error raised before any backend call and hands it back.
    fn reject(&mut self, err: StudyError) -> StudyError {
        let message = match &err {
            StudyError::State(message) | StudyError::Validation(message) => message.clone(),
            other => other.to_string(),
        };
        self.reporter.fail(message);
        err
    }

    fn transition(&mut self, to: LifecyclePhase) -> StudyResult<()> {
        self.phase.validate_transition(to)?;
        self.enter(to);
        Ok(())
    }

    fn enter(&mut self, to: LifecyclePhase) {
        debug!(from = %self.phase, to = %to, study_id = ?self.study_id(), "lifecycle transition");
        self.phase = to;
    }

    fn publish_controls(&mut self) {
        let controls = self.controls();
        self.reporter.view_mut().apply_controls(&controls);
    }
}
