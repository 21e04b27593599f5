use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{StudyError, StudyResult};

/// Which backend step a failed study was stuck on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedStage {
    Processing,
    Analysis,
}

/// Where a study session is in its create → process → analyse sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    #[default]
    Idle,
    /// A valid polygon is captured and no study exists yet.
    Drawing,
    Created,
    Processing,
    Processed,
    Analyzing,
    /// Terminal: results are on the map.
    Rendered,
    /// Retryable failure of a backend step.
    Failed(FailedStage),
}

impl LifecyclePhase {
    /// Phases reachable from `self` in one step.
    #[must_use]
    pub const fn allowed_transitions(self) -> &'static [LifecyclePhase] {
        use LifecyclePhase::*;
        match self {
            Idle => &[Drawing, Created],
            Drawing => &[Idle, Created],
            Created => &[Processing],
            Processing => &[Processed, Failed(FailedStage::Processing)],
            Failed(FailedStage::Processing) => &[Processing],
            Processed => &[Analyzing],
            Analyzing => &[Rendered, Failed(FailedStage::Analysis)],
            Failed(FailedStage::Analysis) => &[Analyzing],
            Rendered => &[],
        }
    }

    pub fn validate_transition(self, to: LifecyclePhase) -> StudyResult<()> {
        if self.allowed_transitions().contains(&to) {
            Ok(())
        } else {
            Err(StudyError::State(format!("cannot move from {self} to {to}")))
        }
    }

    /// No study exists yet; the draft form is editable.
    #[must_use]
    pub const fn is_drafting(self) -> bool {
        matches!(self, Self::Idle | Self::Drawing)
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Drawing => "drawing",
            Self::Created => "created",
            Self::Processing => "processing",
            Self::Processed => "processed",
            Self::Analyzing => "analyzing",
            Self::Rendered => "rendered",
            Self::Failed(FailedStage::Processing) => "failed (processing)",
            Self::Failed(FailedStage::Analysis) => "failed (analysis)",
        };
        f.write_str(label)
    }
}

/// Enabled/visible flags for the session's controls, derived from the
/// phase so they can never disagree with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    pub create_enabled: bool,
    pub process_enabled: bool,
    pub analysis_enabled: bool,
    /// Study form fields are read-only.
    pub form_locked: bool,
    pub drawing_enabled: bool,
    pub analysis_section_visible: bool,
    pub results_visible: bool,
}

impl ControlState {
    /// `area_ready` is whether a polygon is captured; `submitting` is whether
    /// a create request is in flight.
    #[must_use]
    pub fn derive(phase: LifecyclePhase, area_ready: bool, submitting: bool) -> Self {
        let drafting = phase.is_drafting();
        Self {
            create_enabled: drafting && area_ready && !submitting,
            process_enabled: matches!(
                phase,
                LifecyclePhase::Created | LifecyclePhase::Failed(FailedStage::Processing)
            ),
            analysis_enabled: matches!(
                phase,
                LifecyclePhase::Processed | LifecyclePhase::Failed(FailedStage::Analysis)
            ),
            form_locked: !drafting || submitting,
            drawing_enabled: drafting && !submitting,
            analysis_section_visible: !drafting,
            results_visible: phase == LifecyclePhase::Rendered,
        }
    }
}
