use std::time::Duration;

use tracing::{trace, warn};

use crate::core::StudyRecord;
use crate::interaction::CaptureStatus;

use super::ControlState;

/// UI widgets the session drives: progress bar, error panel, action
/// controls and the study/result panels.
pub trait StudyView {
    fn show_progress(&mut self, message: &str, percentage: u8);
    fn hide_progress(&mut self);
    fn show_error(&mut self, message: &str);
    fn hide_error(&mut self);
    fn apply_controls(&mut self, controls: &ControlState);
    fn show_capture_status(&mut self, status: CaptureStatus);
    fn show_study(&mut self, record: &StudyRecord);
    fn show_results(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressMessage {
    pub message: String,
    pub percentage: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DelayedProgress {
    Report(ProgressMessage),
    Clear,
}

#[derive(Debug, Clone)]
struct Pending {
    remaining: Duration,
    action: DelayedProgress,
}

/// Single progress indicator plus single error panel.
///
/// New messages overwrite old ones. Time only moves when the host calls
/// [`ProgressReporter::advance`], which keeps delayed messages and error
/// dismissal deterministic.
pub struct ProgressReporter<V: StudyView> {
    view: V,
    dismiss_after: Duration,
    progress: Option<ProgressMessage>,
    error: Option<String>,
    error_remaining: Duration,
    pending: Vec<Pending>,
}

impl<V: StudyView> ProgressReporter<V> {
    #[must_use]
    pub fn new(view: V, dismiss_after: Duration) -> Self {
        Self {
            view,
            dismiss_after,
            progress: None,
            error: None,
            error_remaining: Duration::ZERO,
            pending: Vec::new(),
        }
    }

    #[must_use]
    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    #[must_use]
    pub fn progress(&self) -> Option<&ProgressMessage> {
        self.progress.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Number of delayed progress actions not yet fired.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Shows `message` at `percentage` (clamped to 100). Cancels delayed
    /// progress actions, which would otherwise overwrite this message.
    pub fn report(&mut self, message: impl Into<String>, percentage: u8) {
        self.pending.clear();
        self.apply(DelayedProgress::Report(ProgressMessage {
            message: message.into(),
            percentage: percentage.min(100),
        }));
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.apply(DelayedProgress::Clear);
    }

    pub fn report_after(&mut self, delay: Duration, message: impl Into<String>, percentage: u8) {
        self.pending.push(Pending {
            remaining: delay,
            action: DelayedProgress::Report(ProgressMessage {
                message: message.into(),
                percentage: percentage.min(100),
            }),
        });
    }

    pub fn clear_after(&mut self, delay: Duration) {
        self.pending.push(Pending {
            remaining: delay,
            action: DelayedProgress::Clear,
        });
    }

    /// Shows the error panel; it hides itself once the dismissal delay has
    /// elapsed. A new error restarts the delay.
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(%message, "study workflow error");
        self.view.show_error(&message);
        self.error = Some(message);
        self.error_remaining = self.dismiss_after;
    }

    pub fn dismiss_error(&mut self) {
        if self.error.take().is_some() {
            self.view.hide_error();
        }
    }

    /// Moves the reporter clock forward, firing due delayed actions in the
    /// order they were scheduled and dismissing an expired error.
    pub fn advance(&mut self, elapsed: Duration) {
        let mut due = Vec::new();
        self.pending.retain_mut(|pending| {
            pending.remaining = pending.remaining.saturating_sub(elapsed);
            if pending.remaining.is_zero() {
                due.push(pending.action.clone());
                false
            } else {
                true
            }
        });
        for action in due {
            self.apply(action);
        }

        if self.error.is_some() {
            self.error_remaining = self.error_remaining.saturating_sub(elapsed);
            if self.error_remaining.is_zero() {
                trace!("auto-dismissing error panel");
                self.dismiss_error();
            }
        }
    }

    fn apply(&mut self, action: DelayedProgress) {
        match action {
            DelayedProgress::Report(progress) => {
                trace!(message = %progress.message, percentage = progress.percentage, "progress");
                self.view
                    .show_progress(&progress.message, progress.percentage);
                self.progress = Some(progress);
            }
            DelayedProgress::Clear => {
                self.view.hide_progress();
                self.progress = None;
            }
        }
    }
}
