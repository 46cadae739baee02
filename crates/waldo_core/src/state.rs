use crate::view_model::{AppViewModel, ProgressView};
use crate::{ExtractionResults, InputKind, ProgressFrame, SessionId, Status};

/// Coordinator phase for the current session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    /// Stream open; carries the most recent non-terminal status.
    Streaming(Status),
    Complete,
    Errored,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Complete | Phase::Errored)
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, Phase::Streaming(_))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    phase: Phase,
    session_id: Option<SessionId>,
    input_kind: Option<InputKind>,
    connected: bool,
    busy: bool,
    fetch_pending: bool,
    progress: ProgressView,
    results: Option<ExtractionResults>,
    error: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            phase: self.phase.clone(),
            session_id: self.session_id.clone(),
            input_kind: self.input_kind,
            connected: self.connected,
            busy: self.busy,
            fetch_pending: self.fetch_pending,
            progress: self.progress.clone(),
            results: self.results.clone(),
            error: self.error.clone(),
            dirty: self.dirty,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// True once the session reached a terminal phase and nothing is left to show or await.
    pub fn is_settled(&self) -> bool {
        match self.phase {
            Phase::Errored => !self.busy,
            Phase::Complete => !self.busy && !self.fetch_pending && !self.progress.visible,
            _ => false,
        }
    }

    /// Returns whether anything changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn is_current(&self, session_id: &SessionId) -> bool {
        self.session_id.as_ref() == Some(session_id)
    }

    pub(crate) fn fetch_pending(&self) -> bool {
        self.fetch_pending
    }

    pub(crate) fn show_validation_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
        self.dirty = true;
    }

    pub(crate) fn begin_submission(&mut self, kind: InputKind) {
        *self = Self {
            phase: Phase::Submitting,
            input_kind: Some(kind),
            busy: true,
            progress: ProgressView {
                visible: true,
                percent: Some(0.0),
                headline: Some(kind.describe().to_string()),
                ..ProgressView::default()
            },
            dirty: true,
            ..Self::default()
        };
    }

    pub(crate) fn accept_session(&mut self, session_id: SessionId) {
        self.session_id = Some(session_id);
        self.phase = Phase::Streaming(Status::Starting);
        self.progress.headline = Some("Waiting for progress updates...".to_string());
        self.dirty = true;
    }

    pub(crate) fn mark_connected(&mut self) {
        self.connected = true;
        self.dirty = true;
    }

    pub(crate) fn apply_frame(&mut self, frame: &ProgressFrame) {
        if let Some(percent) = frame.progress_percent {
            self.progress.percent = Some(percent);
        }
        if let Some(message) = &frame.message {
            self.progress.headline = Some(message.clone());
        }
        if let Some(status) = &frame.status {
            self.progress.step = Some(status.label().to_string());
            self.progress.step_status = Some(status.clone());
            if self.phase.is_streaming() && !status.is_terminal() {
                self.phase = Phase::Streaming(status.clone());
            }
        }
        self.progress.details = frame
            .current_item
            .as_ref()
            .map(|item| format!("Current: {item}"));
        self.dirty = true;
    }

    pub(crate) fn complete(&mut self, frame: &ProgressFrame) {
        self.phase = Phase::Complete;
        self.fetch_pending = true;
        self.progress.headline = Some(
            frame
                .message
                .clone()
                .unwrap_or_else(|| "Processing complete!".to_string()),
        );
        self.progress.step = Some(Status::Complete.label().to_string());
        self.progress.step_status = Some(Status::Complete);
        self.dirty = true;
    }

    pub(crate) fn store_results(&mut self, results: ExtractionResults) {
        self.fetch_pending = false;
        self.results = Some(results);
        self.release_busy();
        self.dirty = true;
    }

    /// Terminal failure for the session; releases the busy indicator.
    pub(crate) fn fail(&mut self, message: String) {
        self.phase = Phase::Errored;
        self.fetch_pending = false;
        self.progress.visible = true;
        self.progress.headline = Some(format!("Error: {message}"));
        self.progress.step = Some("Processing failed".to_string());
        self.progress.step_status = Some(Status::Error);
        self.progress.details = Some(message.clone());
        self.error = Some(message);
        self.release_busy();
        self.dirty = true;
    }

    pub(crate) fn hide_progress(&mut self) {
        if self.progress.visible {
            self.progress.visible = false;
            self.dirty = true;
        }
    }

    fn release_busy(&mut self) {
        self.busy = false;
    }
}
