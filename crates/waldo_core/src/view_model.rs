use crate::{ExtractionResults, InputKind, Phase, SessionId, Status};

/// What the progress surface shows right now.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressView {
    pub visible: bool,
    pub percent: Option<f64>,
    pub headline: Option<String>,
    pub step: Option<String>,
    pub step_status: Option<Status>,
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub phase: Phase,
    pub session_id: Option<SessionId>,
    pub input_kind: Option<InputKind>,
    pub connected: bool,
    pub busy: bool,
    pub fetch_pending: bool,
    pub progress: ProgressView,
    pub results: Option<ExtractionResults>,
    pub error: Option<String>,
    pub dirty: bool,
}
