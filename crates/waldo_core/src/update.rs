use crate::{AppState, Effect, InputKind, Msg, Phase, ProgressFrame, SessionId, Status};

pub const EMPTY_INPUT: &str = "Please enter a valid URL or paste article text";
pub const SUBMISSION_FAILED: &str = "Failed to extract locations";
pub const PROCESSING_FAILED: &str = "Processing failed";
pub const RESULTS_FAILED: &str = "Failed to get results";
pub const CONNECTION_LOST: &str = "Connection lost";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SubmitClicked { input } => {
            // One active session at a time.
            if state.is_busy() {
                return (state, Vec::new());
            }
            match InputKind::classify(&input) {
                Some(kind) => {
                    state.begin_submission(kind);
                    vec![Effect::SubmitJob {
                        input: input.trim().to_string(),
                    }]
                }
                None => {
                    state.show_validation_error(EMPTY_INPUT);
                    Vec::new()
                }
            }
        }
        Msg::SubmissionAccepted { session_id } => {
            if *state.phase() != Phase::Submitting {
                return (state, Vec::new());
            }
            state.accept_session(session_id.clone());
            vec![Effect::OpenChannel { session_id }]
        }
        Msg::SubmissionFailed { error } => {
            if *state.phase() == Phase::Submitting {
                state.fail(non_empty_or(error, SUBMISSION_FAILED));
            }
            Vec::new()
        }
        Msg::ChannelConnected { session_id } => {
            if state.is_current(&session_id) && state.phase().is_streaming() {
                state.mark_connected();
            }
            Vec::new()
        }
        Msg::FrameReceived { session_id, frame } => {
            if accepts_frame(&state, &session_id, &frame) {
                state.apply_frame(&frame);
            }
            Vec::new()
        }
        Msg::JobCompleted { session_id, frame } => {
            if !state.is_current(&session_id) || !state.phase().is_streaming() {
                return (state, Vec::new());
            }
            state.complete(&frame);
            vec![Effect::FetchResults { session_id }]
        }
        Msg::JobFailed { session_id, error } => {
            if state.is_current(&session_id) && state.phase().is_streaming() {
                state.fail(non_empty_or(error, PROCESSING_FAILED));
            }
            Vec::new()
        }
        Msg::ResultsFetched { session_id, result } => {
            if !state.is_current(&session_id)
                || *state.phase() != Phase::Complete
                || !state.fetch_pending()
            {
                return (state, Vec::new());
            }
            match result {
                Ok(results) => {
                    state.store_results(results);
                    vec![Effect::ScheduleHideProgress { session_id }]
                }
                Err(detail) => {
                    let detail = detail.trim();
                    let message = if detail.is_empty() {
                        RESULTS_FAILED.to_string()
                    } else {
                        format!("{RESULTS_FAILED}: {detail}")
                    };
                    state.fail(message);
                    Vec::new()
                }
            }
        }
        Msg::HideProgressElapsed { session_id } => {
            if state.is_current(&session_id) && *state.phase() == Phase::Complete {
                state.hide_progress();
            }
            Vec::new()
        }
    };

    (state, effects)
}

/// Display updates are taken from the active session only. Once the session is
/// terminal, the frame that ended it may still be shown but nothing else.
fn accepts_frame(state: &AppState, session_id: &SessionId, frame: &ProgressFrame) -> bool {
    if !state.is_current(session_id) || frame.heartbeat {
        return false;
    }
    match state.phase() {
        Phase::Streaming(_) => true,
        Phase::Complete => frame.status == Some(Status::Complete),
        Phase::Idle | Phase::Submitting | Phase::Errored => false,
    }
}

fn non_empty_or(text: String, fallback: &str) -> String {
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}
