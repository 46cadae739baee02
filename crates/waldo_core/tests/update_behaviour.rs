use std::sync::Once;

use pretty_assertions::assert_eq;
use waldo_core::{
    update, AppState, Effect, ExtractionResults, InputKind, LocationData, Msg, Phase,
    ProgressFrame, SessionId, Status, EMPTY_INPUT, SUBMISSION_FAILED,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(waldo_logging::initialize_for_tests);
}

fn streaming(session: &str) -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::SubmitClicked {
            input: "https://news.example.com/story".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::SubmissionAccepted {
            session_id: SessionId::from(session),
        },
    );
    state
}

fn frame(status: Status) -> ProgressFrame {
    ProgressFrame::with_status(status)
}

fn sample_results() -> ExtractionResults {
    ExtractionResults {
        article_title: Some("Story".to_string()),
        locations: vec![LocationData {
            name: "Lviv".to_string(),
            latitude: 49.84,
            longitude: 24.03,
            events_summary: Some("Rally in the old town".to_string()),
        }],
        processing_time: 3.5,
        warnings: Vec::new(),
    }
}

#[test]
fn submit_engages_busy_and_requests_submission() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::SubmitClicked {
            input: "  https://news.example.com/story \n".to_string(),
        },
    );
    let view = state.view();

    assert_eq!(view.phase, Phase::Submitting);
    assert!(view.busy);
    assert!(view.progress.visible);
    assert_eq!(view.input_kind, Some(InputKind::Url));
    assert_eq!(
        effects,
        vec![Effect::SubmitJob {
            input: "https://news.example.com/story".to_string()
        }]
    );
}

#[test]
fn blank_input_is_rejected_without_effects() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::SubmitClicked {
            input: "   ".to_string(),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.view().phase, Phase::Idle);
    assert_eq!(state.view().error.as_deref(), Some(EMPTY_INPUT));
    assert!(!state.view().busy);
}

#[test]
fn second_submit_is_ignored_while_busy() {
    init_logging();
    let state = streaming("abc");
    let (state, effects) = update(
        state,
        Msg::SubmitClicked {
            input: "other text".to_string(),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.session_id(), Some(&SessionId::from("abc")));
}

#[test]
fn accepted_submission_opens_channel_for_session() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::SubmitClicked {
            input: "Some article text".to_string(),
        },
    );
    let (state, effects) = update(
        state,
        Msg::SubmissionAccepted {
            session_id: SessionId::from("abc"),
        },
    );

    assert_eq!(state.view().phase, Phase::Streaming(Status::Starting));
    assert_eq!(
        effects,
        vec![Effect::OpenChannel {
            session_id: SessionId::from("abc")
        }]
    );
}

#[test]
fn failed_submission_releases_busy() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::SubmitClicked {
            input: "text".to_string(),
        },
    );
    let (state, effects) = update(
        state,
        Msg::SubmissionFailed {
            error: String::new(),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.phase, Phase::Errored);
    assert!(!view.busy);
    assert_eq!(view.error.as_deref(), Some(SUBMISSION_FAILED));
    assert!(state.is_settled());
}

#[test]
fn happy_path_fetches_results_and_hides_progress() {
    init_logging();
    let session = SessionId::from("abc");
    let state = streaming("abc");

    let mut starting = frame(Status::Starting);
    starting.progress_percent = Some(0.0);
    let (state, effects) = update(
        state,
        Msg::FrameReceived {
            session_id: session.clone(),
            frame: starting,
        },
    );
    assert!(effects.is_empty());

    let mut done = frame(Status::Complete);
    done.message = Some("done".to_string());
    let (state, effects) = update(
        state,
        Msg::JobCompleted {
            session_id: session.clone(),
            frame: done.clone(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::FetchResults {
            session_id: session.clone()
        }]
    );
    let (state, effects) = update(
        state,
        Msg::FrameReceived {
            session_id: session.clone(),
            frame: done,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().phase, Phase::Complete);
    assert_eq!(state.view().progress.headline.as_deref(), Some("done"));
    assert!(state.view().busy, "busy until results arrive");

    let (state, effects) = update(
        state,
        Msg::ResultsFetched {
            session_id: session.clone(),
            result: Ok(sample_results()),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::ScheduleHideProgress {
            session_id: session.clone()
        }]
    );
    assert!(!state.view().busy);
    assert_eq!(state.view().results, Some(sample_results()));
    assert!(!state.is_settled(), "progress still visible");

    let (state, _) = update(state, Msg::HideProgressElapsed { session_id: session });
    assert!(!state.view().progress.visible);
    assert!(state.is_settled());
}

#[test]
fn result_fetch_failure_surfaces_upstream_text() {
    init_logging();
    let session = SessionId::from("abc");
    let state = streaming("abc");
    let (state, _) = update(
        state,
        Msg::JobCompleted {
            session_id: session.clone(),
            frame: frame(Status::Complete),
        },
    );
    let (state, effects) = update(
        state,
        Msg::ResultsFetched {
            session_id: session,
            result: Err("not found".to_string()),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert!(!view.busy);
    assert_eq!(view.phase, Phase::Errored);
    assert!(view.error.as_deref().unwrap().contains("not found"));
    assert_eq!(
        view.error.as_deref(),
        Some("Failed to get results: not found")
    );
}

#[test]
fn result_fetch_failure_without_text_uses_fallback() {
    init_logging();
    let session = SessionId::from("abc");
    let (state, _) = update(
        streaming("abc"),
        Msg::JobCompleted {
            session_id: session.clone(),
            frame: frame(Status::Complete),
        },
    );
    let (state, _) = update(
        state,
        Msg::ResultsFetched {
            session_id: session,
            result: Err("  ".to_string()),
        },
    );

    assert_eq!(state.view().error.as_deref(), Some("Failed to get results"));
}

#[test]
fn error_status_releases_busy_with_frame_text() {
    init_logging();
    let session = SessionId::from("abc");
    let (state, effects) = update(
        streaming("abc"),
        Msg::JobFailed {
            session_id: session,
            error: "rate limited".to_string(),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.phase, Phase::Errored);
    assert!(!view.busy);
    assert_eq!(view.error.as_deref(), Some("rate limited"));
    assert_eq!(view.progress.headline.as_deref(), Some("Error: rate limited"));
    assert!(state.is_settled());
}

#[test]
fn terminal_session_never_reenters_streaming() {
    init_logging();
    let session = SessionId::from("abc");
    let (state, _) = update(
        streaming("abc"),
        Msg::JobFailed {
            session_id: session.clone(),
            error: "boom".to_string(),
        },
    );
    let before = state.view();

    let (state, effects) = update(
        state,
        Msg::FrameReceived {
            session_id: session.clone(),
            frame: frame(Status::Filtering),
        },
    );
    assert!(effects.is_empty());
    let (state, effects) = update(
        state,
        Msg::JobCompleted {
            session_id: session,
            frame: frame(Status::Complete),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().phase, before.phase);
    assert_eq!(state.view().progress, before.progress);
}

#[test]
fn messages_for_other_sessions_are_ignored() {
    init_logging();
    let state = streaming("b");
    let stale = SessionId::from("a");

    let (state, effects) = update(
        state,
        Msg::JobCompleted {
            session_id: stale.clone(),
            frame: frame(Status::Complete),
        },
    );
    assert!(effects.is_empty());
    let (state, _) = update(
        state,
        Msg::JobFailed {
            session_id: stale,
            error: "Connection lost".to_string(),
        },
    );

    assert_eq!(state.view().phase, Phase::Streaming(Status::Starting));
    assert!(state.view().busy);
}

#[test]
fn duplicate_results_do_not_schedule_twice() {
    init_logging();
    let session = SessionId::from("abc");
    let (state, _) = update(
        streaming("abc"),
        Msg::JobCompleted {
            session_id: session.clone(),
            frame: frame(Status::Complete),
        },
    );
    let (state, first) = update(
        state,
        Msg::ResultsFetched {
            session_id: session.clone(),
            result: Ok(sample_results()),
        },
    );
    let (_state, second) = update(
        state,
        Msg::ResultsFetched {
            session_id: session,
            result: Err("late".to_string()),
        },
    );

    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
}

#[test]
fn new_submission_after_terminal_starts_fresh() {
    init_logging();
    let (state, _) = update(
        streaming("abc"),
        Msg::JobFailed {
            session_id: SessionId::from("abc"),
            error: "boom".to_string(),
        },
    );
    let (state, effects) = update(
        state,
        Msg::SubmitClicked {
            input: "fresh text".to_string(),
        },
    );

    assert_eq!(effects.len(), 1);
    let view = state.view();
    assert_eq!(view.phase, Phase::Submitting);
    assert_eq!(view.session_id, None);
    assert_eq!(view.error, None);
}
