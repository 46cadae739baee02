use crate::{ExtractionResults, ProgressFrame, SessionId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User asked to extract locations from a URL or article text.
    SubmitClicked { input: String },
    /// Server accepted the job and issued a session id.
    SubmissionAccepted { session_id: SessionId },
    /// Submission request failed; carries the upstream message when available.
    SubmissionFailed { error: String },
    /// Progress stream reached the open state.
    ChannelConnected { session_id: SessionId },
    /// A non-heartbeat frame arrived on the stream.
    FrameReceived {
        session_id: SessionId,
        frame: ProgressFrame,
    },
    /// The stream reported the `complete` status.
    JobCompleted {
        session_id: SessionId,
        frame: ProgressFrame,
    },
    /// The stream reported the `error` status or the connection was lost.
    JobFailed { session_id: SessionId, error: String },
    /// Result fetch resolved; the error side carries the upstream text.
    ResultsFetched {
        session_id: SessionId,
        result: Result<ExtractionResults, String>,
    },
    /// Hide delay after a successful run elapsed.
    HideProgressElapsed { session_id: SessionId },
}
