use crate::SessionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitJob { input: String },
    OpenChannel { session_id: SessionId },
    FetchResults { session_id: SessionId },
    ScheduleHideProgress { session_id: SessionId },
}
