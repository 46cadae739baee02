//! Waldo core: pure progress coordinator state machine and view-model helpers.
mod effect;
mod frame;
mod msg;
mod results;
mod session;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use frame::{ProgressFrame, Status};
pub use msg::Msg;
pub use results::{ExtractionResults, LocationData, ProcessingWarning};
pub use session::{InputKind, SessionId};
pub use state::{AppState, Phase};
pub use update::{
    update, CONNECTION_LOST, EMPTY_INPUT, PROCESSING_FAILED, RESULTS_FAILED, SUBMISSION_FAILED,
};
pub use view_model::{AppViewModel, ProgressView};
