//! Waldo engine: progress stream transport, session channel and HTTP collaborators.
mod channel;
mod client;
mod fetch;
mod sse;
mod submit;
mod transport;
mod types;

pub use channel::{ChannelEvent, ChannelSettings, ChannelState, EventName, Handler, ProgressChannel};
pub use client::ClientSettings;
pub use fetch::{ReqwestResultFetcher, ResultFetcher};
pub use sse::data_payloads;
pub use submit::{JobSubmitter, ReqwestJobSubmitter};
pub use transport::{FrameStream, SseTransport, StreamTransport};
pub use types::{FailureKind, RequestError};
