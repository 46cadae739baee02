use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::time::Instant;
use waldo_core::{ProgressFrame, SessionId, Status, CONNECTION_LOST, PROCESSING_FAILED};
use waldo_logging::{waldo_debug, waldo_info, waldo_trace, waldo_warn};

use crate::{FrameStream, RequestError, StreamTransport};

#[derive(Debug, Clone)]
pub struct ChannelSettings {
    /// Wait between dispatching a terminal frame and tearing the stream down.
    pub grace_delay: Duration,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            grace_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Closed,
    Connecting,
    Open,
    ClosedByCompletion,
    ClosedByError,
}

impl ChannelState {
    pub fn is_closed(self) -> bool {
        matches!(
            self,
            ChannelState::Closed | ChannelState::ClosedByCompletion | ChannelState::ClosedByError
        )
    }
}

/// Names a handler can be registered under.
///
/// Status names map one-to-one onto the known [`Status`] values; `Error` is
/// shared by the `error` status and transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    Connected,
    Progress,
    Starting,
    ExtractingArticle,
    ExtractingLocations,
    ProcessingLocations,
    Filtering,
    Complete,
    Error,
}

impl EventName {
    /// Status-named handler for a frame status; unknown statuses have none.
    pub fn for_status(status: &Status) -> Option<Self> {
        match status {
            Status::Starting => Some(EventName::Starting),
            Status::ExtractingArticle => Some(EventName::ExtractingArticle),
            Status::ExtractingLocations => Some(EventName::ExtractingLocations),
            Status::ProcessingLocations => Some(EventName::ProcessingLocations),
            Status::Filtering => Some(EventName::Filtering),
            Status::Complete => Some(EventName::Complete),
            Status::Error => Some(EventName::Error),
            Status::Other(_) => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventName::Connected => "connected",
            EventName::Progress => "progress",
            EventName::Starting => "starting",
            EventName::ExtractingArticle => "extracting_article",
            EventName::ExtractingLocations => "extracting_locations",
            EventName::ProcessingLocations => "processing_locations",
            EventName::Filtering => "filtering",
            EventName::Complete => "complete",
            EventName::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Connected {
        session_id: SessionId,
    },
    Frame {
        session_id: SessionId,
        frame: ProgressFrame,
    },
    /// Synthesized when the transport fails before a terminal frame.
    ConnectionLost {
        session_id: SessionId,
        message: String,
    },
}

impl ChannelEvent {
    pub fn session_id(&self) -> &SessionId {
        match self {
            ChannelEvent::Connected { session_id }
            | ChannelEvent::Frame { session_id, .. }
            | ChannelEvent::ConnectionLost { session_id, .. } => session_id,
        }
    }

    /// Text to show when this event is delivered to the `Error` handler.
    pub fn error_message(&self) -> String {
        match self {
            ChannelEvent::Frame { frame, .. } => frame
                .error_text()
                .unwrap_or(PROCESSING_FAILED)
                .to_string(),
            ChannelEvent::ConnectionLost { message, .. } => message.clone(),
            ChannelEvent::Connected { .. } => String::new(),
        }
    }
}

pub type Handler = Box<dyn FnMut(&ChannelEvent) + Send>;

/// At most one handler per name; registering again replaces.
#[derive(Default)]
struct HandlerRegistry {
    handlers: HashMap<EventName, Handler>,
}

impl HandlerRegistry {
    fn insert(&mut self, name: EventName, handler: Handler) {
        if self.handlers.insert(name, handler).is_some() {
            waldo_trace!("replaced handler for {}", name.as_str());
        }
    }

    fn remove(&mut self, name: EventName) {
        self.handlers.remove(&name);
    }

    fn fire(&mut self, name: EventName, event: &ChannelEvent) {
        if let Some(handler) = self.handlers.get_mut(&name) {
            handler(event);
        }
    }
}

/// Session-scoped progress stream with a named-event handler registry.
///
/// The channel does nothing on its own: the owner drives it with [`step`],
/// which waits for the next transport event and dispatches it.
///
/// [`step`]: ProgressChannel::step
pub struct ProgressChannel {
    transport: Arc<dyn StreamTransport>,
    settings: ChannelSettings,
    handlers: HandlerRegistry,
    state: ChannelState,
    session_id: Option<SessionId>,
    stream: Option<FrameStream>,
    /// Set by a terminal frame: when to close and which closed state to land in.
    pending_close: Option<(Instant, ChannelState)>,
}

enum StepInput {
    GraceElapsed,
    Payload(String),
    TransportFailed(RequestError),
    Ended,
}

impl ProgressChannel {
    pub fn new(transport: Arc<dyn StreamTransport>, settings: ChannelSettings) -> Self {
        Self {
            transport,
            settings,
            handlers: HandlerRegistry::default(),
            state: ChannelState::Closed,
            session_id: None,
            stream: None,
            pending_close: None,
        }
    }

    pub fn on<F>(&mut self, name: EventName, handler: F)
    where
        F: FnMut(&ChannelEvent) + Send + 'static,
    {
        self.handlers.insert(name, Box::new(handler));
    }

    pub fn off(&mut self, name: EventName) {
        self.handlers.remove(name);
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// True while there is a transport to drive with [`ProgressChannel::step`].
    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Open the stream for `session_id`, closing any previous connection first.
    ///
    /// Fires `Connected` once the transport is open. If opening fails the
    /// `Error` handler receives a connection-lost event and the error is returned.
    pub async fn connect(&mut self, session_id: SessionId) -> Result<(), RequestError> {
        self.disconnect();
        self.state = ChannelState::Connecting;
        self.session_id = Some(session_id.clone());

        match self.transport.open(&session_id).await {
            Ok(stream) => {
                self.stream = Some(stream);
                self.state = ChannelState::Open;
                waldo_info!("progress stream connected for session {}", session_id);
                self.handlers
                    .fire(EventName::Connected, &ChannelEvent::Connected { session_id });
                Ok(())
            }
            Err(err) => {
                waldo_warn!("progress stream for session {} failed to open: {}", session_id, err);
                self.report_connection_lost(session_id);
                Err(err)
            }
        }
    }

    /// Idempotent. Drops the transport and any pending grace close.
    pub fn disconnect(&mut self) {
        if self.stream.take().is_some() {
            waldo_info!(
                "progress stream disconnected for session {}",
                self.session_id.as_ref().map(SessionId::as_str).unwrap_or("?")
            );
        }
        self.pending_close = None;
        self.session_id = None;
        self.state = ChannelState::Closed;
    }

    /// Wait for the next transport event (or the grace deadline) and dispatch it.
    ///
    /// Returns the state after handling; returns immediately when inactive.
    pub async fn step(&mut self) -> ChannelState {
        let deadline = self.pending_close.map(|(deadline, _)| deadline);
        let Some(stream) = self.stream.as_mut() else {
            return self.state;
        };

        let input = match deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = tokio::time::sleep_until(deadline) => StepInput::GraceElapsed,
                item = stream.next() => StepInput::from(item),
            },
            None => StepInput::from(stream.next().await),
        };

        match input {
            StepInput::GraceElapsed => self.finish_pending_close(),
            StepInput::Payload(raw) => self.handle_payload(&raw),
            StepInput::TransportFailed(err) => self.handle_transport_end(Some(err)),
            StepInput::Ended => self.handle_transport_end(None),
        }
        self.state
    }

    /// Drive the channel until it has no transport left.
    pub async fn run_until_closed(&mut self) -> ChannelState {
        while self.is_active() {
            self.step().await;
        }
        self.state
    }

    fn handle_payload(&mut self, raw: &str) {
        let frame = match serde_json::from_str::<ProgressFrame>(raw) {
            Ok(frame) => frame,
            Err(err) => {
                waldo_warn!("dropping malformed progress frame ({}): {}", err, raw);
                return;
            }
        };
        if frame.heartbeat {
            waldo_trace!("heartbeat");
            return;
        }
        if self.pending_close.is_some() {
            waldo_debug!("dropping frame received after terminal status: {}", raw);
            return;
        }
        let Some(session_id) = self.session_id.clone() else {
            return;
        };

        waldo_debug!("progress update: {}", raw);
        let status_name = frame.status.as_ref().and_then(EventName::for_status);
        let closes_as = match frame.status.as_ref() {
            Some(Status::Complete) => Some(ChannelState::ClosedByCompletion),
            Some(Status::Error) => Some(ChannelState::ClosedByError),
            _ => None,
        };

        let event = ChannelEvent::Frame { session_id, frame };
        if let Some(name) = status_name {
            self.handlers.fire(name, &event);
        }
        self.handlers.fire(EventName::Progress, &event);

        if let Some(target) = closes_as {
            let deadline = Instant::now() + self.settings.grace_delay;
            self.pending_close = Some((deadline, target));
        }
    }

    /// Stream failed or ended. A close already scheduled by a terminal frame
    /// wins; anything else is reported once as a lost connection.
    fn handle_transport_end(&mut self, err: Option<RequestError>) {
        if self.pending_close.is_some() {
            self.finish_pending_close();
            return;
        }
        if self.state.is_closed() {
            return;
        }
        let Some(session_id) = self.session_id.clone() else {
            return;
        };
        match err {
            Some(err) => waldo_warn!("progress stream error: {}", err),
            None => waldo_warn!("progress stream ended before a terminal status"),
        }
        self.report_connection_lost(session_id);
    }

    fn finish_pending_close(&mut self) {
        let Some((_, target)) = self.pending_close.take() else {
            return;
        };
        self.stream = None;
        self.state = target;
        waldo_info!("progress stream closed ({:?})", target);
    }

    fn report_connection_lost(&mut self, session_id: SessionId) {
        self.stream = None;
        self.pending_close = None;
        self.state = ChannelState::ClosedByError;
        let event = ChannelEvent::ConnectionLost {
            session_id,
            message: CONNECTION_LOST.to_string(),
        };
        self.handlers.fire(EventName::Error, &event);
    }
}

impl From<Option<Result<String, RequestError>>> for StepInput {
    fn from(item: Option<Result<String, RequestError>>) -> Self {
        match item {
            Some(Ok(raw)) => StepInput::Payload(raw),
            Some(Err(err)) => StepInput::TransportFailed(err),
            None => StepInput::Ended,
        }
    }
}
