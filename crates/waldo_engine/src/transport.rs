use std::pin::Pin;

use futures_util::Stream;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use waldo_core::SessionId;
use waldo_logging::waldo_debug;

use crate::client::{error_from_response, map_reqwest_error};
use crate::sse::data_payloads;
use crate::{ClientSettings, RequestError};

/// Raw event payloads of one open stream, in transport order.
///
/// The stream ends when the server closes the connection; an `Err` item reports
/// a transport or framing failure, after which the channel stops reading.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String, RequestError>> + Send>>;

/// Opens the server-push connection for a session.
#[async_trait::async_trait]
pub trait StreamTransport: Send + Sync {
    /// Resolves once the transport is open (response headers received).
    async fn open(&self, session_id: &SessionId) -> Result<FrameStream, RequestError>;
}

/// Server-Sent Events transport over `GET {base}/api/progress/{session_id}`.
#[derive(Debug, Clone)]
pub struct SseTransport {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl SseTransport {
    pub fn new(settings: ClientSettings) -> Result<Self, RequestError> {
        let client = settings.build_client(false)?;
        Ok(Self { settings, client })
    }
}

#[async_trait::async_trait]
impl StreamTransport for SseTransport {
    async fn open(&self, session_id: &SessionId) -> Result<FrameStream, RequestError> {
        let url = self
            .settings
            .endpoint(&["api", "progress", session_id.as_str()])?;
        waldo_debug!("opening progress stream {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(Box::pin(data_payloads(response.bytes_stream())))
    }
}
