use serde::{Deserialize, Serialize};
use waldo_core::SessionId;
use waldo_logging::waldo_info;

use crate::client::{error_from_response, map_reqwest_error};
use crate::{ClientSettings, FailureKind, RequestError};

/// Submits an extraction job and returns the session id the server assigned.
#[async_trait::async_trait]
pub trait JobSubmitter: Send + Sync {
    async fn submit(&self, input: &str) -> Result<SessionId, RequestError>;
}

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    session_id: SessionId,
}

/// `POST {base}/api/extract` with `{"input": ...}`.
#[derive(Debug, Clone)]
pub struct ReqwestJobSubmitter {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestJobSubmitter {
    pub fn new(settings: ClientSettings) -> Result<Self, RequestError> {
        let client = settings.build_client(true)?;
        Ok(Self { settings, client })
    }
}

#[async_trait::async_trait]
impl JobSubmitter for ReqwestJobSubmitter {
    async fn submit(&self, input: &str) -> Result<SessionId, RequestError> {
        let url = self.settings.endpoint(&["api", "extract"])?;

        let response = self
            .client
            .post(url)
            .json(&SubmitRequest { input })
            .send()
            .await
            .map_err(map_reqwest_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        let accepted: SubmitResponse = serde_json::from_slice(&body)
            .map_err(|err| RequestError::new(FailureKind::Decode, err.to_string()))?;
        waldo_info!("job accepted with session {}", accepted.session_id);
        Ok(accepted.session_id)
    }
}
