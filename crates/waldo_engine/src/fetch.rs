use waldo_core::{ExtractionResults, SessionId};
use waldo_logging::waldo_info;

use crate::client::{error_from_response, map_reqwest_error};
use crate::{ClientSettings, FailureKind, RequestError};

/// Retrieves the finalized result set of a completed session.
#[async_trait::async_trait]
pub trait ResultFetcher: Send + Sync {
    async fn fetch_results(&self, session_id: &SessionId)
        -> Result<ExtractionResults, RequestError>;
}

/// Plain `GET {base}/api/results/{session_id}`, independent of the progress stream.
#[derive(Debug, Clone)]
pub struct ReqwestResultFetcher {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestResultFetcher {
    pub fn new(settings: ClientSettings) -> Result<Self, RequestError> {
        let client = settings.build_client(true)?;
        Ok(Self { settings, client })
    }
}

#[async_trait::async_trait]
impl ResultFetcher for ReqwestResultFetcher {
    async fn fetch_results(
        &self,
        session_id: &SessionId,
    ) -> Result<ExtractionResults, RequestError> {
        let url = self
            .settings
            .endpoint(&["api", "results", session_id.as_str()])?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        let results: ExtractionResults = serde_json::from_slice(&body)
            .map_err(|err| RequestError::new(FailureKind::Decode, err.to_string()))?;
        waldo_info!(
            "fetched {} locations for session {}",
            results.locations.len(),
            session_id
        );
        Ok(results)
    }
}
