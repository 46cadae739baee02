use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use serde::Deserialize;

use crate::{FailureKind, RequestError};

/// Connection settings shared by every request against the extraction server.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Applies to plain request/response calls; the progress stream only uses
    /// the connect timeout since it stays open for the whole job.
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl ClientSettings {
    pub(crate) fn build_client(&self, bounded: bool) -> Result<reqwest::Client, RequestError> {
        let mut builder = reqwest::Client::builder().connect_timeout(self.connect_timeout);
        if bounded {
            builder = builder.timeout(self.request_timeout);
        }
        builder
            .build()
            .map_err(|err| RequestError::new(FailureKind::Network, err.to_string()))
    }

    /// `{base_url}/seg1/seg2/...` with each segment percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, RequestError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|err| RequestError::new(FailureKind::InvalidUrl, err.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| {
                RequestError::new(FailureKind::InvalidUrl, "base url cannot carry a path")
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Structured error body returned by the server on non-success responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub retry_after: Option<u64>,
}

impl ErrorBody {
    pub(crate) fn text(&self) -> Option<&str> {
        [self.message.as_deref(), self.error.as_deref()]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
    }
}

const RATE_LIMIT_CODE: &str = "RATE_LIMIT_EXCEEDED";
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Turn a non-success response into a [`RequestError`], reading the structured body.
pub(crate) async fn error_from_response(response: reqwest::Response) -> RequestError {
    let status = response.status();
    let retry_header = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());
    let body = response
        .text()
        .await
        .ok()
        .and_then(|text| serde_json::from_str::<ErrorBody>(&text).ok())
        .unwrap_or_default();

    let rate_limited =
        status.as_u16() == 429 || body.error_code.as_deref() == Some(RATE_LIMIT_CODE);
    if rate_limited {
        let retry_after_secs = retry_header
            .or(body.retry_after)
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return RequestError::new(
            FailureKind::RateLimited { retry_after_secs },
            format!("API rate limit exceeded. Please try again in {retry_after_secs} seconds."),
        );
    }

    let message = body
        .text()
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| status.to_string());
    RequestError::new(FailureKind::HttpStatus(status.as_u16()), message)
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> RequestError {
    if err.is_timeout() {
        return RequestError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return RequestError::new(FailureKind::Decode, err.to_string());
    }
    RequestError::new(FailureKind::Network, err.to_string())
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        map_reqwest_error(err)
    }
}
