use serde::{Deserialize, Serialize};

/// Job status carried by a progress frame.
///
/// Values the client does not know are kept verbatim in [`Status::Other`] so
/// they can still be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Starting,
    ExtractingArticle,
    ExtractingLocations,
    ProcessingLocations,
    Filtering,
    Complete,
    Error,
    Other(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::Starting => "starting",
            Status::ExtractingArticle => "extracting_article",
            Status::ExtractingLocations => "extracting_locations",
            Status::ProcessingLocations => "processing_locations",
            Status::Filtering => "filtering",
            Status::Complete => "complete",
            Status::Error => "error",
            Status::Other(raw) => raw,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Complete | Status::Error)
    }

    /// Human readable step description; unknown statuses fall back to the raw value.
    pub fn label(&self) -> &str {
        match self {
            Status::Starting => "Initializing...",
            Status::ExtractingArticle => "Extracting article content",
            Status::ExtractingLocations => "Finding locations",
            Status::ProcessingLocations => "Processing locations",
            Status::Filtering => "Filtering results",
            Status::Complete => "Complete!",
            Status::Error => "Error occurred",
            Status::Other(raw) => raw,
        }
    }
}

impl From<String> for Status {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "starting" => Status::Starting,
            "extracting_article" => Status::ExtractingArticle,
            "extracting_locations" => Status::ExtractingLocations,
            "processing_locations" => Status::ProcessingLocations,
            "filtering" => Status::Filtering,
            "complete" => Status::Complete,
            "error" => Status::Error,
            _ => Status::Other(raw),
        }
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        match status {
            Status::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// One unit of status information pushed over the progress stream.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgressFrame {
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub progress_percent: Option<f64>,
    #[serde(default)]
    pub current_item: Option<String>,
    #[serde(default)]
    pub current_index: Option<u64>,
    #[serde(default)]
    pub total_items: Option<u64>,
    /// Transport keepalive; such frames carry no status semantics.
    #[serde(default)]
    pub heartbeat: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl ProgressFrame {
    pub fn with_status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.as_ref().is_some_and(Status::is_terminal)
    }

    /// First populated of the explicit error field and the message field.
    pub fn error_text(&self) -> Option<&str> {
        [self.error.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|text| !text.is_empty())
    }
}
