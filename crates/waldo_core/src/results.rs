use serde::{Deserialize, Serialize};

/// A place mentioned in the article, geocoded by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationData {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub events_summary: Option<String>,
}

/// Finalized payload returned by the result endpoint once a job completes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractionResults {
    #[serde(default)]
    pub article_title: Option<String>,
    pub locations: Vec<LocationData>,
    /// Seconds spent server-side.
    pub processing_time: f64,
    #[serde(default)]
    pub warnings: Vec<ProcessingWarning>,
}

/// Non-fatal issue the server hit while processing, e.g. `TEXT_TRUNCATED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingWarning {
    pub code: String,
    #[serde(default)]
    pub message: String,
}
