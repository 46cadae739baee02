use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque correlation key issued by the server when a job is accepted.
///
/// The same value addresses the progress stream and the result endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// What the user handed in: a link to an article or the article text itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Url,
    Text,
}

impl InputKind {
    /// Classify trimmed input. Returns `None` for blank input.
    pub fn classify(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        match url::Url::parse(trimmed) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Some(Self::Url),
            _ => Some(Self::Text),
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::Url => "Submitting article URL...",
            Self::Text => "Submitting article text...",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::InputKind;

    #[test]
    fn classifies_http_and_https_as_url() {
        assert_eq!(InputKind::classify(" https://example.com/a "), Some(InputKind::Url));
        assert_eq!(InputKind::classify("http://example.com"), Some(InputKind::Url));
    }

    #[test]
    fn other_schemes_and_prose_are_text() {
        assert_eq!(InputKind::classify("ftp://example.com"), Some(InputKind::Text));
        assert_eq!(
            InputKind::classify("Troops moved from Kyiv to Lviv."),
            Some(InputKind::Text)
        );
    }

    #[test]
    fn blank_input_is_rejected() {
        assert_eq!(InputKind::classify("   \n\t"), None);
    }
}
