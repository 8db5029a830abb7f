use super::aggregate::Source;
use serde::{Deserialize, Serialize};

/// Body of `POST /query`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    /// Number of chunks the backend retrieves; server default applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

impl QueryRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            top_k: None,
        }
    }

    pub fn with_top_k(mut self, top_k: Option<u32>) -> Self {
        self.top_k = top_k;
        self
    }
}

/// Response of `POST /query`. Fields other than `answer` and `sources` are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Option<Vec<Source>>,
}

/// Per-file outcome reported by `POST /upload`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub filename: String,
    pub status: String,
}

/// Response of `POST /upload`. The client treats any 2xx as success and
/// only reads this body for logging, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub files: Vec<UploadedFile>,
}

impl UploadResponse {
    /// One-line description for logs: backend message plus per-file status
    pub fn summary(&self) -> String {
        let files = self
            .files
            .iter()
            .map(|f| format!("{}: {}", f.filename, f.status))
            .collect::<Vec<_>>()
            .join(", ");
        match (self.message.as_deref(), files.is_empty()) {
            (Some(message), true) => message.to_string(),
            (Some(message), false) => format!("{} [{}]", message, files),
            (None, true) => "no details".to_string(),
            (None, false) => format!("[{}]", files),
        }
    }
}
