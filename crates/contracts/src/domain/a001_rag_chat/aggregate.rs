use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Роль сообщения в чате
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// Document the backend cited for an answer.
///
/// Only `filename` is read by the client. Everything else the backend
/// attaches (`score`, `area`, ...) lands in `extra` and is written back
/// unchanged on serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub filename: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Source {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// One turn of the transcript. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            sources: None,
        }
    }

    /// Сообщение пользователя
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content.into())
    }

    /// Сообщение ассистента
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content.into())
    }

    pub fn with_sources(mut self, sources: Option<Vec<Source>>) -> Self {
        self.sources = sources;
        self
    }

    pub fn is_user(&self) -> bool {
        self.role == ChatRole::User
    }

    /// Filenames of the cited sources, in backend order.
    ///
    /// `None` when the message has no sources or an empty list.
    pub fn source_filenames(&self) -> Option<Vec<&str>> {
        match &self.sources {
            Some(sources) if !sources.is_empty() => {
                Some(sources.iter().map(|s| s.filename.as_str()).collect())
            }
            _ => None,
        }
    }
}
