//! RAG Chat - View Model

use super::session::ChatSession;
use crate::shared::api_error::ApiError;
use crate::shared::api_utils::default_top_k;
use contracts::system::health::HealthStatus;
use leptos::prelude::*;

/// Result of the one-shot health probe; `None` until it settles
pub type HealthProbe = Option<Result<HealthStatus, ApiError>>;

#[derive(Clone, Copy)]
pub struct RagChatVm {
    /// `web_sys::File` is not `Send`, so the session lives in local storage
    pub session: RwSignal<ChatSession<web_sys::File>, LocalStorage>,
    pub health: RwSignal<HealthProbe>,
}

impl RagChatVm {
    pub fn new() -> Self {
        Self {
            session: RwSignal::new_local(ChatSession::new().with_top_k(default_top_k())),
            health: RwSignal::new(None),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.session.with(|s| s.is_loading())
    }
}

/// Header line describing the backend's state
pub fn health_caption(probe: &HealthProbe) -> String {
    match probe {
        None => "Backend: comprobando...".to_string(),
        Some(Ok(status)) if status.is_healthy() => "Backend: OK".to_string(),
        Some(Ok(status)) => format!(
            "Backend: degradado ({})",
            status.degraded_services().join(", ")
        ),
        Some(Err(_)) => "Backend: no disponible".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_caption() {
        assert_eq!(health_caption(&None), "Backend: comprobando...");
        assert_eq!(
            health_caption(&Some(Ok(HealthStatus { qdrant: true, ollama: true }))),
            "Backend: OK"
        );
        assert_eq!(
            health_caption(&Some(Ok(HealthStatus { qdrant: false, ollama: true }))),
            "Backend: degradado (qdrant)"
        );
        assert_eq!(
            health_caption(&Some(Err(ApiError::Status(502)))),
            "Backend: no disponible"
        );
    }
}
