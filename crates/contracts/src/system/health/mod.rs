use serde::{Deserialize, Serialize};

/// Response of `GET /health`: reachability of the backend's own dependencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub qdrant: bool,
    pub ollama: bool,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.qdrant && self.ollama
    }

    /// Names of the services reported as down
    pub fn degraded_services(&self) -> Vec<&'static str> {
        let mut down = Vec::new();
        if !self.qdrant {
            down.push("qdrant");
        }
        if !self.ollama {
            down.push("ollama");
        }
        down
    }
}
