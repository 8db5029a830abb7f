//! API utilities for frontend-backend communication
//!
//! The RAG backend is served behind the same origin as the page, under a
//! fixed relative prefix. Both knobs below are baked in at build time.

/// Prefix used when `RAG_API_BASE` is not set at build time
pub const DEFAULT_API_BASE: &str = "/api";

/// Get the base path for API requests
///
/// # Returns
/// - `RAG_API_BASE` from the build environment, if set
/// - `"/api"` otherwise
pub fn api_base() -> &'static str {
    option_env!("RAG_API_BASE").unwrap_or(DEFAULT_API_BASE)
}

/// Build a full API URL from a path
///
/// # Arguments
/// * `path` - The endpoint path (should start with "/")
///
/// # Example
/// ```ignore
/// let url = api_url("/query");
/// ```
pub fn api_url(path: &str) -> String {
    join_url(api_base(), path)
}

/// Retrieval depth sent with every question, from `RAG_TOP_K` at build time.
/// `None` lets the backend apply its own default.
pub fn default_top_k() -> Option<u32> {
    parse_top_k(option_env!("RAG_TOP_K"))
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn parse_top_k(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|v| *v > 0)
}
