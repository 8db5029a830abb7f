use thiserror::Error;

/// Failure of a single backend request.
///
/// The `Display` text is what the user sees after the fixed prefix of a
/// notice or an assistant error entry, so it carries no prefix of its own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Request never produced a response (offline, CORS, aborted by the browser)
    #[error("{0}")]
    Network(String),

    #[error("Request failed with status code {0}")]
    Status(u16),

    /// 2xx response whose body could not be read as the expected JSON
    #[error("{0}")]
    Decode(String),

    /// Request body could not be built
    #[error("{0}")]
    Encode(String),
}
