//! RAG Chat - Model (API functions)

use super::session::RagBackend;
use crate::shared::api_error::ApiError;
use crate::shared::api_utils::api_url;
use async_trait::async_trait;
use contracts::domain::a001_rag_chat::dto::{QueryRequest, QueryResponse, UploadResponse};
use contracts::system::health::HealthStatus;
use gloo_net::http::Request;

/// Multipart field every uploaded file is appended under
pub const UPLOAD_FIELD: &str = "files";

/// Backend reached over HTTP at `api_base()`
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpBackend;

#[async_trait(?Send)]
impl RagBackend for HttpBackend {
    type File = web_sys::File;

    async fn upload(&self, files: &[web_sys::File]) -> Result<UploadResponse, ApiError> {
        upload_files(files).await
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError> {
        query(request).await
    }
}

/// Multipart body with one `files` part per selected file
fn upload_form(files: &[web_sys::File]) -> Result<web_sys::FormData, ApiError> {
    let form_data = web_sys::FormData::new().map_err(|e| ApiError::Encode(format!("{e:?}")))?;
    for file in files {
        form_data
            .append_with_blob(UPLOAD_FIELD, file)
            .map_err(|e| ApiError::Encode(format!("{e:?}")))?;
    }
    Ok(form_data)
}

/// Загрузить файлы одним multipart-запросом
pub async fn upload_files(files: &[web_sys::File]) -> Result<UploadResponse, ApiError> {
    let form_data = upload_form(files)?;

    let url = api_url("/upload");
    log::debug!("POST {} ({} file(s))", url, files.len());

    let response = Request::post(&url)
        .body(form_data)
        .map_err(|e| ApiError::Encode(e.to_string()))?
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    if !response.ok() {
        return Err(ApiError::Status(response.status()));
    }

    // Any 2xx is a success; the body is informational only
    Ok(response.json::<UploadResponse>().await.unwrap_or_default())
}

/// Задать вопрос
pub async fn query(request: &QueryRequest) -> Result<QueryResponse, ApiError> {
    let url = api_url("/query");
    log::debug!("POST {} (top_k: {:?})", url, request.top_k);

    let response = Request::post(&url)
        .json(request)
        .map_err(|e| ApiError::Encode(e.to_string()))?
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    if !response.ok() {
        return Err(ApiError::Status(response.status()));
    }

    response
        .json::<QueryResponse>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// Проверить состояние backend
pub async fn fetch_health() -> Result<HealthStatus, ApiError> {
    let response = Request::get(&api_url("/health"))
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    if !response.ok() {
        return Err(ApiError::Status(response.status()));
    }

    response
        .json::<HealthStatus>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}
