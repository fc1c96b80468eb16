use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use docqa_rag::IngestError;
use serde_json::json;

/// Upload failure rendered with the same `{"error": ...}` body the query
/// endpoint uses.
#[derive(Debug)]
pub struct UploadError {
    status: StatusCode,
    message: String,
}

impl UploadError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<IngestError> for UploadError {
    fn from(err: IngestError) -> Self {
        let status = match &err {
            IngestError::MissingFile | IngestError::EmptyUpload => StatusCode::BAD_REQUEST,
            IngestError::Pdf(_) | IngestError::NoText => StatusCode::UNPROCESSABLE_ENTITY,
            IngestError::Io(_) | IngestError::Embedding(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, format!("Ingestion error: {}", err))
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            log::error!("Upload failed: {}", self.message);
        } else {
            log::warn!("Upload rejected: {}", self.message);
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
