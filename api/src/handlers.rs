use crate::error_response::UploadError;
use crate::AppState;
use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use docqa_rag::{
    AnswerResponse, DocumentInfo, IngestError, QueryRequest, UploadResponse, NO_DOCUMENT_MESSAGE,
    UPLOAD_SUCCESS_MESSAGE,
};
use serde::Serialize;
use serde_json::{json, Value};

pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, UploadError> {
    let read_error = |e: MultipartError| multipart_error(e, state.max_upload_bytes);
    while let Some(field) = multipart.next_field().await.map_err(read_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(read_error)?;

        state.rag.indexing.ingest(&filename, &data).await?;
        return Ok(Json(UploadResponse {
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
        }));
    }

    Err(IngestError::MissingFile.into())
}

fn multipart_error(e: MultipartError, max_upload_bytes: usize) -> UploadError {
    let status = e.status();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return UploadError::new(
            status,
            format!("Ingestion error: upload exceeds the {max_upload_bytes} byte limit"),
        );
    }
    UploadError::new(status, format!("Ingestion error: {}", e.body_text()))
}

/// Always 200; callers branch on `answer` vs `error`. A body that does not
/// deserialize is reported the same way.
pub async fn query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Json<AnswerResponse> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            log::warn!("Rejected query body: {}", rejection.body_text());
            return Json(AnswerResponse::error(format!(
                "Invalid request: {}",
                rejection.body_text()
            )));
        }
    };

    log::info!("Query for model '{}'", request.model);
    Json(state.rag.query.query(&request).await)
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum DocumentInfoResponse {
    Info(DocumentInfo),
    Missing { error: String },
}

pub async fn document_info(State(state): State<AppState>) -> Json<DocumentInfoResponse> {
    match state.rag.store.current().await {
        Some(index) => Json(DocumentInfoResponse::Info(index.info())),
        None => Json(DocumentInfoResponse::Missing {
            error: NO_DOCUMENT_MESSAGE.to_string(),
        }),
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
