pub mod error_response;
pub mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use docqa_rag::RagSystem;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct AppState {
    pub rag: RagSystem,
    pub max_upload_bytes: usize,
}

pub fn create_router(rag: RagSystem, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/upload", post(handlers::upload_document))
        .route("/query", post(handlers::query))
        .route("/document", get(handlers::document_info))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(AppState {
            rag,
            max_upload_bytes,
        })
}
