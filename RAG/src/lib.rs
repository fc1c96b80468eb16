pub mod backends;
pub mod config;
pub mod document_processor;
pub mod embedding_service;
pub mod error;
pub mod indexing_service;
pub mod models;
pub mod query_service;
pub mod rag_system;
pub mod similarity_index;
pub mod text_splitter;

#[cfg(any(test, feature = "test-util"))]
pub mod test_pdf;
#[cfg(test)]
pub(crate) mod test_support;

pub use backends::{AnswerBackend, Backend, Backends};
pub use config::RagConfig;
pub use document_processor::DocumentProcessor;
pub use embedding_service::{Embedder, HashingEmbedder, OllamaEmbedder};
pub use error::{BackendError, EmbeddingError, IngestError};
pub use indexing_service::IndexingService;
pub use models::*;
pub use query_service::QueryService;
pub use rag_system::RagSystem;
pub use similarity_index::{InMemoryIndexStore, IndexStore, SimilarityIndex};
