use crate::backends::{Backends, LocalCliBackend, LocalModelBackend, OpenAiBackend, ProcessRunner};
use crate::config::{EmbeddingProvider, RagConfig};
use crate::document_processor::DocumentProcessor;
use crate::embedding_service::{Embedder, HashingEmbedder, OllamaEmbedder};
use crate::indexing_service::IndexingService;
use crate::query_service::QueryService;
use crate::similarity_index::{InMemoryIndexStore, IndexStore};
use anyhow::Result;
use std::sync::Arc;

/// Both services sharing one index store.
#[derive(Clone)]
pub struct RagSystem {
    pub indexing: Arc<IndexingService>,
    pub query: Arc<QueryService>,
    pub store: Arc<dyn IndexStore>,
}

impl RagSystem {
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        log::info!("Initializing RAG system...");

        let embedder: Arc<dyn Embedder> = match config.embedding_provider {
            EmbeddingProvider::Ollama => {
                log::info!(
                    "Embedding with {} via {}",
                    config.embedding_model,
                    config.ollama_url
                );
                Arc::new(OllamaEmbedder::new(&config.ollama_url, &config.embedding_model))
            }
            EmbeddingProvider::Hashing => {
                log::info!("Embedding with hashing embedder ({} dims)", config.embedding_dimension);
                Arc::new(HashingEmbedder::new(config.embedding_dimension)?)
            }
        };

        if config.openai_api_key.is_none() {
            log::warn!("OPENAI_API_KEY not set; primary-llm requires a per-request key");
        }

        let backends = Backends::new(
            Arc::new(
                OpenAiBackend::new(
                    &config.openai_base_url,
                    &config.openai_model,
                    config.openai_api_key.clone(),
                )
                .with_max_tokens(config.openai_max_tokens)
                .with_retrieval_k(config.retrieval_k),
            ),
            Arc::new(LocalModelBackend::new(
                &config.local_model_url,
                config.local_model_max_tokens,
            )),
            Arc::new(LocalCliBackend::new(
                Arc::new(ProcessRunner),
                &config.ollama_bin,
                &config.ollama_model,
            )),
        );

        let processor = DocumentProcessor::new(config.chunk_size, config.chunk_overlap);
        Ok(Self::new(processor, embedder, backends))
    }

    pub fn new(processor: DocumentProcessor, embedder: Arc<dyn Embedder>, backends: Backends) -> Self {
        let store: Arc<dyn IndexStore> = Arc::new(InMemoryIndexStore::new());
        Self {
            indexing: Arc::new(IndexingService::new(processor, embedder, store.clone())),
            query: Arc::new(QueryService::new(store.clone(), backends)),
            store,
        }
    }
}
