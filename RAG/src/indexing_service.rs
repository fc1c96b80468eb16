use crate::document_processor::DocumentProcessor;
use crate::embedding_service::Embedder;
use crate::error::IngestError;
use crate::models::DocumentInfo;
use crate::similarity_index::{IndexStore, SimilarityIndex};
use std::sync::Arc;

/// Upload -> extract -> chunk -> embed -> swap in as the live index.
pub struct IndexingService {
    processor: DocumentProcessor,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn IndexStore>,
}

impl IndexingService {
    pub fn new(
        processor: DocumentProcessor,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn IndexStore>,
    ) -> Self {
        Self {
            processor,
            embedder,
            store,
        }
    }

    /// The previous index stays live until the new one is fully built, and is
    /// left untouched if any step fails.
    pub async fn ingest(&self, filename: &str, bytes: &[u8]) -> Result<DocumentInfo, IngestError> {
        let document = self.processor.process_upload(filename, bytes).await?;
        let index = SimilarityIndex::build(document, self.embedder.clone()).await?;
        let info = index.info();

        self.store.replace(Arc::new(index)).await;
        log::info!(
            "Indexed {} ({} pages, {} chunks) with {}",
            info.filename,
            info.pages,
            info.chunks,
            self.embedder.name()
        );
        Ok(info)
    }
}
