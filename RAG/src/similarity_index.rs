use crate::document_processor::ProcessedDocument;
use crate::embedding_service::{check_dimensions, cosine_similarity, Embedder};
use crate::error::{EmbeddingError, IngestError};
use crate::models::{DocumentChunk, DocumentInfo};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub chunk: DocumentChunk,
    pub score: f32,
}

struct IndexEntry {
    chunk: DocumentChunk,
    vector: Vec<f32>,
}

/// Chunks of one document with their vectors, plus the embedder that produced
/// them so questions land in the same vector space.
pub struct SimilarityIndex {
    filename: String,
    pages: usize,
    entries: Vec<IndexEntry>,
    dimension: usize,
    embedder: Arc<dyn Embedder>,
}

impl SimilarityIndex {
    pub async fn build(
        document: ProcessedDocument,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, IngestError> {
        let texts: Vec<String> = document
            .chunks
            .iter()
            .map(|chunk| chunk.content.clone())
            .collect();
        let vectors = embedder.embed(&texts).await?;
        if vectors.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                got: vectors.len(),
            }
            .into());
        }
        let dimension = check_dimensions(&vectors)?;

        let entries = document
            .chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry { chunk, vector })
            .collect();

        Ok(Self {
            filename: document.filename,
            pages: document.pages,
            entries,
            dimension,
            embedder,
        })
    }

    pub fn info(&self) -> DocumentInfo {
        DocumentInfo {
            filename: self.filename.clone(),
            pages: self.pages,
            chunks: self.entries.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top `k` chunks for `question`, most similar first. Equal scores keep
    /// document order.
    pub async fn similarity_search(
        &self,
        question: &str,
        k: usize,
    ) -> Result<Vec<SearchHit>, EmbeddingError> {
        let query = self
            .embedder
            .embed(&[question.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or(EmbeddingError::CountMismatch {
                expected: 1,
                got: 0,
            })?;
        if !self.entries.is_empty() && query.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                got: query.len(),
            });
        }

        Ok(self.search_by_vector(&query, k))
    }

    pub fn search_by_vector(&self, query: &[f32], k: usize) -> Vec<SearchHit> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (idx, cosine_similarity(query, &entry.vector)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        scored
            .into_iter()
            .take(k)
            .map(|(idx, score)| SearchHit {
                chunk: self.entries[idx].chunk.clone(),
                score,
            })
            .collect()
    }
}

/// Owner of the one live index. Uploads swap it wholesale; queries take a
/// snapshot and keep using it even if a newer upload lands meanwhile.
#[async_trait]
pub trait IndexStore: Send + Sync {
    async fn replace(&self, index: Arc<SimilarityIndex>);

    async fn current(&self) -> Option<Arc<SimilarityIndex>>;
}

#[derive(Default)]
pub struct InMemoryIndexStore {
    index: RwLock<Option<Arc<SimilarityIndex>>>,
}

impl InMemoryIndexStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IndexStore for InMemoryIndexStore {
    async fn replace(&self, index: Arc<SimilarityIndex>) {
        *self.index.write().await = Some(index);
    }

    async fn current(&self) -> Option<Arc<SimilarityIndex>> {
        self.index.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_processor::DocumentProcessor;
    use crate::embedding_service::HashingEmbedder;

    /// Chunks get 4-dimensional vectors, questions get 3.
    struct DriftingEmbedder;

    #[async_trait]
    impl Embedder for DriftingEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            let dimension = if texts.len() == 1 { 3 } else { 4 };
            Ok(texts.iter().map(|_| vec![1.0; dimension]).collect())
        }

        fn name(&self) -> &str {
            "drifting"
        }
    }

    fn embedder() -> Arc<dyn Embedder> {
        Arc::new(HashingEmbedder::new(512).unwrap())
    }

    fn document(pages: &[&str]) -> ProcessedDocument {
        DocumentProcessor::default()
            .build_document(
                "test.pdf".into(),
                &pages.iter().map(|p| p.to_string()).collect::<Vec<_>>(),
            )
            .unwrap()
    }

    #[tokio::test]
    async fn finds_chunk_holding_the_answer() {
        let filler = "lorem ipsum dolor sit amet ".repeat(60);
        let text = format!("Alpha Beta Gamma. {}\n\nThe secret codeword is Delta.", filler);
        let index = SimilarityIndex::build(document(&[text.as_str()]), embedder())
            .await
            .unwrap();
        assert!(index.len() > 2);

        let hits = index.similarity_search("what is the codeword delta", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].chunk.content.contains("Delta"));
    }

    #[tokio::test]
    async fn answer_outside_top_k_is_not_retrieved() {
        let filler = "lorem ipsum dolor sit amet ".repeat(60);
        let text = format!(
            "Alpha Beta Gamma lorem. {}\n\nDelta closes the document.",
            filler
        );
        let index = SimilarityIndex::build(document(&[text.as_str()]), embedder())
            .await
            .unwrap();

        let hits = index.similarity_search("alpha beta gamma", 1).await.unwrap();
        assert!(hits[0].chunk.content.contains("Alpha"));
        assert!(!hits[0].chunk.content.contains("Delta"));
    }

    #[tokio::test]
    async fn returns_at_most_k_hits_in_score_order() {
        let index = SimilarityIndex::build(
            document(&["apples and pears", "pears only", "bananas"]),
            embedder(),
        )
        .await
        .unwrap();

        let hits = index.similarity_search("pears", 10).await.unwrap();
        assert_eq!(hits.len(), 3);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(hits[0].chunk.content, "pears only");

        assert_eq!(index.similarity_search("pears", 2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn ties_keep_document_order() {
        let index = SimilarityIndex::build(document(&["zzz", "yyy", "xxx"]), embedder())
            .await
            .unwrap();
        let hits = index.search_by_vector(&vec![0.0; 512], 3);
        let ordinals: Vec<usize> = hits.iter().map(|h| h.chunk.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn query_vector_of_another_dimension_is_rejected() {
        let index = SimilarityIndex::build(
            document(&["first page", "second page"]),
            Arc::new(DriftingEmbedder),
        )
        .await
        .unwrap();

        let err = index.similarity_search("page", 1).await.unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::DimensionMismatch { expected: 4, got: 3 }
        ));
    }

    #[tokio::test]
    async fn store_replaces_instead_of_merging() {
        let store = InMemoryIndexStore::new();
        assert!(store.current().await.is_none());

        let first = Arc::new(
            SimilarityIndex::build(document(&["first document text"]), embedder())
                .await
                .unwrap(),
        );
        store.replace(first.clone()).await;

        let second = Arc::new(
            SimilarityIndex::build(document(&["second", "document"]), embedder())
                .await
                .unwrap(),
        );
        store.replace(second).await;

        let current = store.current().await.unwrap();
        assert_eq!(current.len(), 2);
        // an earlier snapshot stays readable after replacement
        assert_eq!(first.len(), 1);
    }
}
