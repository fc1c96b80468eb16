use crate::error::EmbeddingError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Turns text into fixed-dimension vectors. One vector per input, in order.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    fn name(&self) -> &str;
}

/// Sentence embeddings served by a local Ollama instance
/// (`all-minilm` is all-MiniLM-L6-v2).
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbedder {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .json(&EmbedRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Provider { status, body });
        }

        let body: EmbedResponse = response.json().await?;
        if body.embeddings.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                got: body.embeddings.len(),
            });
        }
        check_dimensions(&body.embeddings)?;

        log::debug!("Embedded {} texts with {}", texts.len(), self.model);
        Ok(body.embeddings)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Deterministic term-frequency embedding with hashed vocabulary slots.
/// Needs no model download, so it also backs offline runs and tests.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Result<Self, EmbeddingError> {
        if dimension == 0 {
            return Err(EmbeddingError::ZeroDimension);
        }
        Ok(Self { dimension })
    }

    fn encode(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimension];
        let words = tokenize(text);
        if words.is_empty() {
            return embedding;
        }

        let total_words = words.len() as f32;
        for (word, count) in count_words(&words) {
            let mut hasher = DefaultHasher::new();
            word.hash(&mut hasher);
            let idx = (hasher.finish() % self.dimension as u64) as usize;
            embedding[idx] += count as f32 / total_words;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in embedding.iter_mut() {
                *value /= norm;
            }
        }

        embedding
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|text| self.encode(text)).collect())
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
        })
        .filter(|word| word.chars().count() > 2)
        .collect()
}

fn count_words(words: &[String]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for word in words {
        *counts.entry(word.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Shared dimension of a batch of vectors; every vector must match the first.
pub(crate) fn check_dimensions(vectors: &[Vec<f32>]) -> Result<usize, EmbeddingError> {
    let Some(expected) = vectors.first().map(Vec::len) else {
        return Ok(0);
    };
    match vectors.iter().find(|v| v.len() != expected) {
        Some(ragged) => Err(EmbeddingError::DimensionMismatch {
            expected,
            got: ragged.len(),
        }),
        None => Ok(expected),
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let min_len = a.len().min(b.len());

    let dot_product: f32 = a[..min_len]
        .iter()
        .zip(b[..min_len].iter())
        .map(|(x, y)| x * y)
        .sum();

    let norm1: f32 = a[..min_len].iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm2: f32 = b[..min_len].iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm1 == 0.0 || norm2 == 0.0 {
        0.0
    } else {
        dot_product / (norm1 * norm2)
    }
}
