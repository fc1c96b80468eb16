use super::{join_hits, AnswerBackend};
use crate::error::BackendError;
use crate::similarity_index::SimilarityIndex;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const LOCAL_MODEL_K: usize = 4;

/// Local sequence-to-sequence model (flan-t5 or similar) behind a
/// text-generation-inference `/generate` endpoint.
pub struct LocalModelBackend {
    client: Client,
    base_url: String,
    max_new_tokens: u32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    inputs: String,
    parameters: GenerateParameters,
}

#[derive(Debug, Serialize)]
struct GenerateParameters {
    max_new_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    generated_text: String,
}

impl LocalModelBackend {
    pub fn new(base_url: impl Into<String>, max_new_tokens: u32) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_new_tokens,
        }
    }
}

pub fn build_prompt(question: &str, context: &str) -> String {
    format!("Context: {context}\n\nQuestion: {question}\nAnswer:")
}

#[async_trait]
impl AnswerBackend for LocalModelBackend {
    async fn answer(
        &self,
        question: &str,
        index: &SimilarityIndex,
        _credential: Option<&str>,
    ) -> Result<String, BackendError> {
        let hits = index.similarity_search(question, LOCAL_MODEL_K).await?;
        log::info!("Retrieved {} chunks for {}", hits.len(), self.name());
        let context = join_hits(&hits, " ");

        let request = GenerateRequest {
            inputs: build_prompt(question, &context),
            parameters: GenerateParameters {
                max_new_tokens: self.max_new_tokens,
            },
        };

        // Greedy generation, capped at max_new_tokens
        let response = self
            .client
            .post(format!("{}/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await?;
            return Err(BackendError::Api { status, body });
        }

        let generated: GenerateResponse = response.json().await?;
        Ok(generated.generated_text)
    }

    fn name(&self) -> &str {
        "text-generation-inference"
    }
}
