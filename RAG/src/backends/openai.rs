use super::{join_hits, AnswerBackend};
use crate::error::BackendError;
use crate::similarity_index::SimilarityIndex;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Hosted completion model. Retrieved chunks are stuffed verbatim into one
/// prompt and sampled at temperature 0.
pub struct OpenAiBackend {
    client: Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    retrieval_k: usize,
    default_api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

impl OpenAiBackend {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        default_api_key: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            max_tokens: 256,
            retrieval_k: 4,
            default_api_key,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_retrieval_k(mut self, k: usize) -> Self {
        self.retrieval_k = k.max(1);
        self
    }

    fn build_prompt(&self, question: &str, context: &str) -> String {
        format!(
            "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\n\
{context}\n\nQuestion: {question}\nHelpful Answer:"
        )
    }
}

#[async_trait]
impl AnswerBackend for OpenAiBackend {
    async fn answer(
        &self,
        question: &str,
        index: &SimilarityIndex,
        credential: Option<&str>,
    ) -> Result<String, BackendError> {
        // The caller's key wins over the server default
        let api_key = credential
            .or(self.default_api_key.as_deref())
            .ok_or(BackendError::MissingCredential)?;

        // Retrieve and stuff every hit into a single prompt
        let hits = index.similarity_search(question, self.retrieval_k).await?;
        log::info!("Retrieved {} chunks for {}", hits.len(), self.model);
        let context = join_hits(&hits, "\n\n");
        let request = CompletionRequest {
            model: &self.model,
            prompt: self.build_prompt(question, &context),
            temperature: 0.0,
            max_tokens: self.max_tokens,
        };

        // Call completions endpoint
        let response = self
            .client
            .post(format!("{}/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await?;
            return Err(BackendError::Api { status, body });
        }

        // First choice only
        let completion: CompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text.trim().to_string())
            .ok_or_else(|| BackendError::InvalidResponse("no completion choices".to_string()))
    }

    fn name(&self) -> &str {
        &self.model
    }
}
