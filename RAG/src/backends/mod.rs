pub mod local_cli;
pub mod local_model;
pub mod openai;

use crate::error::BackendError;
use crate::similarity_index::{SearchHit, SimilarityIndex};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use local_cli::{CommandOutput, CommandRunner, LocalCliBackend, ProcessRunner};
pub use local_model::LocalModelBackend;
pub use openai::OpenAiBackend;

pub const INVALID_MODEL_MESSAGE: &str =
    "Invalid model choice. Use 'primary-llm', 'local-model', or 'local-cli-model'.";

/// Which answer generator handles a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    PrimaryLlm,
    LocalModel,
    LocalCliModel,
}

impl Backend {
    pub const ALL: [Backend; 3] = [Backend::PrimaryLlm, Backend::LocalModel, Backend::LocalCliModel];

    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::PrimaryLlm => "primary-llm",
            Backend::LocalModel => "local-model",
            Backend::LocalCliModel => "local-cli-model",
        }
    }

    /// Name used as the prefix of error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Backend::PrimaryLlm => "OpenAI",
            Backend::LocalModel => "HuggingFace Local",
            Backend::LocalCliModel => "Ollama",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidBackend(pub String);

impl fmt::Display for InvalidBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(INVALID_MODEL_MESSAGE)
    }
}

impl std::error::Error for InvalidBackend {}

impl FromStr for Backend {
    type Err = InvalidBackend;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "primary-llm" | "openai" => Ok(Backend::PrimaryLlm),
            "local-model" | "huggingface" => Ok(Backend::LocalModel),
            "local-cli-model" | "ollama" => Ok(Backend::LocalCliModel),
            other => Err(InvalidBackend(other.to_string())),
        }
    }
}

/// One answer-generation strategy.
#[async_trait]
pub trait AnswerBackend: Send + Sync {
    async fn answer(
        &self,
        question: &str,
        index: &SimilarityIndex,
        credential: Option<&str>,
    ) -> Result<String, BackendError>;

    /// Model or service identifier, for logs.
    fn name(&self) -> &str;
}

/// The three strategies, looked up by [`Backend`].
#[derive(Clone)]
pub struct Backends {
    primary_llm: Arc<dyn AnswerBackend>,
    local_model: Arc<dyn AnswerBackend>,
    local_cli_model: Arc<dyn AnswerBackend>,
}

impl Backends {
    pub fn new(
        primary_llm: Arc<dyn AnswerBackend>,
        local_model: Arc<dyn AnswerBackend>,
        local_cli_model: Arc<dyn AnswerBackend>,
    ) -> Self {
        Self {
            primary_llm,
            local_model,
            local_cli_model,
        }
    }

    pub fn get(&self, backend: Backend) -> &Arc<dyn AnswerBackend> {
        match backend {
            Backend::PrimaryLlm => &self.primary_llm,
            Backend::LocalModel => &self.local_model,
            Backend::LocalCliModel => &self.local_cli_model,
        }
    }
}

/// Joins retrieved chunk texts for prompt stuffing.
pub(crate) fn join_hits(hits: &[SearchHit], separator: &str) -> String {
    hits.iter()
        .map(|hit| hit.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}
