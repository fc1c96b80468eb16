use anyhow::{anyhow, bail, Context, Result};
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProvider {
    Ollama,
    Hashing,
}

impl FromStr for EmbeddingProvider {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(EmbeddingProvider::Ollama),
            "hashing" => Ok(EmbeddingProvider::Hashing),
            other => Err(anyhow!("unknown EMBEDDING_PROVIDER '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RagConfig {
    pub bind_addr: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_max_tokens: u32,
    pub retrieval_k: usize,
    pub local_model_url: String,
    pub local_model_max_tokens: u32,
    pub ollama_bin: String,
    pub ollama_model: String,
    pub embedding_provider: EmbeddingProvider,
    pub ollama_url: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub max_upload_bytes: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-3.5-turbo-instruct".to_string(),
            openai_max_tokens: 256,
            retrieval_k: 4,
            local_model_url: "http://localhost:8080".to_string(),
            local_model_max_tokens: 512,
            ollama_bin: "ollama".to_string(),
            ollama_model: "mistral".to_string(),
            embedding_provider: EmbeddingProvider::Ollama,
            ollama_url: "http://localhost:11434".to_string(),
            embedding_model: "all-minilm".to_string(),
            embedding_dimension: 384,
            chunk_size: 500,
            chunk_overlap: 50,
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

impl RagConfig {
    /// Load configuration from the process environment, after reading `.env`.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_vars(env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        let defaults = Self::default();
        let text = |key: &str, default: String| -> String {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };

        let config = Self {
            bind_addr: text("BIND_ADDR", defaults.bind_addr),
            openai_api_key: vars
                .get("OPENAI_API_KEY")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            openai_base_url: text("OPENAI_BASE_URL", defaults.openai_base_url),
            openai_model: text("OPENAI_MODEL", defaults.openai_model),
            openai_max_tokens: parse_var(&vars, "OPENAI_MAX_TOKENS", defaults.openai_max_tokens)?,
            retrieval_k: parse_var(&vars, "RETRIEVAL_K", defaults.retrieval_k)?,
            local_model_url: text("LOCAL_MODEL_URL", defaults.local_model_url),
            local_model_max_tokens: parse_var(
                &vars,
                "LOCAL_MODEL_MAX_TOKENS",
                defaults.local_model_max_tokens,
            )?,
            ollama_bin: text("OLLAMA_BIN", defaults.ollama_bin),
            ollama_model: text("OLLAMA_MODEL", defaults.ollama_model),
            embedding_provider: parse_var(&vars, "EMBEDDING_PROVIDER", defaults.embedding_provider)?,
            ollama_url: text("OLLAMA_URL", defaults.ollama_url),
            embedding_model: text("EMBEDDING_MODEL", defaults.embedding_model),
            embedding_dimension: parse_var(&vars, "EMBEDDING_DIMENSION", defaults.embedding_dimension)?,
            chunk_size: parse_var(&vars, "CHUNK_SIZE", defaults.chunk_size)?,
            chunk_overlap: parse_var(&vars, "CHUNK_OVERLAP", defaults.chunk_overlap)?,
            max_upload_bytes: parse_var(&vars, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            bail!("CHUNK_SIZE must be greater than zero");
        }
        if self.chunk_overlap >= self.chunk_size {
            bail!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                self.chunk_overlap,
                self.chunk_size
            );
        }
        if self.retrieval_k == 0 {
            bail!("RETRIEVAL_K must be greater than zero");
        }
        if self.embedding_dimension == 0 {
            bail!("EMBEDDING_DIMENSION must be greater than zero");
        }
        Ok(())
    }
}

fn parse_var<T>(vars: &HashMap<String, String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow!("{}", e))
            .with_context(|| format!("invalid value '{}' for {}", raw, key)),
        None => Ok(default),
    }
}
