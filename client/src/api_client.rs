use anyhow::{anyhow, Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize)]
struct QueryPayload<'a> {
    question: &'a str,
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    openai_api_key: Option<&'a str>,
}

/// Body of `/query` and failed `/upload` responses. Exactly one key is set.
#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct ServerReply {
    pub answer: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
}

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn upload(&self, path: &Path) -> Result<ServerReply> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.pdf".to_string());

        let part = Part::bytes(bytes)
            .file_name(filename)
            .mime_str("application/pdf")?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await?;
        Self::read_reply(response).await
    }

    pub async fn query(
        &self,
        question: &str,
        model: &str,
        openai_api_key: Option<&str>,
    ) -> Result<ServerReply> {
        let response = self
            .client
            .post(format!("{}/query", self.base_url))
            .json(&QueryPayload {
                question,
                model,
                openai_api_key,
            })
            .send()
            .await?;
        Self::read_reply(response).await
    }

    async fn read_reply(response: reqwest::Response) -> Result<ServerReply> {
        let status = response.status();
        let text = response.text().await?;
        log::debug!("server replied {}: {}", status, text);

        match serde_json::from_str::<ServerReply>(&text) {
            Ok(reply) if reply.answer.is_some() || reply.message.is_some() || reply.error.is_some() => {
                Ok(reply)
            }
            _ => Err(anyhow!("request failed ({}): {}", status, text)),
        }
    }
}
