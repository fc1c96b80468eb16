use serde::{Deserialize, Serialize};

pub const NO_DOCUMENT_MESSAGE: &str = "No document uploaded.";
pub const UPLOAD_SUCCESS_MESSAGE: &str = "Document uploaded and processed successfully.";

/// A contiguous span of extracted page text, the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: String,
    pub content: String,
    /// 1-based page the chunk was cut from.
    pub page: usize,
    /// Position of the chunk within the whole document.
    pub ordinal: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
}

impl QueryRequest {
    /// The caller-supplied credential, with blank strings treated as absent.
    pub fn credential(&self) -> Option<&str> {
        self.openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Either an answer or an error, never both. Serializes as
/// `{"answer": "..."}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerResponse {
    Answer(String),
    Error(String),
}

impl AnswerResponse {
    pub fn error(message: impl Into<String>) -> Self {
        AnswerResponse::Error(message.into())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub filename: String,
    pub pages: usize,
    pub chunks: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn answer_response_is_keyed_by_variant() {
        let answer = serde_json::to_value(AnswerResponse::Answer("42".into())).unwrap();
        assert_eq!(answer, json!({ "answer": "42" }));

        let error = serde_json::to_value(AnswerResponse::error(NO_DOCUMENT_MESSAGE)).unwrap();
        assert_eq!(error, json!({ "error": "No document uploaded." }));
    }

    #[test]
    fn blank_credential_counts_as_missing() {
        let request: QueryRequest = serde_json::from_value(json!({
            "question": "q",
            "model": "primary-llm",
            "openai_api_key": "   "
        }))
        .unwrap();
        assert_eq!(request.credential(), None);

        let request: QueryRequest =
            serde_json::from_value(json!({ "question": "q", "model": "ollama" })).unwrap();
        assert!(request.openai_api_key.is_none());
    }
}
