use thiserror::Error;

/// Failures while turning an uploaded PDF into a searchable index.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("missing multipart field 'file'")]
    MissingFile,
    #[error("uploaded file is empty")]
    EmptyUpload,
    #[error("failed to stage upload: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not read PDF: {0}")]
    Pdf(String),
    #[error("PDF contains no extractable text")]
    NoText,
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}

impl IngestError {
    /// True when the upload itself was at fault rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            IngestError::MissingFile
                | IngestError::EmptyUpload
                | IngestError::Pdf(_)
                | IngestError::NoText
        )
    }
}

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("embedding provider returned {status}: {body}")]
    Provider { status: u16, body: String },
    #[error("embedding provider returned {got} vectors for {expected} inputs")]
    CountMismatch { expected: usize, got: usize },
    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("embedding dimension must be greater than zero")]
    ZeroDimension,
}

/// Failure raised by one answer backend. The query service prefixes the
/// backend's display name before it reaches the caller.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("no API key provided and OPENAI_API_KEY is not set")]
    MissingCredential,
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] EmbeddingError),
    #[error("{0}")]
    Process(String),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}
