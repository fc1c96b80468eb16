use crate::backends::{AnswerBackend, CommandOutput, CommandRunner};
use crate::document_processor::DocumentProcessor;
use crate::embedding_service::{Embedder, HashingEmbedder};
use crate::error::BackendError;
use crate::similarity_index::SimilarityIndex;
use async_trait::async_trait;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn hashing_embedder() -> Arc<dyn Embedder> {
    Arc::new(HashingEmbedder::new(256).unwrap())
}

/// Index over `pages`, one page per entry.
pub async fn index_of(pages: &[&str]) -> SimilarityIndex {
    let pages: Vec<String> = pages.iter().map(|p| p.to_string()).collect();
    let document = DocumentProcessor::default()
        .build_document("test.pdf".into(), &pages)
        .unwrap();
    SimilarityIndex::build(document, hashing_embedder()).await.unwrap()
}

pub struct RecordingRunner {
    output: io::Result<CommandOutput>,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl RecordingRunner {
    pub fn succeeding(stdout: &str) -> Self {
        Self::with(Ok(CommandOutput {
            success: true,
            code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }))
    }

    pub fn failing(code: i32, stderr: &str) -> Self {
        Self::with(Ok(CommandOutput {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }))
    }

    fn with(output: io::Result<CommandOutput>) -> Self {
        Self {
            output,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_string(), args.to_vec()));
        match &self.output {
            Ok(output) => Ok(output.clone()),
            Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
        }
    }
}

/// Backend that answers with the top retrieved chunk, or fails on demand.
pub struct FakeBackend {
    fail_with: Option<String>,
    calls: AtomicUsize,
}

impl FakeBackend {
    pub fn answering() -> Self {
        Self {
            fail_with: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnswerBackend for FakeBackend {
    async fn answer(
        &self,
        question: &str,
        index: &SimilarityIndex,
        _credential: Option<&str>,
    ) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.fail_with {
            return Err(BackendError::Process(message.clone()));
        }
        let hits = index.similarity_search(question, 1).await?;
        Ok(hits
            .first()
            .map(|hit| hit.chunk.content.clone())
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "fake"
    }
}
