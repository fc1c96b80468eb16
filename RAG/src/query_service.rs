use crate::backends::{Backend, Backends};
use crate::models::{AnswerResponse, QueryRequest, NO_DOCUMENT_MESSAGE};
use crate::similarity_index::IndexStore;
use std::sync::Arc;

pub struct QueryService {
    store: Arc<dyn IndexStore>,
    backends: Backends,
}

impl QueryService {
    pub fn new(store: Arc<dyn IndexStore>, backends: Backends) -> Self {
        Self { store, backends }
    }

    /// Answers a wire request. Every failure comes back as
    /// [`AnswerResponse::Error`]; nothing propagates.
    pub async fn query(&self, request: &QueryRequest) -> AnswerResponse {
        let backend = match request.model.parse::<Backend>() {
            Ok(backend) => backend,
            Err(invalid) => {
                log::warn!("Rejected unknown model choice '{}'", invalid.0);
                return AnswerResponse::error(invalid.to_string());
            }
        };

        self.answer(&request.question, backend, request.credential())
            .await
    }

    pub async fn answer(
        &self,
        question: &str,
        backend: Backend,
        credential: Option<&str>,
    ) -> AnswerResponse {
        let Some(index) = self.store.current().await else {
            return AnswerResponse::error(NO_DOCUMENT_MESSAGE);
        };

        let handler = self.backends.get(backend);
        let start_time = std::time::Instant::now();
        let result = handler.answer(question, &index, credential).await;
        let elapsed = start_time.elapsed().as_millis();

        match result {
            Ok(answer) => {
                log::info!("{} ({}) answered in {} ms", backend, handler.name(), elapsed);
                AnswerResponse::Answer(answer)
            }
            Err(e) => {
                log::warn!(
                    "{} ({}) failed after {} ms: {}",
                    backend,
                    handler.name(),
                    elapsed,
                    e
                );
                AnswerResponse::error(format!("{} error: {}", backend.display_name(), e))
            }
        }
    }
}
