use crate::error::IngestError;
use crate::models::DocumentChunk;
use crate::text_splitter::TextSplitter;
use pdf_extract::extract_text_by_pages;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const FALLBACK_FILENAME: &str = "upload.pdf";

/// Chunks of one uploaded PDF, ready to be embedded.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub filename: String,
    pub pages: usize,
    pub chunks: Vec<DocumentChunk>,
}

pub struct DocumentProcessor {
    splitter: TextSplitter,
}

impl DocumentProcessor {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            splitter: TextSplitter::new(chunk_size, chunk_overlap),
        }
    }

    /// Stages the upload in a private temp directory, extracts text page by
    /// page and splits it. The staging directory is removed on return.
    pub async fn process_upload(
        &self,
        filename: &str,
        bytes: &[u8],
    ) -> Result<ProcessedDocument, IngestError> {
        if bytes.is_empty() {
            return Err(IngestError::EmptyUpload);
        }

        let filename = sanitize_filename(filename);
        let staging = tempfile::tempdir()?;
        let file_path = staging.path().join(&filename);
        tokio::fs::write(&file_path, bytes).await?;

        log::info!("Processing PDF: {} ({} bytes)", filename, bytes.len());

        let pages = extract_pages(file_path).await?;
        self.build_document(filename, &pages)
    }

    pub fn build_document(
        &self,
        filename: String,
        pages: &[String],
    ) -> Result<ProcessedDocument, IngestError> {
        let mut chunks = Vec::new();

        for (page_idx, page_text) in pages.iter().enumerate() {
            for content in self.splitter.split_text(page_text) {
                chunks.push(DocumentChunk {
                    id: Uuid::new_v4().to_string(),
                    content,
                    page: page_idx + 1,
                    ordinal: chunks.len(),
                });
            }
        }

        if chunks.is_empty() {
            return Err(IngestError::NoText);
        }

        log::info!(
            "Created {} chunks from {} pages of {}",
            chunks.len(),
            pages.len(),
            filename
        );

        Ok(ProcessedDocument {
            filename,
            pages: pages.len(),
            chunks,
        })
    }
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self {
            splitter: TextSplitter::default(),
        }
    }
}

// The extractor can panic on hostile input; running it on a blocking task turns
// that into a join error instead of taking the request down.
async fn extract_pages(path: PathBuf) -> Result<Vec<String>, IngestError> {
    tokio::task::spawn_blocking(move || extract_text_by_pages(&path))
        .await
        .map_err(|e| IngestError::Pdf(format!("extractor aborted: {}", e)))?
        .map_err(|e| IngestError::Pdf(e.to_string()))
}

/// Keeps only the final path component of a client-supplied name.
pub fn sanitize_filename(filename: &str) -> String {
    Path::new(filename.trim())
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_FILENAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_pdf::sample_pdf;

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("/tmp/report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename(".."), FALLBACK_FILENAME);
        assert_eq!(sanitize_filename("  "), FALLBACK_FILENAME);
    }

    #[test]
    fn chunks_carry_page_and_ordinal() {
        let processor = DocumentProcessor::new(40, 5);
        let pages = vec![
            "first page words that run past forty characters easily".to_string(),
            String::new(),
            "third page".to_string(),
        ];
        let document = processor.build_document("doc.pdf".into(), &pages).unwrap();

        assert_eq!(document.pages, 3);
        assert!(document.chunks.len() >= 3);
        let last = document.chunks.last().unwrap();
        assert_eq!(last.page, 3);
        assert_eq!(last.content, "third page");
        for (i, chunk) in document.chunks.iter().enumerate() {
            assert_eq!(chunk.ordinal, i);
            assert_ne!(chunk.page, 2);
        }
    }

    #[test]
    fn blank_pages_only_is_no_text() {
        let processor = DocumentProcessor::default();
        let err = processor
            .build_document("empty.pdf".into(), &[" ".to_string(), "\n".to_string()])
            .unwrap_err();
        assert!(matches!(err, IngestError::NoText));
    }

    #[tokio::test]
    async fn rejects_empty_and_malformed_uploads() {
        let processor = DocumentProcessor::default();

        let err = processor.process_upload("a.pdf", &[]).await.unwrap_err();
        assert!(matches!(err, IngestError::EmptyUpload));

        let err = processor
            .process_upload("a.pdf", b"definitely not a pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Pdf(_)));
    }

    #[tokio::test]
    async fn extracts_text_from_each_page() {
        let bytes = sample_pdf(&["Alpha Beta Gamma", "Delta Epsilon"]);
        let document = DocumentProcessor::default()
            .process_upload("greek.pdf", &bytes)
            .await
            .unwrap();

        assert_eq!(document.filename, "greek.pdf");
        assert_eq!(document.pages, 2);
        let first = document.chunks.iter().find(|c| c.page == 1).unwrap();
        let second = document.chunks.iter().find(|c| c.page == 2).unwrap();
        assert!(first.content.contains("Alpha"));
        assert!(second.content.contains("Delta"));
        assert!(!first.content.contains("Delta"));
    }
}
