use super::AnswerBackend;
use crate::error::BackendError;
use crate::similarity_index::SimilarityIndex;
use async_trait::async_trait;
use std::io;
use std::sync::Arc;
use tokio::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs an external program to completion and captures its output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput>;
}

/// Spawns real child processes.
#[derive(Debug, Default, Clone)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        let output = Command::new(program).args(args).output().await?;
        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Asks a model through the `ollama run` command line. The question goes to
/// the model on its own; the uploaded document is not consulted.
pub struct LocalCliBackend {
    runner: Arc<dyn CommandRunner>,
    binary: String,
    model: String,
}

impl LocalCliBackend {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        binary: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            binary: binary.into(),
            model: model.into(),
        }
    }

    pub fn build_args(&self, question: &str) -> Vec<String> {
        vec![
            "run".to_string(),
            self.model.clone(),
            format!("Answer this question: {}", question),
        ]
    }
}

#[async_trait]
impl AnswerBackend for LocalCliBackend {
    async fn answer(
        &self,
        question: &str,
        _index: &SimilarityIndex,
        _credential: Option<&str>,
    ) -> Result<String, BackendError> {
        let args = self.build_args(question);
        let output = self
            .runner
            .run(&self.binary, &args)
            .await
            .map_err(|e| BackendError::Process(format!("failed to run '{}': {}", self.binary, e)))?;

        if !output.success {
            let code = output
                .code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(BackendError::Process(format!(
                "'{}' exited with {}: {}",
                self.binary,
                code,
                output.stderr.trim()
            )));
        }

        Ok(output.stdout.trim().to_string())
    }

    fn name(&self) -> &str {
        &self.model
    }
}
