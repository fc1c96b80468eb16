use crate::api_client::{ApiClient, ServerReply};
use crate::Model;
use anyhow::Result;
use clap::ValueEnum;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

const HELP: &str = "Type a question, or one of:
  /upload <path>   upload and index a PDF
  /model <name>    primary-llm | local-model | local-cli-model
  /key <value>     set the OpenAI API key (/key alone clears it)
  /quit            leave";

/// Settings that persist across questions in one run.
pub struct Session {
    api: ApiClient,
    model: Model,
    openai_api_key: Option<String>,
}

impl Session {
    pub fn new(api: ApiClient, model: Model, openai_api_key: Option<String>) -> Self {
        Self {
            api,
            model,
            openai_api_key: openai_api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub async fn upload(&self, path: &Path) -> String {
        match self.api.upload(path).await {
            Ok(ServerReply { error: Some(error), .. }) => format!("Upload failed: {}", error),
            Ok(_) => "PDF uploaded and processed successfully!".to_string(),
            Err(e) => format!("Error: {:#}", e),
        }
    }

    pub async fn ask(&self, question: &str) -> String {
        let question = question.trim();
        if question.is_empty() {
            return "Please enter a question.".to_string();
        }

        let key = match self.model {
            Model::PrimaryLlm => self.openai_api_key.as_deref(),
            _ => None,
        };
        match self.api.query(question, self.model.as_str(), key).await {
            Ok(reply) => render_reply(reply),
            Err(e) => format!("Error: {:#}", e),
        }
    }

    pub async fn run_interactive(&mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        println!("Connected to {} using {}", self.api.base_url(), self.model.as_str());
        println!("{}", HELP);

        loop {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let output = match parse_command(line) {
                Input::Quit => break,
                Input::Help => HELP.to_string(),
                Input::Upload(path) => self.upload(Path::new(path)).await,
                Input::Model(name) => match Model::from_str(name, true) {
                    Ok(model) => {
                        self.model = model;
                        format!("Using {}", model.as_str())
                    }
                    Err(_) => format!("Unknown model '{}'", name),
                },
                Input::Key(value) => {
                    self.openai_api_key = value.map(str::to_string);
                    if self.openai_api_key.is_some() {
                        "API key set".to_string()
                    } else {
                        "API key cleared".to_string()
                    }
                }
                Input::Unknown(cmd) => format!("Unknown command '{}'. Try /help", cmd),
                Input::Question(question) => self.ask(question).await,
            };
            println!("{}", output);
        }

        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    Help,
    Upload(&'a str),
    Model(&'a str),
    Key(Option<&'a str>),
    Unknown(&'a str),
    Question(&'a str),
}

fn parse_command(line: &str) -> Input<'_> {
    let Some(command) = line.strip_prefix('/') else {
        return Input::Question(line);
    };
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "quit" | "exit" => Input::Quit,
        "help" => Input::Help,
        "upload" if !arg.is_empty() => Input::Upload(arg),
        "model" if !arg.is_empty() => Input::Model(arg),
        "key" => Input::Key(Some(arg).filter(|a| !a.is_empty())),
        _ => Input::Unknown(name),
    }
}

pub fn render_reply(reply: ServerReply) -> String {
    match reply {
        ServerReply { answer: Some(answer), .. } => format!("Answer: {}", answer),
        ServerReply { error: Some(error), .. } => format!("Error: {}", error),
        ServerReply { message: Some(message), .. } => message,
        _ => "Error: empty response".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_session_commands() {
        assert_eq!(parse_command("what is delta?"), Input::Question("what is delta?"));
        assert_eq!(parse_command("/upload  ./a b.pdf"), Input::Upload("./a b.pdf"));
        assert_eq!(parse_command("/model local-model"), Input::Model("local-model"));
        assert_eq!(parse_command("/key sk-123"), Input::Key(Some("sk-123")));
        assert_eq!(parse_command("/key"), Input::Key(None));
        assert_eq!(parse_command("/quit"), Input::Quit);
        assert_eq!(parse_command("/upload"), Input::Unknown("upload"));
    }

    #[test]
    fn renders_by_key_presence() {
        let answer = ServerReply {
            answer: Some("42".into()),
            message: None,
            error: None,
        };
        assert_eq!(render_reply(answer), "Answer: 42");

        let error = ServerReply {
            answer: None,
            message: None,
            error: Some("No document uploaded.".into()),
        };
        assert_eq!(render_reply(error), "Error: No document uploaded.");
    }

    #[tokio::test]
    async fn blank_question_is_not_sent() {
        let session = Session::new(ApiClient::new("http://127.0.0.1:9"), Model::LocalModel, None);
        assert_eq!(session.ask("   ").await, "Please enter a question.");
    }
}
