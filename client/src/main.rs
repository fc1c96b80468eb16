mod api_client;
mod session;

use anyhow::Result;
use api_client::ApiClient;
use clap::{Parser, Subcommand, ValueEnum};
use session::Session;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Model {
    PrimaryLlm,
    LocalModel,
    LocalCliModel,
}

impl Model {
    pub fn as_str(&self) -> &'static str {
        match self {
            Model::PrimaryLlm => "primary-llm",
            Model::LocalModel => "local-model",
            Model::LocalCliModel => "local-cli-model",
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "docqa", about = "Upload a PDF and ask questions about it")]
struct Cli {
    /// Backend URL
    #[arg(long, env = "DOCQA_URL", default_value = "http://localhost:8000", global = true)]
    url: String,

    #[arg(long, value_enum, default_value_t = Model::PrimaryLlm, global = true)]
    model: Model,

    /// OpenAI API key sent with primary-llm questions (optional)
    #[arg(long, env = "DOCQA_OPENAI_API_KEY", hide_env_values = true, global = true)]
    openai_api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload and index a PDF, replacing the current document
    Upload { path: PathBuf },
    /// Ask one question about the uploaded document
    Ask { question: String },
    /// Interactive session
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut session = Session::new(ApiClient::new(cli.url), cli.model, cli.openai_api_key);

    match cli.command {
        Command::Upload { path } => println!("{}", session.upload(&path).await),
        Command::Ask { question } => println!("{}", session.ask(&question).await),
        Command::Chat => session.run_interactive().await?,
    }

    Ok(())
}
