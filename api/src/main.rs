use anyhow::{Context, Result};
use docqa_api::create_router;
use docqa_rag::{RagConfig, RagSystem};

#[tokio::main]
async fn main() -> Result<()> {
    let config = RagConfig::from_env()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let rag = RagSystem::from_config(&config)?;
    let app = create_router(rag, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    log::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
