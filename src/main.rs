use std::error::Error;
use std::sync::Arc;

use ai_llm_service::config::default_config::config_openai_from_env;
use ai_llm_service::{OpenAiService, telemetry};
use qabot::{Bot, BotConfig};
use rag_store::{
    LocalVectorStore, OpenAiEncoder, OpenAiEncoderConfig, QdrantQuerier, Querier, RagConfig,
};
use tracing::{Level, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine: the process environment may carry everything.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("warn", Level::INFO))
        .with(telemetry::layer())
        .try_init()?;

    if let Err(e) = dotenv {
        warn!(error = %e, ".env not loaded");
    }

    let openai = Arc::new(OpenAiService::new(config_openai_from_env()?)?);
    let encoder = Arc::new(OpenAiEncoder::new(
        openai.clone(),
        OpenAiEncoderConfig::from_env()?,
    ));
    let querier = querier_from_env()?;

    let cfg = BotConfig::from_env()?
        .with_encoder(encoder)
        .with_querier(querier);
    let bot = Arc::new(Bot::new(cfg, openai)?);

    api::start(bot).await?;
    Ok(())
}

/// `VECTOR_STORE=qdrant` (default) or `local` with `LOCAL_STORE_PATH`.
fn querier_from_env() -> Result<Arc<dyn Querier>, Box<dyn Error>> {
    let kind = std::env::var("VECTOR_STORE").unwrap_or_else(|_| "qdrant".into());
    match kind.trim().to_ascii_lowercase().as_str() {
        "local" => {
            let store = LocalVectorStore::new();
            match std::env::var("LOCAL_STORE_PATH") {
                Ok(path) if !path.trim().is_empty() => {
                    store.load_json(path.trim())?;
                }
                _ => warn!("LOCAL_STORE_PATH not set; local vector store is empty"),
            }
            info!(documents = store.len(), "using local vector store");
            Ok(Arc::new(store))
        }
        "qdrant" | "" => {
            let cfg = RagConfig::from_env()?;
            info!(url = %cfg.qdrant_url, collection = %cfg.collection, "using qdrant");
            Ok(Arc::new(QdrantQuerier::new(&cfg)?))
        }
        other => Err(format!("unsupported VECTOR_STORE {other:?} (expected qdrant|local)").into()),
    }
}
