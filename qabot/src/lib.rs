//! Retrieval-augmented QA bot.
//!
//! Public API: [`Bot::chat`]. With no history the question goes through the
//! single-turn pipeline (segment, embed, retrieve top-K, render prompt,
//! complete). With history, a front-agent prompt decides whether to answer
//! directly or to rewrite the question (prefixed with the `QUERY:` sentinel)
//! and hand it to the single-turn pipeline.
//!
//! # Example
//! ```no_run
//! # use std::sync::Arc;
//! # use qabot::{Bot, BotConfig, Turn};
//! # use rag_store::{LocalVectorStore, OpenAiEncoder, OpenAiEncoderConfig};
//! # use ai_llm_service::{LlmModelConfig, OpenAiService};
//! # #[tokio::main] async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let openai = Arc::new(OpenAiService::new(LlmModelConfig::openai("sk-..."))?);
//! let encoder = Arc::new(OpenAiEncoder::new(openai.clone(), OpenAiEncoderConfig::default()));
//! let store = Arc::new(LocalVectorStore::new());
//! store.load_json("docs.json")?;
//!
//! let bot = Bot::new(BotConfig::new(encoder, store), openai)?;
//! let history = [Turn::new("What is GPT-3?", "An AI model.")];
//! println!("{}", bot.chat("How many parameters?", &history).await?);
//! # Ok(()) }
//! ```

mod bot;
mod cfg;
mod error;
mod multi_turn;
mod prompt;
mod segment;
mod single_turn;
pub mod template;

#[cfg(test)]
mod testing;

pub use bot::Bot;
pub use cfg::{BotConfig, DEFAULT_MAX_TOKENS, DEFAULT_TOP_K};
pub use error::{BotConfigError, BotError};
pub use prompt::{
    DEFAULT_MULTI_TURN_PROMPT_TMPL, DEFAULT_PROMPT_TMPL, DEFAULT_QUERY_PREFIX, MultiTurnPromptData,
    PromptData, Turn, TurnData,
};
pub use segment::{JiebaSegmenter, NoopSegmenter, Segmenter};
