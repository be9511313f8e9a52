//! Shared LLM access layer for the QA bot.
//!
//! - [`dispatcher`]: model-family dispatch behind one `complete` capability.
//! - [`services::open_ai_service`]: HTTP transport for chat, legacy completions and embeddings.
//! - [`config`]: model identifiers and env-driven transport config.
//! - [`telemetry`]: `tracing-subscriber` layer shared by the binary.

pub mod config;
pub mod dispatcher;
pub mod error_handler;
pub mod services;
pub mod telemetry;

pub use config::llm_model::{LlmModel, ModelFamily};
pub use config::llm_model_config::LlmModelConfig;
pub use dispatcher::{BoxFuture, Completer, CompletionTransport, LlmDispatcher};
pub use error_handler::{AiLlmError, ConfigError};
pub use services::open_ai_service::OpenAiService;
