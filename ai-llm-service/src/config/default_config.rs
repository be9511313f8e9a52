//! Default transport config loaded strictly from environment variables.
//!
//! # Environment variables
//!
//! - `OPENAI_API_KEY`      = bearer token (mandatory)
//! - `OPENAI_URL`          = API base URL (optional, default `https://api.openai.com`)
//! - `OPENAI_TIMEOUT_SECS` = request timeout in seconds (optional, default 60)

use crate::{
    config::llm_model_config::LlmModelConfig,
    error_handler::{AiLlmError, env_opt_u64, must_env, validate_http_endpoint},
};

/// Resolves the OpenAI endpoint from environment.
///
/// # Errors
///
/// - [`ConfigError::InvalidFormat`] if `OPENAI_URL` is set without an http(s) scheme
///
/// [`ConfigError::InvalidFormat`]: crate::error_handler::ConfigError::InvalidFormat
fn openai_endpoint() -> Result<String, AiLlmError> {
    match std::env::var("OPENAI_URL") {
        Ok(url) if !url.trim().is_empty() => {
            let url = url.trim().to_string();
            validate_http_endpoint("OPENAI_URL", &url)?;
            Ok(url)
        }
        _ => Ok(LlmModelConfig::DEFAULT_ENDPOINT.to_string()),
    }
}

/// Constructs the transport config for the OpenAI API.
///
/// # Env
/// - `OPENAI_API_KEY` (required)
/// - `OPENAI_URL` (optional)
/// - `OPENAI_TIMEOUT_SECS` (optional)
///
/// # Errors
/// - [`ConfigError::MissingVar`] if `OPENAI_API_KEY` is missing
/// - [`ConfigError::InvalidNumber`] if `OPENAI_TIMEOUT_SECS` is not a number
///
/// [`ConfigError::MissingVar`]: crate::error_handler::ConfigError::MissingVar
/// [`ConfigError::InvalidNumber`]: crate::error_handler::ConfigError::InvalidNumber
pub fn config_openai_from_env() -> Result<LlmModelConfig, AiLlmError> {
    let endpoint = openai_endpoint()?;
    let api_key = must_env("OPENAI_API_KEY")?;
    let timeout_secs =
        env_opt_u64("OPENAI_TIMEOUT_SECS")?.or(Some(LlmModelConfig::DEFAULT_TIMEOUT_SECS));

    Ok(LlmModelConfig {
        endpoint,
        api_key: Some(api_key),
        timeout_secs,
    })
}
