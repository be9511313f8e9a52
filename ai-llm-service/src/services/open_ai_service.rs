//! OpenAI service for chat completions, legacy completions and embeddings.
//!
//! Minimal, non-streaming client around the OpenAI REST API.
//! Endpoints are derived from `LlmModelConfig::endpoint`:
//! - POST {endpoint}/v1/chat/completions: chat completion
//! - POST {endpoint}/v1/completions: legacy text completion
//! - POST {endpoint}/v1/embeddings : embeddings retrieval
//!
//! Constructor validation:
//! - `cfg.api_key` must be present
//! - `cfg.endpoint` must start with http:// or https://
//!
//! The service returns decoded payloads as-is; picking the first choice is
//! the dispatcher's job.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, error, info};

use crate::{
    config::llm_model_config::LlmModelConfig,
    dispatcher::{BoxFuture, CompletionTransport},
    error_handler::{
        AiLlmError, HttpError, Provider, ProviderError, ProviderErrorKind, make_snippet,
    },
    services::payloads::{
        ChatCompletionRequest, ChatCompletionResponse, EmbeddingsRequest, EmbeddingsResponse,
        TextCompletionRequest, TextCompletionResponse,
    },
};

/// Thin client for the OpenAI API.
///
/// Constructed from a complete [`LlmModelConfig`]. Internally keeps a
/// preconfigured `reqwest::Client` (with timeout and default headers), so one
/// instance should be created per process and shared behind an `Arc`.
#[derive(Debug)]
pub struct OpenAiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_chat: String,
    url_completions: String,
    url_embeddings: String,
}

impl OpenAiService {
    /// Creates a new [`OpenAiService`] from the given config.
    ///
    /// # Errors
    /// - [`AiLlmError::Provider`] with `MissingApiKey` if `cfg.api_key` is `None`
    /// - [`AiLlmError::Provider`] with `InvalidEndpoint` if `cfg.endpoint` is invalid
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        let api_key = cfg
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ProviderError::new(Provider::OpenAI, ProviderErrorKind::MissingApiKey))?;

        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ProviderError::new(
                Provider::OpenAI,
                ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone()),
            )
            .into());
        }

        let timeout = Duration::from_secs(
            cfg.timeout_secs
                .unwrap_or(LlmModelConfig::DEFAULT_TIMEOUT_SECS),
        );

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|e| {
                ProviderError::new(
                    Provider::OpenAI,
                    ProviderErrorKind::Decode(format!("invalid API key header: {e}")),
                )
            })?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let base = endpoint.trim_end_matches('/').to_string();
        let url_chat = format!("{}/v1/chat/completions", base);
        let url_completions = format!("{}/v1/completions", base);
        let url_embeddings = format!("{}/v1/embeddings", base);

        info!(
            endpoint = %cfg.endpoint,
            timeout_secs = timeout.as_secs(),
            "OpenAiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_chat,
            url_completions,
            url_embeddings,
        })
    }

    /// Performs a **non-streaming** chat completion request (`/v1/chat/completions`).
    ///
    /// # Errors
    /// - [`AiLlmError::Provider`] with `HttpStatus` for non-2xx responses
    /// - [`AiLlmError::HttpTransport`] for client/network failures
    /// - [`AiLlmError::Provider`] with `Decode` if the JSON cannot be parsed
    pub async fn chat_completion(
        &self,
        body: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, AiLlmError> {
        self.post_json(&self.url_chat, &body.model, body).await
    }

    /// Performs a legacy text completion request (`/v1/completions`).
    ///
    /// # Errors
    /// Same as [`OpenAiService::chat_completion`].
    pub async fn text_completion(
        &self,
        body: &TextCompletionRequest,
    ) -> Result<TextCompletionResponse, AiLlmError> {
        self.post_json(&self.url_completions, &body.model, body).await
    }

    /// Retrieves a single embeddings vector via `/v1/embeddings`.
    ///
    /// # Errors
    /// - everything [`OpenAiService::embeddings_batch`] returns
    /// - [`AiLlmError::Provider`] with `Decode` if `data` is empty
    pub async fn embeddings(&self, model: &str, input: &str) -> Result<Vec<f32>, AiLlmError> {
        let mut out = self.embeddings_batch(model, &[input.to_string()]).await?;
        out.pop().ok_or_else(|| {
            ProviderError::new(
                Provider::OpenAI,
                ProviderErrorKind::Decode("empty `data` in embeddings response".into()),
            )
            .into()
        })
    }

    /// Retrieves one embeddings vector per input, in input order.
    ///
    /// # Errors
    /// - [`AiLlmError::Provider`] with `HttpStatus` for non-2xx responses
    /// - [`AiLlmError::HttpTransport`] for client/network failures
    /// - [`AiLlmError::Provider`] with `Decode` if the JSON cannot be parsed
    ///   or the number of vectors differs from the number of inputs
    pub async fn embeddings_batch(
        &self,
        model: &str,
        inputs: &[String],
    ) -> Result<Vec<Vec<f32>>, AiLlmError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let body = EmbeddingsRequest {
            model,
            input: inputs,
        };
        let out: EmbeddingsResponse = self.post_json(&self.url_embeddings, model, &body).await?;

        if out.data.len() != inputs.len() {
            return Err(ProviderError::new(
                Provider::OpenAI,
                ProviderErrorKind::Decode(format!(
                    "expected {} embeddings, got {}",
                    inputs.len(),
                    out.data.len()
                )),
            )
            .into());
        }

        let mut items = out.data;
        items.sort_by_key(|d| d.index);
        Ok(items.into_iter().map(|d| d.embedding).collect())
    }

    fn transport_error(&self, e: reqwest::Error) -> AiLlmError {
        if e.is_timeout() {
            AiLlmError::Timeout(Duration::from_secs(
                self.cfg
                    .timeout_secs
                    .unwrap_or(LlmModelConfig::DEFAULT_TIMEOUT_SECS),
            ))
        } else {
            AiLlmError::HttpTransport(e)
        }
    }

    /// POSTs `body` as JSON and decodes the 2xx response into `T`.
    async fn post_json<B, T>(&self, url: &str, model: &str, body: &B) -> Result<T, AiLlmError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let started = Instant::now();

        debug!(model = %model, endpoint = %self.cfg.endpoint, "POST {}", url);

        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                model = %model,
                latency_ms = started.elapsed().as_millis(),
                "OpenAI returned non-success status"
            );

            return Err(ProviderError::new(
                Provider::OpenAI,
                ProviderErrorKind::HttpStatus(HttpError {
                    status,
                    url: url.to_string(),
                    snippet,
                }),
            )
            .into());
        }

        let out: T = match resp.json().await {
            Ok(v) => v,
            Err(e) => {
                error!(
                    error = %e,
                    %url,
                    model = %model,
                    latency_ms = started.elapsed().as_millis(),
                    "failed to decode OpenAI response"
                );
                return Err(ProviderError::new(
                    Provider::OpenAI,
                    ProviderErrorKind::Decode(format!("serde error: {e}")),
                )
                .into());
            }
        };

        debug!(
            %url,
            model = %model,
            latency_ms = started.elapsed().as_millis(),
            "request completed"
        );

        Ok(out)
    }
}

impl CompletionTransport for OpenAiService {
    fn chat_completion<'a>(
        &'a self,
        req: ChatCompletionRequest,
    ) -> BoxFuture<'a, Result<ChatCompletionResponse, AiLlmError>> {
        Box::pin(async move { OpenAiService::chat_completion(self, &req).await })
    }

    fn text_completion<'a>(
        &'a self,
        req: TextCompletionRequest,
    ) -> BoxFuture<'a, Result<TextCompletionResponse, AiLlmError>> {
        Box::pin(async move { OpenAiService::text_completion(self, &req).await })
    }
}
