/// Connection settings for the OpenAI-compatible HTTP transport.
///
/// The model identifier is intentionally absent: it belongs to the bot
/// configuration and is resolved by the dispatcher, while this struct only
/// describes *where* and *how* to reach the API.
///
/// # Fields
///
/// - `endpoint`: API base URL (e.g., `https://api.openai.com`).
/// - `api_key`: Bearer token; required by [`OpenAiService::new`].
/// - `timeout_secs`: Optional request timeout in seconds (default 60).
///
/// [`OpenAiService::new`]: crate::services::open_ai_service::OpenAiService::new
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::llm_model_config::LlmModelConfig;
///
/// let cfg = LlmModelConfig {
///     endpoint: "https://api.openai.com".to_string(),
///     api_key: Some("sk-...".to_string()),
///     timeout_secs: Some(30),
/// };
/// assert!(cfg.api_key.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmModelConfig {
    /// API base URL.
    pub endpoint: String,

    /// API key for authentication.
    pub api_key: Option<String>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.openai.com";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

    /// Config against the public OpenAI endpoint with default timeout.
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            api_key: Some(api_key.into()),
            timeout_secs: Some(Self::DEFAULT_TIMEOUT_SECS),
        }
    }
}
