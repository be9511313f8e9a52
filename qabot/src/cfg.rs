//! Bot configuration: collaborators plus knobs, resolved once at construction.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use ai_llm_service::LlmModel;
use rag_store::{Encoder, Querier};

use crate::error::BotConfigError;
use crate::prompt::{DEFAULT_MULTI_TURN_PROMPT_TMPL, DEFAULT_PROMPT_TMPL, DEFAULT_QUERY_PREFIX};
use crate::segment::{JiebaSegmenter, Segmenter};

pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_MAX_TOKENS: u32 = 256;

/// Everything a [`Bot`](crate::Bot) needs. Empty strings and zero numbers
/// mean "use the default"; see [`BotConfig::resolve`].
#[derive(Clone, Default)]
pub struct BotConfig {
    /// Model identifier, e.g. `gpt-3.5-turbo` or `text-davinci-003`.
    pub model: String,
    /// Number of passages retrieved per question.
    pub top_k: usize,
    /// Completion token cap for every LLM call.
    pub max_tokens: u32,
    /// Single-turn template source (`.Question`, `.Sections`).
    pub prompt_tmpl: String,
    /// Multi-turn template source (`.Turns`, `.Question`, `.Prefix`).
    pub multi_turn_prompt_tmpl: String,
    /// Sentinel the front agent writes before a refined question.
    pub query_prefix: String,
    /// Log every prompt and raw completion response.
    pub debug: bool,

    pub encoder: Option<Arc<dyn Encoder>>,
    pub querier: Option<Arc<dyn Querier>>,
    /// Applied before encoding; passthrough when absent.
    pub segmenter: Option<Arc<dyn Segmenter>>,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("model", &self.model)
            .field("top_k", &self.top_k)
            .field("max_tokens", &self.max_tokens)
            .field("prompt_tmpl_len", &self.prompt_tmpl.len())
            .field("multi_turn_prompt_tmpl_len", &self.multi_turn_prompt_tmpl.len())
            .field("query_prefix", &self.query_prefix)
            .field("debug", &self.debug)
            .field("encoder", &self.encoder.is_some())
            .field("querier", &self.querier.is_some())
            .field("segmenter", &self.segmenter.is_some())
            .finish()
    }
}

impl BotConfig {
    pub fn new(encoder: Arc<dyn Encoder>, querier: Arc<dyn Querier>) -> Self {
        Self {
            encoder: Some(encoder),
            querier: Some(querier),
            ..Self::default()
        }
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn Encoder>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    pub fn with_querier(mut self, querier: Arc<dyn Querier>) -> Self {
        self.querier = Some(querier);
        self
    }

    pub fn with_segmenter(mut self, segmenter: Arc<dyn Segmenter>) -> Self {
        self.segmenter = Some(segmenter);
        self
    }

    /// Reads knobs from the environment. Collaborators other than the
    /// segmenter are left unset.
    ///
    /// | var | default |
    /// |---|---|
    /// | `BOT_MODEL` | `gpt-3.5-turbo` |
    /// | `BOT_TOP_K` | 3 |
    /// | `BOT_MAX_TOKENS` | 256 |
    /// | `BOT_PROMPT_TMPL_FILE` | built-in |
    /// | `BOT_MULTI_TURN_PROMPT_TMPL_FILE` | built-in |
    /// | `BOT_QUERY_PREFIX` | `QUERY:` |
    /// | `BOT_DEBUG` | false |
    /// | `JIEBA_ENABLED` / `JIEBA_DICT_PATHS` | segmentation off |
    ///
    /// # Errors
    /// Unparsable numbers and unreadable template files.
    pub fn from_env() -> Result<Self, BotConfigError> {
        Self::from_vars(|k| std::env::var(k).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary lookup.
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self, BotConfigError> {
        let mut cfg = Self {
            model: get("BOT_MODEL").unwrap_or_default(),
            top_k: parse(&get, "BOT_TOP_K")?.unwrap_or(0),
            max_tokens: parse(&get, "BOT_MAX_TOKENS")?.unwrap_or(0),
            prompt_tmpl: read_file(get("BOT_PROMPT_TMPL_FILE"))?,
            multi_turn_prompt_tmpl: read_file(get("BOT_MULTI_TURN_PROMPT_TMPL_FILE"))?,
            query_prefix: get("BOT_QUERY_PREFIX").unwrap_or_default(),
            debug: flag(&get, "BOT_DEBUG"),
            ..Self::default()
        };

        let dicts = get("JIEBA_DICT_PATHS")
            .map(|s| JiebaSegmenter::split_paths(&s))
            .unwrap_or_default();
        if flag(&get, "JIEBA_ENABLED") || !dicts.is_empty() {
            cfg.segmenter = Some(Arc::new(JiebaSegmenter::new(dicts.as_slice())));
        }
        Ok(cfg)
    }

    /// Fills every unset knob with its default. Idempotent.
    pub fn resolve(mut self) -> Self {
        if self.model.trim().is_empty() {
            self.model = LlmModel::default().as_str().to_string();
        }
        if self.top_k == 0 {
            self.top_k = DEFAULT_TOP_K;
        }
        if self.max_tokens == 0 {
            self.max_tokens = DEFAULT_MAX_TOKENS;
        }
        if self.prompt_tmpl.is_empty() {
            self.prompt_tmpl = DEFAULT_PROMPT_TMPL.to_string();
        }
        if self.multi_turn_prompt_tmpl.is_empty() {
            self.multi_turn_prompt_tmpl = DEFAULT_MULTI_TURN_PROMPT_TMPL.to_string();
        }
        if self.query_prefix.is_empty() {
            self.query_prefix = DEFAULT_QUERY_PREFIX.to_string();
        }
        self
    }

    /// Checks collaborators and the sentinel prefix. Call after [`resolve`](Self::resolve).
    pub fn validate(&self) -> Result<(), BotConfigError> {
        if self.encoder.is_none() {
            return Err(BotConfigError::MissingCollaborator("encoder"));
        }
        if self.querier.is_none() {
            return Err(BotConfigError::MissingCollaborator("querier"));
        }
        let p = &self.query_prefix;
        if p.is_empty() || p.trim() != p {
            return Err(BotConfigError::InvalidPrefix(p.clone()));
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, BotConfigError> {
    match get(var) {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Ok(None),
        Some(v) => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| BotConfigError::InvalidNumber { var, value: v }),
    }
}

fn flag(get: &impl Fn(&str) -> Option<String>, var: &str) -> bool {
    get(var).is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
}

fn read_file(path: Option<String>) -> Result<String, BotConfigError> {
    match path.filter(|p| !p.trim().is_empty()) {
        None => Ok(String::new()),
        Some(p) => {
            let path = PathBuf::from(p);
            std::fs::read_to_string(&path).map_err(|source| BotConfigError::TemplateFile { path, source })
        }
    }
}
