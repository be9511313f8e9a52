//! Typed errors for the qabot crate.

use std::path::PathBuf;

use ai_llm_service::AiLlmError;
use rag_store::RagError;
use thiserror::Error;

use crate::template::{ParseError, TemplateError};

#[derive(Debug, Error)]
pub enum BotError {
    /// Invalid construction input. Never retried.
    #[error("bot config error: {0}")]
    Config(#[from] BotConfigError),

    /// Template parse (at construction) or execution (per call) failure.
    #[error("{0}")]
    Template(#[from] TemplateError),

    /// Encoder or querier failure.
    #[error("retrieval error: {0}")]
    Retrieval(#[from] RagError),

    /// Completion failure, including an unknown model at construction.
    #[error("llm error: {0}")]
    Llm(#[from] AiLlmError),
}

impl From<ParseError> for BotError {
    fn from(e: ParseError) -> Self {
        BotError::Template(e.into())
    }
}

impl BotError {
    /// True for failures caused by configuration rather than a request.
    pub fn is_config(&self) -> bool {
        match self {
            BotError::Config(_) => true,
            BotError::Template(TemplateError::Parse(_)) => true,
            BotError::Template(TemplateError::Exec(_)) => false,
            BotError::Retrieval(_) => false,
            BotError::Llm(e) => e.is_config(),
        }
    }
}

#[derive(Debug, Error)]
pub enum BotConfigError {
    #[error("{0} is required")]
    MissingCollaborator(&'static str),

    #[error("query prefix {0:?} must be non-empty without surrounding whitespace")]
    InvalidPrefix(String),

    #[error("multi-turn template must reference .Prefix")]
    PrefixNotInTemplate,

    #[error("{var}={value:?} is not a valid number")]
    InvalidNumber { var: &'static str, value: String },

    #[error("cannot read template file {path}: {source}")]
    TemplateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
