//! OpenAI embedding encoder.
//!
//! Delegates to the shared [`OpenAiService`] so the encoder and the
//! completion dispatcher reuse one HTTP client.

use std::sync::Arc;

use ai_llm_service::{BoxFuture, OpenAiService};
use tracing::debug;

use crate::embed::{Embedding, Encoder};
use crate::errors::RagError;

/// Configuration for the OpenAI embedding backend.
#[derive(Clone, Debug)]
pub struct OpenAiEncoderConfig {
    /// Embedding model, e.g. `text-embedding-ada-002`.
    pub model: String,
    /// Expected embedding dimension; `None` skips the check.
    pub dim: Option<usize>,
}

impl OpenAiEncoderConfig {
    pub const DEFAULT_MODEL: &'static str = "text-embedding-ada-002";

    /// Reads `EMBEDDING_MODEL` and `EMBEDDING_DIM`.
    ///
    /// # Errors
    /// [`RagError::Config`] if `EMBEDDING_DIM` is set but not a number.
    pub fn from_env() -> Result<Self, RagError> {
        let model = std::env::var("EMBEDDING_MODEL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_MODEL.to_string());
        let dim = match std::env::var("EMBEDDING_DIM") {
            Ok(v) if !v.trim().is_empty() => Some(
                v.trim()
                    .parse::<usize>()
                    .map_err(|_| RagError::Config(format!("EMBEDDING_DIM is not a number: {v}")))?,
            ),
            _ => None,
        };
        Ok(Self { model, dim })
    }
}

impl Default for OpenAiEncoderConfig {
    fn default() -> Self {
        Self {
            model: Self::DEFAULT_MODEL.to_string(),
            dim: None,
        }
    }
}

/// OpenAI embedding encoder (async).
#[derive(Clone)]
pub struct OpenAiEncoder {
    svc: Arc<OpenAiService>,
    cfg: OpenAiEncoderConfig,
}

impl OpenAiEncoder {
    pub fn new(svc: Arc<OpenAiService>, cfg: OpenAiEncoderConfig) -> Self {
        Self { svc, cfg }
    }

    fn check_dim(&self, v: &[f32]) -> Result<(), RagError> {
        match self.cfg.dim {
            Some(want) if v.len() != want => Err(RagError::VectorSizeMismatch {
                got: v.len(),
                want,
            }),
            _ => Ok(()),
        }
    }
}

impl Encoder for OpenAiEncoder {
    fn encode<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Embedding, RagError>> {
        Box::pin(async move {
            debug!(model = %self.cfg.model, input_len = text.len(), "encode");
            let v = self.svc.embeddings(&self.cfg.model, text).await?;
            self.check_dim(&v)?;
            Ok(v)
        })
    }

    fn encode_batch<'a>(
        &'a self,
        texts: &'a [String],
    ) -> BoxFuture<'a, Result<Vec<Embedding>, RagError>> {
        Box::pin(async move {
            debug!(model = %self.cfg.model, inputs = texts.len(), "encode_batch");
            let out = self.svc.embeddings_batch(&self.cfg.model, texts).await?;
            for v in &out {
                self.check_dim(v)?;
            }
            Ok(out)
        })
    }
}
