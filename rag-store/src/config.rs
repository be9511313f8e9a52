//! Runtime configuration of the Qdrant-backed querier.

use crate::errors::RagError;

/// Configuration for Qdrant retrieval.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Qdrant gRPC endpoint, e.g. `http://localhost:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
    /// Payload field holding the passage text.
    pub text_field: String,
    /// Exact search flag (false = HNSW ANN).
    pub exact_search: bool,
}

impl RagConfig {
    /// Creates a sane default config for a given collection name and Qdrant endpoint.
    pub fn new_default(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            qdrant_url: url.into(),
            qdrant_api_key: None,
            collection: collection.into(),
            text_field: "text".to_string(),
            exact_search: false,
        }
    }

    /// Builds from environment variables with defaults.
    ///
    /// - `QDRANT_URL` (default `http://127.0.0.1:6334`)
    /// - `QDRANT_API_KEY` (optional)
    /// - `QDRANT_COLLECTION` (default `qabot`)
    /// - `QDRANT_TEXT_FIELD` (default `text`)
    /// - `RAG_EXACT_SEARCH` (default `false`)
    pub fn from_env() -> Result<Self, RagError> {
        let cfg = Self {
            qdrant_url: env("QDRANT_URL", "http://127.0.0.1:6334"),
            qdrant_api_key: std::env::var("QDRANT_API_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            collection: env("QDRANT_COLLECTION", "qabot"),
            text_field: env("QDRANT_TEXT_FIELD", "text"),
            exact_search: env("RAG_EXACT_SEARCH", "false") == "true",
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(RagError::Config("qdrant_url is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(RagError::Config("collection is empty".into()));
        }
        if self.text_field.trim().is_empty() {
            return Err(RagError::Config("text_field is empty".into()));
        }
        Ok(())
    }
}

fn env(k: &str, dflt: &str) -> String {
    std::env::var(k)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| dflt.to_string())
}
