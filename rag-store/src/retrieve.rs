//! Qdrant-backed [`Querier`].

use ai_llm_service::BoxFuture;
use tracing::{trace, warn};

use crate::config::RagConfig;
use crate::errors::RagError;
use crate::qdrant_facade::QdrantFacade;
use crate::querier::{Querier, Similarity};

/// Nearest-neighbour search over one Qdrant collection.
///
/// The passage text is read from `RagConfig::text_field`; points without it
/// are skipped.
pub struct QdrantQuerier {
    client: QdrantFacade,
    text_field: String,
    exact: bool,
}

impl QdrantQuerier {
    /// # Errors
    /// Returns `RagError::Config`/`RagError::Qdrant` if the client cannot be built.
    pub fn new(cfg: &RagConfig) -> Result<Self, RagError> {
        trace!("QdrantQuerier::new collection={}", cfg.collection);
        Ok(Self {
            client: QdrantFacade::new(cfg)?,
            text_field: cfg.text_field.clone(),
            exact: cfg.exact_search,
        })
    }
}

impl Querier for QdrantQuerier {
    fn query<'a>(
        &'a self,
        embedding: &'a [f32],
        top_k: usize,
    ) -> BoxFuture<'a, Result<Vec<Similarity>, RagError>> {
        Box::pin(async move {
            let hits = self
                .client
                .search(embedding.to_vec(), top_k as u64, self.exact)
                .await?;
            Ok(hits_to_similarities(hits, &self.text_field))
        })
    }
}

fn hits_to_similarities(hits: Vec<(f32, serde_json::Value)>, field: &str) -> Vec<Similarity> {
    hits.into_iter()
        .filter_map(|(score, payload)| match payload.get(field).and_then(|v| v.as_str()) {
            Some(text) => Some(Similarity {
                text: text.to_string(),
                score,
            }),
            None => {
                warn!(field, "qdrant point without text payload skipped");
                None
            }
        })
        .collect()
}
