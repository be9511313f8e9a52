//! Similarity-search capability consumed by the QA pipeline.

use ai_llm_service::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::errors::RagError;

/// A retrieved passage and its relevance score.
///
/// Higher scores are closer; the scale depends on the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Similarity {
    pub text: String,
    pub score: f32,
}

/// Finds the passages nearest to a query vector.
///
/// Implementations return at most `top_k` items ordered by decreasing
/// relevance; tie ordering is backend-defined and passed through untouched.
pub trait Querier: Send + Sync {
    fn query<'a>(
        &'a self,
        embedding: &'a [f32],
        top_k: usize,
    ) -> BoxFuture<'a, Result<Vec<Similarity>, RagError>>;
}
