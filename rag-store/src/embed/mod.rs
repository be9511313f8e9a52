use crate::errors::RagError;
use ai_llm_service::BoxFuture;

/// Dense vector produced by an [`Encoder`].
pub type Embedding = Vec<f32>;

/// Turns text into fixed-size vectors for similarity search.
///
/// Async is required because most real providers perform HTTP requests.
/// Implement this trait to plug in your own embedding backend.
pub trait Encoder: Send + Sync {
    /// Encodes a single text.
    fn encode<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Embedding, RagError>>;

    /// Encodes many texts, one vector per input in input order.
    fn encode_batch<'a>(
        &'a self,
        texts: &'a [String],
    ) -> BoxFuture<'a, Result<Vec<Embedding>, RagError>>;
}

pub mod openai;
