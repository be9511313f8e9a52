//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! All Qdrant interactions sit behind this minimal API, hiding the
//! builder pattern and keeping the rest of the crate decoupled from
//! `qdrant-client`.

use crate::config::RagConfig;
use crate::errors::RagError;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{SearchParamsBuilder, SearchPointsBuilder, Value as QValue};
use tracing::{debug, trace};

/// A facade over the Qdrant client.
pub struct QdrantFacade {
    client: Qdrant,
    collection: String,
}

impl QdrantFacade {
    /// Creates a new facade from the given configuration.
    ///
    /// Supports optional API key authentication. No request is sent here.
    pub fn new(cfg: &RagConfig) -> Result<Self, RagError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
        })
    }

    /// Performs a similarity search.
    ///
    /// Returns `(score, payload)` tuples in the order Qdrant ranked them.
    pub async fn search(
        &self,
        vector: Vec<f32>,
        top_k: u64,
        exact: bool,
    ) -> Result<Vec<(f32, serde_json::Value)>, RagError> {
        trace!(
            "Searching in '{}' with top_k={}, exact={}",
            self.collection, top_k, exact
        );

        let mut builder =
            SearchPointsBuilder::new(&self.collection, vector, top_k).with_payload(true);
        if exact {
            builder = builder.params(SearchParamsBuilder::default().exact(true));
        }

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        let out: Vec<_> = res
            .result
            .into_iter()
            .map(|r| (r.score, qpayload_to_json(r.payload)))
            .collect();

        debug!("Search completed: {} hits returned", out.len());
        Ok(out)
    }
}

/// Converts a Qdrant payload (`HashMap<String, qdrant::Value>`) into JSON.
///
/// Unsupported nested objects/arrays are mapped to `Null`.
fn qpayload_to_json(p: std::collections::HashMap<String, QValue>) -> serde_json::Value {
    use qdrant_client::qdrant::value::Kind as K;
    let m = p
        .into_iter()
        .map(|(k, v)| {
            let j = match v.kind {
                Some(K::StringValue(s)) => serde_json::Value::String(s),
                Some(K::IntegerValue(i)) => serde_json::Value::Number(i.into()),
                Some(K::DoubleValue(f)) => serde_json::json!(f),
                Some(K::BoolValue(b)) => serde_json::Value::Bool(b),
                _ => serde_json::Value::Null,
            };
            (k, j)
        })
        .collect();
    serde_json::Value::Object(m)
}
