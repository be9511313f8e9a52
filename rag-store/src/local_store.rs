//! In-memory vector store for development and tests.
//!
//! Documents carry precomputed embeddings; queries rank them by cosine
//! similarity. Nothing is persisted.

use std::path::Path;
use std::sync::RwLock;

use ai_llm_service::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::embed::Embedding;
use crate::errors::RagError;
use crate::querier::{Querier, Similarity};

/// A passage with its precomputed embedding.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub id: String,
    pub text: String,
    pub embedding: Embedding,
}

/// Cosine-similarity store held entirely in memory.
///
/// All documents must share one dimension, fixed by the first insert.
#[derive(Default)]
pub struct LocalVectorStore {
    docs: RwLock<Vec<Document>>,
}

impl LocalVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends documents.
    ///
    /// # Errors
    /// [`RagError::VectorSizeMismatch`] if any embedding differs in length
    /// from the ones already stored (nothing is inserted in that case).
    pub fn insert(&self, docs: Vec<Document>) -> Result<usize, RagError> {
        let mut guard = self
            .docs
            .write()
            .map_err(|_| RagError::Store("local store lock poisoned".into()))?;

        let want = guard
            .first()
            .or_else(|| docs.first())
            .map(|d| d.embedding.len());
        if let Some(want) = want {
            if let Some(bad) = docs.iter().find(|d| d.embedding.len() != want) {
                return Err(RagError::VectorSizeMismatch {
                    got: bad.embedding.len(),
                    want,
                });
            }
        }

        let n = docs.len();
        guard.extend(docs);
        debug!(inserted = n, total = guard.len(), "local store insert");
        Ok(n)
    }

    /// Loads a JSON array of [`Document`]s from `path`.
    ///
    /// # Errors
    /// I/O, JSON, or dimension mismatch errors.
    pub fn load_json(&self, path: impl AsRef<Path>) -> Result<usize, RagError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let docs: Vec<Document> = serde_json::from_str(&raw)?;
        let n = self.insert(docs)?;
        info!(path = %path.as_ref().display(), documents = n, "local store loaded");
        Ok(n)
    }

    pub fn len(&self) -> usize {
        self.docs.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn search(&self, q: &[f32], top_k: usize) -> Result<Vec<Similarity>, RagError> {
        let guard = self
            .docs
            .read()
            .map_err(|_| RagError::Store("local store lock poisoned".into()))?;

        if let Some(d) = guard.first() {
            if d.embedding.len() != q.len() {
                return Err(RagError::VectorSizeMismatch {
                    got: q.len(),
                    want: d.embedding.len(),
                });
            }
        }

        let mut scored: Vec<(usize, f32)> = guard
            .iter()
            .enumerate()
            .map(|(i, d)| (i, cosine(q, &d.embedding)))
            .collect();
        // Stable sort: equal scores keep insertion order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| Similarity {
                text: guard[i].text.clone(),
                score,
            })
            .collect())
    }
}

impl Querier for LocalVectorStore {
    fn query<'a>(
        &'a self,
        embedding: &'a [f32],
        top_k: usize,
    ) -> BoxFuture<'a, Result<Vec<Similarity>, RagError>> {
        Box::pin(async move { self.search(embedding, top_k) })
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut na, mut nb) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na.sqrt() * nb.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str, embedding: Vec<f32>) -> Document {
        Document {
            id: String::new(),
            text: text.into(),
            embedding,
        }
    }

    fn store() -> LocalVectorStore {
        let s = LocalVectorStore::new();
        s.insert(vec![
            doc("east", vec![1.0, 0.0]),
            doc("north", vec![0.0, 1.0]),
            doc("north-east", vec![1.0, 1.0]),
            doc("also east", vec![2.0, 0.0]),
        ])
        .unwrap();
        s
    }

    #[tokio::test]
    async fn ranks_by_cosine_and_truncates() {
        let s = store();
        let out = s.query(&[1.0, 0.1], 3).await.unwrap();
        let texts: Vec<_> = out.iter().map(|s| s.text.as_str()).collect();
        // "east" and "also east" tie; insertion order wins.
        assert_eq!(texts, ["east", "also east", "north-east"]);
        assert!(out[0].score >= out[2].score);
    }

    #[tokio::test]
    async fn empty_store_returns_nothing() {
        let s = LocalVectorStore::new();
        assert!(s.is_empty());
        assert!(s.query(&[1.0], 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn query_dimension_must_match() {
        let err = store().query(&[1.0, 0.0, 0.0], 1).await.unwrap_err();
        assert!(matches!(err, RagError::VectorSizeMismatch { got: 3, want: 2 }));
    }

    #[test]
    fn insert_rejects_mixed_dimensions() {
        let s = store();
        let err = s.insert(vec![doc("bad", vec![1.0])]).unwrap_err();
        assert!(matches!(err, RagError::VectorSizeMismatch { got: 1, want: 2 }));
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn load_json_reads_documents() {
        let path = std::env::temp_dir().join(format!("qabot-local-store-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"[{"id":"1","text":"Doc A says X.","embedding":[0.1,0.2]},
                {"text":"Doc B says Y.","embedding":[0.2,0.1]}]"#,
        )
        .unwrap();
        let s = LocalVectorStore::new();
        let n = s.load_json(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(n, 2);
        assert_eq!(s.len(), 2);
    }

    #[tokio::test]
    async fn poisoned_lock_is_a_store_error() {
        let s = std::sync::Arc::new(store());
        let held = s.clone();
        let _ = std::thread::spawn(move || {
            let _guard = held.docs.write().unwrap();
            panic!("poison");
        })
        .join();

        assert!(matches!(s.query(&[1.0, 0.0], 1).await, Err(RagError::Store(_))));
        assert!(matches!(s.insert(vec![doc("x", vec![1.0, 0.0])]), Err(RagError::Store(_))));
    }
}
