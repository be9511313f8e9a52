//! Retrieval collaborators for the QA bot.
//!
//! This crate provides the two capabilities the chat pipeline consumes:
//! - [`Encoder`]: text → embedding ([`OpenAiEncoder`])
//! - [`Querier`]: embedding → nearest passages ([`QdrantQuerier`], [`LocalVectorStore`])
//!
//! Populating the index is out of scope; collections are expected to exist.

mod config;
mod embed;
mod errors;
mod local_store;
mod qdrant_facade;
mod querier;
mod retrieve;

pub use config::RagConfig;
pub use embed::openai::{OpenAiEncoder, OpenAiEncoderConfig};
pub use embed::{Embedding, Encoder};
pub use errors::RagError;
pub use local_store::{Document, LocalVectorStore};
pub use querier::{Querier, Similarity};
pub use retrieve::QdrantQuerier;
