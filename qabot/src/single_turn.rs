//! Single-turn pipeline: segment → encode → query → render → complete.

use std::sync::Arc;

use ai_llm_service::{Completer, LlmDispatcher};
use rag_store::{Encoder, Querier};
use tracing::debug;

use crate::error::BotError;
use crate::prompt::PromptData;
use crate::segment::Segmenter;
use crate::template::{PromptTemplate, TemplateError};

pub(crate) struct SingleTurn {
    pub encoder: Arc<dyn Encoder>,
    pub querier: Arc<dyn Querier>,
    pub segmenter: Arc<dyn Segmenter>,
    pub llm: Arc<LlmDispatcher>,
    pub template: PromptTemplate,
    pub top_k: usize,
    pub max_tokens: u32,
}

impl SingleTurn {
    /// Answers `question` from retrieved context.
    ///
    /// The segmented question is only used for encoding; the prompt carries
    /// the question as given.
    pub async fn answer(&self, question: &str) -> Result<String, BotError> {
        let segmented = self.segmenter.segment(question);
        let embedding = self.encoder.encode(&segmented).await?;

        let sections: Vec<String> = self
            .querier
            .query(&embedding, self.top_k)
            .await?
            .into_iter()
            .map(|s| s.text)
            .collect();
        debug!(top_k = self.top_k, sections = sections.len(), "context retrieved");

        let prompt = self
            .template
            .render(&PromptData { question, sections })
            .map_err(TemplateError::from)?;
        debug!(prompt_len = prompt.len(), "single-turn prompt rendered");

        Ok(self.llm.complete(&prompt, self.max_tokens).await?)
    }
}
