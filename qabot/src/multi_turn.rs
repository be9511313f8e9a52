//! Front agent for conversations: replies directly or hands a rewritten,
//! self-contained question to the single-turn pipeline.

use std::sync::Arc;

use ai_llm_service::{Completer, LlmDispatcher};
use tracing::debug;

use crate::error::BotError;
use crate::prompt::{MultiTurnPromptData, Turn};
use crate::single_turn::SingleTurn;
use crate::template::{PromptTemplate, TemplateError};

pub(crate) struct MultiTurn {
    pub llm: Arc<LlmDispatcher>,
    pub template: PromptTemplate,
    pub prefix: String,
    pub max_tokens: u32,
}

impl MultiTurn {
    pub async fn answer(
        &self,
        question: &str,
        history: &[Turn],
        single: &SingleTurn,
    ) -> Result<String, BotError> {
        let data = MultiTurnPromptData::new(history, question, &self.prefix);
        let prompt = self.template.render(&data).map_err(TemplateError::from)?;
        debug!(turns = history.len(), prompt_len = prompt.len(), "multi-turn prompt rendered");

        let reply = self.llm.complete(&prompt, self.max_tokens).await?;

        if let Some(refined) = self.refined_question(&reply) {
            debug!(refined = %refined, "front agent delegated to retrieval");
            return single.answer(refined).await;
        }

        debug!("front agent replied directly");
        Ok(reply)
    }

    /// The question after the sentinel, if `reply` starts with it exactly.
    fn refined_question<'r>(&self, reply: &'r str) -> Option<&'r str> {
        reply.strip_prefix(self.prefix.as_str()).map(str::trim_start)
    }
}
