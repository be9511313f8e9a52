//! In-crate fakes for the collaborator traits.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use std::sync::atomic::{AtomicUsize, Ordering};

use ai_llm_service::services::payloads::{
    ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, TextChoice,
    TextCompletionRequest, TextCompletionResponse,
};
use ai_llm_service::{AiLlmError, BoxFuture, CompletionTransport};
use rag_store::{Embedding, Encoder, Querier, RagError, Similarity};

use crate::segment::Segmenter;

/// Records every text it encodes; fails when `fail` is set.
#[derive(Default)]
pub struct FakeEncoder {
    pub seen: Mutex<Vec<String>>,
    pub fail: bool,
}

impl FakeEncoder {
    pub fn calls(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl Encoder for FakeEncoder {
    fn encode<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Embedding, RagError>> {
        Box::pin(async move {
            self.seen.lock().unwrap().push(text.to_string());
            if self.fail {
                return Err(RagError::Provider(AiLlmError::Timeout(Duration::from_secs(5))));
            }
            Ok(vec![text.len() as f32, 1.0])
        })
    }

    fn encode_batch<'a>(
        &'a self,
        texts: &'a [String],
    ) -> BoxFuture<'a, Result<Vec<Embedding>, RagError>> {
        Box::pin(async move {
            let mut out = Vec::with_capacity(texts.len());
            for t in texts {
                out.push(self.encode(t).await?);
            }
            Ok(out)
        })
    }
}

/// Returns fixed passages, truncated to `top_k`, and counts calls.
#[derive(Default)]
pub struct FakeQuerier {
    pub texts: Vec<String>,
    pub calls: AtomicUsize,
    pub last_top_k: AtomicUsize,
    pub fail: bool,
}

impl FakeQuerier {
    pub fn with_texts(texts: &[&str]) -> Self {
        Self {
            texts: texts.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Querier for FakeQuerier {
    fn query<'a>(
        &'a self,
        _embedding: &'a [f32],
        top_k: usize,
    ) -> BoxFuture<'a, Result<Vec<Similarity>, RagError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.last_top_k.store(top_k, Ordering::SeqCst);
            if self.fail {
                return Err(RagError::Qdrant("querier down".into()));
            }
            Ok(self
                .texts
                .iter()
                .take(top_k)
                .enumerate()
                .map(|(i, t)| Similarity {
                    text: t.clone(),
                    score: 1.0 - i as f32 * 0.1,
                })
                .collect())
        })
    }
}

/// Replays scripted completions in order and records every prompt.
///
/// An exhausted script answers with an empty choice list.
#[derive(Default)]
pub struct FakeTransport {
    pub replies: Mutex<VecDeque<String>>,
    pub prompts: Mutex<Vec<String>>,
    pub max_tokens: Mutex<Vec<Option<u32>>>,
    pub fail: bool,
}

impl FakeTransport {
    pub fn scripted(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|s| s.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn next(&self, prompt: String, max_tokens: Option<u32>) -> Result<Option<String>, AiLlmError> {
        self.prompts.lock().unwrap().push(prompt);
        self.max_tokens.lock().unwrap().push(max_tokens);
        if self.fail {
            return Err(AiLlmError::Timeout(std::time::Duration::from_secs(1)));
        }
        Ok(self.replies.lock().unwrap().pop_front())
    }
}

impl CompletionTransport for FakeTransport {
    fn chat_completion<'a>(
        &'a self,
        req: ChatCompletionRequest,
    ) -> BoxFuture<'a, Result<ChatCompletionResponse, AiLlmError>> {
        Box::pin(async move {
            let prompt = req
                .messages
                .into_iter()
                .next()
                .and_then(|m| m.content)
                .unwrap_or_default();
            let choices = self
                .next(prompt, req.max_tokens)?
                .map(|content| ChatChoice {
                    index: 0,
                    message: ChatMessage {
                        role: "assistant".into(),
                        content: Some(content),
                    },
                    finish_reason: Some("stop".into()),
                })
                .into_iter()
                .collect();
            Ok(ChatCompletionResponse {
                choices,
                usage: None,
            })
        })
    }

    fn text_completion<'a>(
        &'a self,
        req: TextCompletionRequest,
    ) -> BoxFuture<'a, Result<TextCompletionResponse, AiLlmError>> {
        Box::pin(async move {
            let prompt = req.prompt.into_iter().next().unwrap_or_default();
            let choices = self
                .next(prompt, req.max_tokens)?
                .map(|text| TextChoice {
                    index: 0,
                    text,
                    finish_reason: Some("stop".into()),
                })
                .into_iter()
                .collect();
            Ok(TextCompletionResponse {
                choices,
                usage: None,
            })
        })
    }
}

/// Uppercases, so tests can tell segmented from original text.
pub struct UpperSegmenter;

impl Segmenter for UpperSegmenter {
    fn segment(&self, text: &str) -> String {
        text.to_uppercase()
    }
}
