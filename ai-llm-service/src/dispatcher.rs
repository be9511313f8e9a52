//! Model dispatcher: one `complete(prompt, max_tokens)` capability over two wire protocols.
//!
//! The protocol (chat vs legacy completion) is picked once, in
//! [`LlmDispatcher::new`], from the model identifier. Requests never
//! re-branch on the model family.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::config::llm_model_config::LlmModelConfig;
//! use ai_llm_service::dispatcher::{Completer, LlmDispatcher};
//! use ai_llm_service::services::open_ai_service::OpenAiService;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(OpenAiService::new(LlmModelConfig::openai("sk-..."))?);
//! let llm = LlmDispatcher::new("gpt-3.5-turbo", transport, false)?;
//! let answer = llm.complete("Say hi", 16).await?;
//! println!("{answer}");
//! # Ok(()) }
//! ```

use std::{future::Future, pin::Pin, sync::Arc};

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    config::llm_model::{LlmModel, ModelFamily},
    error_handler::{AiLlmError, Provider, ProviderError, ProviderErrorKind},
    services::payloads::{
        ChatCompletionRequest, ChatCompletionResponse, ChatMessage, TextCompletionRequest,
        TextCompletionResponse,
    },
};

/// Boxed `Send` future used by the object-safe traits of this crate.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Raw wire access to a completion API.
///
/// Implemented by [`OpenAiService`] over HTTP; tests substitute fakes.
/// Implementations return the decoded payload untouched.
///
/// [`OpenAiService`]: crate::services::open_ai_service::OpenAiService
pub trait CompletionTransport: Send + Sync {
    fn chat_completion<'a>(
        &'a self,
        req: ChatCompletionRequest,
    ) -> BoxFuture<'a, Result<ChatCompletionResponse, AiLlmError>>;

    fn text_completion<'a>(
        &'a self,
        req: TextCompletionRequest,
    ) -> BoxFuture<'a, Result<TextCompletionResponse, AiLlmError>>;
}

/// The `Complete(prompt, maxTokens) -> text` capability.
pub trait Completer: Send + Sync {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
        max_tokens: u32,
    ) -> BoxFuture<'a, Result<String, AiLlmError>>;
}

/// Routes completions to the protocol matching the configured model.
pub struct LlmDispatcher {
    model: LlmModel,
    protocol: Box<dyn Completer>,
}

impl LlmDispatcher {
    /// Resolves `model` to its family and binds the matching protocol.
    ///
    /// No request is sent here.
    ///
    /// # Errors
    /// [`AiLlmError::Config`] with `UnsupportedModel`/`EmptyModel` when the
    /// identifier is not in a known family.
    pub fn new(
        model: &str,
        transport: Arc<dyn CompletionTransport>,
        debug: bool,
    ) -> Result<Self, AiLlmError> {
        let model: LlmModel = model.parse()?;
        let protocol: Box<dyn Completer> = match model.family() {
            ModelFamily::Chat => Box::new(ChatProtocol {
                model,
                transport,
                debug,
            }),
            ModelFamily::Completion => Box::new(LegacyProtocol {
                model,
                transport,
                debug,
            }),
        };

        let debug_flag = debug;
        info!(model = %model, family = ?model.family(), debug = debug_flag, "LlmDispatcher initialized");
        Ok(Self { model, protocol })
    }

    pub fn model(&self) -> LlmModel {
        self.model
    }

    pub fn family(&self) -> ModelFamily {
        self.model.family()
    }
}

impl Completer for LlmDispatcher {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
        max_tokens: u32,
    ) -> BoxFuture<'a, Result<String, AiLlmError>> {
        self.protocol.complete(prompt, max_tokens)
    }
}

/// `/v1/chat/completions`: the prompt travels as one `user` message.
struct ChatProtocol {
    model: LlmModel,
    transport: Arc<dyn CompletionTransport>,
    debug: bool,
}

impl Completer for ChatProtocol {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
        max_tokens: u32,
    ) -> BoxFuture<'a, Result<String, AiLlmError>> {
        Box::pin(async move {
            let req = ChatCompletionRequest {
                model: self.model.as_str().to_string(),
                messages: vec![ChatMessage::user(prompt)],
                max_tokens: Some(max_tokens),
            };
            debug!(model = %self.model, prompt_len = prompt.len(), "chat completion");

            let res = self.transport.chat_completion(req).await;
            log_exchange(self.debug, prompt, &res);

            let first = res?
                .choices
                .into_iter()
                .next()
                .ok_or_else(empty_choices)?;
            Ok(first.message.content.unwrap_or_default())
        })
    }
}

/// `/v1/completions`: the prompt travels as a single-element prompt list.
struct LegacyProtocol {
    model: LlmModel,
    transport: Arc<dyn CompletionTransport>,
    debug: bool,
}

impl Completer for LegacyProtocol {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
        max_tokens: u32,
    ) -> BoxFuture<'a, Result<String, AiLlmError>> {
        Box::pin(async move {
            let req = TextCompletionRequest {
                model: self.model.as_str().to_string(),
                prompt: vec![prompt.to_string()],
                max_tokens: Some(max_tokens),
            };
            debug!(model = %self.model, prompt_len = prompt.len(), "text completion");

            let res = self.transport.text_completion(req).await;
            log_exchange(self.debug, prompt, &res);

            let first = res?
                .choices
                .into_iter()
                .next()
                .ok_or_else(empty_choices)?;
            Ok(first.text)
        })
    }
}

fn empty_choices() -> AiLlmError {
    ProviderError::new(Provider::OpenAI, ProviderErrorKind::EmptyChoices).into()
}

/// Debug-mode dump of one exchange. Runs for successes and failures alike and
/// cannot fail itself.
fn log_exchange<T: Serialize>(enabled: bool, prompt: &str, res: &Result<T, AiLlmError>) {
    if !enabled {
        return;
    }
    match res {
        Ok(resp) => {
            let raw = serde_json::to_string(resp).unwrap_or_else(|e| format!("<unserializable: {e}>"));
            info!(target: "ai_llm_service::dispatcher", req = %prompt, resp = %raw, "llm exchange");
        }
        Err(err) => {
            info!(target: "ai_llm_service::dispatcher", req = %prompt, resp = "null", error = %err, "llm exchange failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::fmt;
    use std::sync::Mutex;

    use tracing::field::{Field, Visit};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::registry;

    use super::*;
    use crate::services::payloads::{ChatChoice, TextChoice};

    /// Records which wire shape was used and replays canned responses.
    #[derive(Default)]
    struct FakeTransport {
        chat_calls: Mutex<Vec<ChatCompletionRequest>>,
        text_calls: Mutex<Vec<TextCompletionRequest>>,
        empty: bool,
        fail: bool,
    }

    impl CompletionTransport for FakeTransport {
        fn chat_completion<'a>(
            &'a self,
            req: ChatCompletionRequest,
        ) -> BoxFuture<'a, Result<ChatCompletionResponse, AiLlmError>> {
            Box::pin(async move {
                self.chat_calls.lock().unwrap().push(req);
                if self.fail {
                    return Err(AiLlmError::Timeout(std::time::Duration::from_secs(1)));
                }
                let choices = if self.empty {
                    vec![]
                } else {
                    vec![
                        ChatChoice {
                            index: 0,
                            message: ChatMessage {
                                role: "assistant".into(),
                                content: Some("chat answer".into()),
                            },
                            finish_reason: None,
                        },
                        ChatChoice {
                            index: 1,
                            message: ChatMessage {
                                role: "assistant".into(),
                                content: Some("second".into()),
                            },
                            finish_reason: None,
                        },
                    ]
                };
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
                self.text_calls.lock().unwrap().push(req);
                if self.fail {
                    return Err(AiLlmError::Timeout(std::time::Duration::from_secs(1)));
                }
                let choices = if self.empty {
                    vec![]
                } else {
                    vec![TextChoice {
                        index: 0,
                        text: " legacy answer".into(),
                        finish_reason: Some("stop".into()),
                    }]
                };
                Ok(TextCompletionResponse {
                    choices,
                    usage: None,
                })
            })
        }
    }

    #[tokio::test]
    async fn chat_family_uses_chat_wire_only() {
        for id in ["gpt-4", "gpt-3.5-turbo"] {
            let t = Arc::new(FakeTransport::default());
            let llm = LlmDispatcher::new(id, t.clone(), false).unwrap();
            assert_eq!(llm.family(), ModelFamily::Chat);

            let out = llm.complete("prompt text", 42).await.unwrap();
            assert_eq!(out, "chat answer");

            let chats = t.chat_calls.lock().unwrap();
            assert_eq!(chats.len(), 1);
            assert_eq!(chats[0].model, id);
            assert_eq!(chats[0].max_tokens, Some(42));
            assert_eq!(chats[0].messages, vec![ChatMessage::user("prompt text")]);
            assert!(t.text_calls.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn legacy_family_uses_completion_wire_only() {
        for id in [
            "text-davinci-003",
            "text-davinci-002",
            "text-curie-001",
            "text-babbage-001",
            "text-ada-001",
        ] {
            let t = Arc::new(FakeTransport::default());
            let llm = LlmDispatcher::new(id, t.clone(), true).unwrap();
            assert_eq!(llm.family(), ModelFamily::Completion);

            let out = llm.complete("prompt text", 7).await.unwrap();
            assert_eq!(out, " legacy answer");

            let texts = t.text_calls.lock().unwrap();
            assert_eq!(texts.len(), 1);
            assert_eq!(texts[0].prompt, vec!["prompt text".to_string()]);
            assert_eq!(texts[0].max_tokens, Some(7));
            assert!(t.chat_calls.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn unknown_model_fails_before_any_call() {
        let t = Arc::new(FakeTransport::default());
        let err = LlmDispatcher::new("not-a-real-model", t.clone(), false)
            .err()
            .unwrap();
        assert!(err.is_config());
        assert!(t.chat_calls.lock().unwrap().is_empty());
        assert!(t.text_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_choices_is_an_error_for_both_shapes() {
        for id in ["gpt-4", "text-davinci-003"] {
            let t = Arc::new(FakeTransport {
                empty: true,
                ..Default::default()
            });
            let llm = LlmDispatcher::new(id, t, true).unwrap();
            let err = llm.complete("p", 1).await.unwrap_err();
            assert!(matches!(
                err,
                AiLlmError::Provider(ProviderError {
                    kind: ProviderErrorKind::EmptyChoices,
                    ..
                })
            ));
        }
    }

    /// Collects the fields of every event as strings, keyed by field name.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<BTreeMap<String, String>>>>);

    struct FieldMap(BTreeMap<String, String>);

    impl Visit for FieldMap {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.insert(field.name().to_string(), value.to_string());
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.insert(field.name().to_string(), format!("{value:?}"));
        }
    }

    impl<S: Subscriber> Layer<S> for Captured {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = FieldMap(BTreeMap::new());
            event.record(&mut fields);
            self.0.lock().unwrap().push(fields.0);
        }
    }

    impl Captured {
        fn exchanges(&self) -> Vec<BTreeMap<String, String>> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .filter(|f| f.get("message").is_some_and(|m| m.starts_with("llm exchange")))
                .cloned()
                .collect()
        }
    }

    #[tokio::test]
    async fn debug_mode_logs_prompt_and_raw_response() {
        let captured = Captured::default();
        let _guard = tracing::subscriber::set_default(registry().with(captured.clone()));

        for id in ["gpt-4", "text-davinci-003"] {
            let llm = LlmDispatcher::new(id, Arc::new(FakeTransport::default()), true).unwrap();
            let out = llm.complete("prompt text", 5).await.unwrap();
            assert!(out.ends_with("answer"));
        }

        let logged = captured.exchanges();
        assert_eq!(logged.len(), 2);
        for fields in &logged {
            assert_eq!(fields["message"], "llm exchange");
            assert_eq!(fields["req"], "prompt text");
            assert!(fields["resp"].contains("\"choices\""));
        }
        assert!(logged[0]["resp"].contains("chat answer"));
        assert!(logged[1]["resp"].contains("legacy answer"));
    }

    #[tokio::test]
    async fn debug_mode_logs_failed_exchange() {
        let captured = Captured::default();
        let _guard = tracing::subscriber::set_default(registry().with(captured.clone()));

        let t = Arc::new(FakeTransport {
            fail: true,
            ..Default::default()
        });
        let llm = LlmDispatcher::new("gpt-4", t, true).unwrap();
        let err = llm.complete("p", 1).await.unwrap_err();
        assert!(matches!(err, AiLlmError::Timeout(_)));

        let logged = captured.exchanges();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0]["message"], "llm exchange failed");
        assert_eq!(logged[0]["req"], "p");
        assert_eq!(logged[0]["resp"], "null");
        assert!(logged[0]["error"].contains("timed out"));
    }

    #[tokio::test]
    async fn exchanges_are_silent_without_debug() {
        let captured = Captured::default();
        let _guard = tracing::subscriber::set_default(registry().with(captured.clone()));

        let llm = LlmDispatcher::new("gpt-4", Arc::new(FakeTransport::default()), false).unwrap();
        llm.complete("p", 1).await.unwrap();
        assert!(captured.exchanges().is_empty());
    }

    #[tokio::test]
    async fn debug_logging_keeps_transport_error() {
        let t = Arc::new(FakeTransport {
            fail: true,
            ..Default::default()
        });
        let llm = LlmDispatcher::new("gpt-4", t, true).unwrap();
        let err = llm.complete("p", 1).await.unwrap_err();
        assert!(matches!(err, AiLlmError::Timeout(_)));
    }
}
