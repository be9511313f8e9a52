use std::sync::Arc;

use ai_llm_service::{CompletionTransport, LlmDispatcher, ModelFamily};
use tracing::{debug, info};

use crate::cfg::BotConfig;
use crate::error::{BotConfigError, BotError};
use crate::multi_turn::MultiTurn;
use crate::prompt::Turn;
use crate::segment::{NoopSegmenter, Segmenter};
use crate::single_turn::SingleTurn;
use crate::template::PromptTemplate;

/// Retrieval-augmented QA bot.
///
/// Stateless after construction: share one instance behind an `Arc` across
/// any number of concurrent [`chat`](Bot::chat) calls.
pub struct Bot {
    single: SingleTurn,
    multi: MultiTurn,
}

impl Bot {
    /// Resolves defaults, validates, parses both templates and binds the
    /// completion protocol for the configured model. Sends no request.
    ///
    /// # Errors
    /// Missing encoder/querier, invalid sentinel prefix, template parse
    /// errors, a multi-turn template that never mentions `.Prefix`, or an
    /// unknown model. All satisfy [`BotError::is_config`].
    pub fn new(cfg: BotConfig, transport: Arc<dyn CompletionTransport>) -> Result<Self, BotError> {
        let cfg = cfg.resolve();
        cfg.validate()?;

        let prompt = PromptTemplate::parse("prompt", &cfg.prompt_tmpl)?;
        let multi_prompt = PromptTemplate::parse("multi-turn prompt", &cfg.multi_turn_prompt_tmpl)?;
        if !multi_prompt.references_field("Prefix") {
            return Err(BotConfigError::PrefixNotInTemplate.into());
        }

        let llm = Arc::new(LlmDispatcher::new(&cfg.model, transport, cfg.debug)?);

        let (Some(encoder), Some(querier)) = (cfg.encoder, cfg.querier) else {
            return Err(BotConfigError::MissingCollaborator("encoder/querier").into());
        };
        let segmenter: Arc<dyn Segmenter> = cfg.segmenter.unwrap_or_else(|| Arc::new(NoopSegmenter));

        info!(
            model = %llm.model(),
            top_k = cfg.top_k,
            max_tokens = cfg.max_tokens,
            prefix = %cfg.query_prefix,
            debug = cfg.debug,
            "Bot initialized"
        );

        Ok(Self {
            single: SingleTurn {
                encoder,
                querier,
                segmenter,
                llm: llm.clone(),
                template: prompt,
                top_k: cfg.top_k,
                max_tokens: cfg.max_tokens,
            },
            multi: MultiTurn {
                llm,
                template: multi_prompt,
                prefix: cfg.query_prefix,
                max_tokens: cfg.max_tokens,
            },
        })
    }

    /// Answers `question`. An empty `history` runs the single-turn pipeline;
    /// otherwise the front agent decides between a direct reply and a
    /// retrieval-backed answer to a rewritten question.
    ///
    /// Dropping the returned future cancels the in-flight collaborator call.
    pub async fn chat(&self, question: &str, history: &[Turn]) -> Result<String, BotError> {
        if history.is_empty() {
            debug!("single-turn chat");
            self.single.answer(question).await
        } else {
            debug!(turns = history.len(), "multi-turn chat");
            self.multi.answer(question, history, &self.single).await
        }
    }

    pub fn model_family(&self) -> ModelFamily {
        self.single.llm.family()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateError;
    use crate::testing::{FakeEncoder, FakeQuerier, FakeTransport, UpperSegmenter};
    use ai_llm_service::AiLlmError;
    use ai_llm_service::error_handler::{ProviderError, ProviderErrorKind};
    use rag_store::RagError;

    struct Rig {
        encoder: Arc<FakeEncoder>,
        querier: Arc<FakeQuerier>,
        transport: Arc<FakeTransport>,
    }

    impl Rig {
        fn new(texts: &[&str], replies: &[&str]) -> Self {
            Self {
                encoder: Arc::new(FakeEncoder::default()),
                querier: Arc::new(FakeQuerier::with_texts(texts)),
                transport: Arc::new(FakeTransport::scripted(replies)),
            }
        }

        fn config(&self) -> BotConfig {
            BotConfig::new(self.encoder.clone(), self.querier.clone())
        }

        fn bot(&self, cfg: BotConfig) -> Bot {
            Bot::new(cfg, self.transport.clone()).unwrap()
        }
    }

    #[tokio::test]
    async fn single_turn_grounds_prompt_in_retrieved_sections() {
        let rig = Rig::new(&["Doc A says X.", "Doc B says Y."], &["X is a letter."]);
        let bot = rig.bot(rig.config());

        let answer = bot.chat("What is X?", &[]).await.unwrap();
        assert_eq!(answer, "X is a letter.");

        let prompts = rig.transport.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("* Doc A says X.\n* Doc B says Y."));
        assert!(prompts[0].trim_end().ends_with("Q: What is X?\nA:"));
        assert_eq!(rig.encoder.calls(), vec!["What is X?"]);
        assert_eq!(rig.querier.last_top_k.load(std::sync::atomic::Ordering::SeqCst), 3);
        assert_eq!(*rig.transport.max_tokens.lock().unwrap(), vec![Some(256)]);
    }

    #[tokio::test]
    async fn segmented_text_is_encoded_but_prompt_keeps_original() {
        let rig = Rig::new(&["ctx"], &["ok"]);
        let bot = rig.bot(rig.config().with_segmenter(Arc::new(UpperSegmenter)));

        bot.chat("what is x?", &[]).await.unwrap();
        assert_eq!(rig.encoder.calls(), vec!["WHAT IS X?"]);
        assert!(rig.transport.prompts()[0].contains("Q: what is x?"));
    }

    #[tokio::test]
    async fn sentinel_reply_delegates_refined_question() {
        let rig = Rig::new(
            &["GPT-3 has 175B parameters."],
            &["QUERY: How many parameters does GPT-3 use?", "175 billion."],
        );
        let bot = rig.bot(rig.config());
        let history = [Turn::new("What is GPT-3?", "An AI model.")];

        let answer = bot.chat("How many parameters?", &history).await.unwrap();
        assert_eq!(answer, "175 billion.");

        let prompts = rig.transport.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("User: What is GPT-3?\nAgent: An AI model.\nUser: How many parameters?\nAgent:"));
        assert!(prompts[1].contains("Q: How many parameters does GPT-3 use?\nA:"));
        assert_eq!(rig.encoder.calls(), vec!["How many parameters does GPT-3 use?"]);
        assert_eq!(rig.querier.call_count(), 1);
    }

    #[tokio::test]
    async fn direct_reply_skips_retrieval() {
        let rig = Rig::new(&["unused"], &["Sorry, I don't understand."]);
        let bot = rig.bot(rig.config());
        let history = [Turn::new("hi", "hello!")];

        let answer = bot.chat("blorp?", &history).await.unwrap();
        assert_eq!(answer, "Sorry, I don't understand.");
        assert!(rig.encoder.calls().is_empty());
        assert_eq!(rig.querier.call_count(), 0);
        assert_eq!(rig.transport.prompts().len(), 1);
    }

    #[tokio::test]
    async fn custom_prefix_flows_into_template_and_parser() {
        let rig = Rig::new(&["ctx"], &["ASK> refined", "final"]);
        let cfg = BotConfig {
            query_prefix: "ASK>".into(),
            ..rig.config()
        };
        let bot = rig.bot(cfg);

        let answer = bot.chat("q", &[Turn::new("a", "b")]).await.unwrap();
        assert_eq!(answer, "final");
        assert!(rig.transport.prompts()[0].contains("begin with \"ASK>\""));
        assert_eq!(rig.encoder.calls(), vec!["refined"]);
    }

    #[tokio::test]
    async fn routing_depends_only_on_history() {
        let rig = Rig::new(&["ctx"], &["QUERY: q", "from retrieval", "plain"]);
        let bot = rig.bot(rig.config());

        assert_eq!(bot.chat("q", &[Turn::new("a", "b")]).await.unwrap(), "from retrieval");
        assert_eq!(bot.chat("q", &[]).await.unwrap(), "plain");
        assert_eq!(rig.transport.prompts().len(), 3);
        assert_eq!(rig.querier.call_count(), 2);
    }

    #[test]
    fn unknown_model_fails_construction_without_calls() {
        let rig = Rig::new(&[], &[]);
        let cfg = BotConfig {
            model: "not-a-real-model".into(),
            ..rig.config()
        };
        let err = Bot::new(cfg, rig.transport.clone()).err().unwrap();
        assert!(err.is_config());
        assert!(matches!(err, BotError::Llm(AiLlmError::Config(_))));
        assert!(rig.transport.prompts().is_empty());
    }

    #[test]
    fn legacy_model_selects_completion_family() {
        let rig = Rig::new(&[], &[]);
        let cfg = BotConfig {
            model: "text-davinci-003".into(),
            ..rig.config()
        };
        assert_eq!(rig.bot(cfg).model_family(), ModelFamily::Completion);
        assert_eq!(rig.bot(rig.config()).model_family(), ModelFamily::Chat);
    }

    #[test]
    fn construction_rejects_bad_configuration() {
        let rig = Rig::new(&[], &[]);
        let transport: Arc<dyn CompletionTransport> = rig.transport.clone();

        let no_querier = BotConfig::default().with_encoder(rig.encoder.clone());
        assert!(matches!(
            Bot::new(no_querier, transport.clone()).err().unwrap(),
            BotError::Config(BotConfigError::MissingCollaborator("querier"))
        ));

        let bad_tmpl = BotConfig {
            prompt_tmpl: "{{range .Sections}}".into(),
            ..rig.config()
        };
        let err = Bot::new(bad_tmpl, transport.clone()).err().unwrap();
        assert!(matches!(err, BotError::Template(TemplateError::Parse(_))));
        assert!(err.is_config());

        let no_prefix = BotConfig {
            multi_turn_prompt_tmpl: "{{range .Turns}}{{.Question}}{{end}} {{.Question}}".into(),
            ..rig.config()
        };
        assert!(matches!(
            Bot::new(no_prefix, transport.clone()).err().unwrap(),
            BotError::Config(BotConfigError::PrefixNotInTemplate)
        ));

        let bad_prefix = BotConfig {
            query_prefix: "QUERY: ".into(),
            ..rig.config()
        };
        assert!(matches!(
            Bot::new(bad_prefix, transport).err().unwrap(),
            BotError::Config(BotConfigError::InvalidPrefix(_))
        ));
    }

    #[tokio::test]
    async fn collaborator_errors_propagate() {
        let rig = Rig {
            encoder: Arc::new(FakeEncoder {
                fail: true,
                ..Default::default()
            }),
            querier: Arc::new(FakeQuerier::default()),
            transport: Arc::new(FakeTransport::default()),
        };
        let err = rig.bot(rig.config()).chat("q", &[]).await.unwrap_err();
        assert!(matches!(err, BotError::Retrieval(RagError::Provider(_))));
        assert!(!err.is_config());
        assert_eq!(rig.querier.call_count(), 0);
        assert!(rig.transport.prompts().is_empty());

        let rig = Rig {
            querier: Arc::new(FakeQuerier {
                fail: true,
                ..Default::default()
            }),
            ..Rig::new(&[], &[])
        };
        let err = rig.bot(rig.config()).chat("q", &[]).await.unwrap_err();
        assert!(matches!(err, BotError::Retrieval(RagError::Qdrant(_))));
        assert!(rig.transport.prompts().is_empty());
    }

    #[tokio::test]
    async fn empty_choices_surface_as_llm_error() {
        let rig = Rig::new(&["ctx"], &[]);
        let err = rig.bot(rig.config()).chat("q", &[]).await.unwrap_err();
        assert!(matches!(
            err,
            BotError::Llm(AiLlmError::Provider(ProviderError {
                kind: ProviderErrorKind::EmptyChoices,
                ..
            }))
        ));
    }

    #[tokio::test]
    async fn front_agent_failure_is_not_retried() {
        let rig = Rig {
            transport: Arc::new(FakeTransport {
                fail: true,
                ..Default::default()
            }),
            ..Rig::new(&["ctx"], &[])
        };
        let err = rig
            .bot(rig.config())
            .chat("q", &[Turn::new("a", "b")])
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::Llm(AiLlmError::Timeout(_))));
        assert_eq!(rig.transport.prompts().len(), 1);
        assert_eq!(rig.querier.call_count(), 0);
    }

    #[tokio::test]
    async fn template_exec_error_aborts_before_completion() {
        let rig = Rig::new(&["ctx"], &["never"]);
        let cfg = BotConfig {
            prompt_tmpl: "{{.Missing}}".into(),
            ..rig.config()
        };
        let err = rig.bot(cfg).chat("q", &[]).await.unwrap_err();
        assert!(matches!(err, BotError::Template(TemplateError::Exec(_))));
        assert!(!err.is_config());
        assert!(rig.transport.prompts().is_empty());
    }

    #[tokio::test]
    async fn concurrent_chats_share_one_bot() {
        let replies: Vec<String> = (0..8).map(|i| format!("a{i}")).collect();
        let refs: Vec<&str> = replies.iter().map(String::as_str).collect();
        let rig = Rig::new(&["ctx"], &refs);
        let bot = Arc::new(rig.bot(rig.config()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let bot = bot.clone();
                tokio::spawn(async move { bot.chat(&format!("q{i}"), &[]).await })
            })
            .collect();

        let mut answers = Vec::new();
        for h in handles {
            answers.push(h.await.unwrap().unwrap());
        }
        answers.sort();
        let mut want = replies.clone();
        want.sort();
        assert_eq!(answers, want);
        assert_eq!(rig.querier.call_count(), 8);
    }
}
