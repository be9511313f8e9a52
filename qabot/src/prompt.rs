//! Built-in prompt templates and the records they are rendered with.
//!
//! Template field names are PascalCase: `.Question`, `.Sections`, `.Turns`,
//! `.Prefix`, and `.Question`/`.Answer` on each turn.

use serde::{Deserialize, Serialize};

/// Single-turn prompt: one `* `-prefixed line per retrieved section.
pub const DEFAULT_PROMPT_TMPL: &str = r#"
Answer the question as truthfully as possible using the provided context, and if the answer is not contained within the text below, say "I don't know."

Context:
{{range .Sections}}
* {{.}}
{{- end}}

Q: {{.Question}}
A:
"#;

/// Front-agent prompt for multi-turn mode. The agent answers small talk
/// itself and writes `{{$.Prefix}} <question>` when the System should answer.
pub const DEFAULT_MULTI_TURN_PROMPT_TMPL: &str = r#"You are an Agent who communicates with the User, with a System available for answering queries. Your responsibilities include:
1. For greetings and pleasantries, respond directly to the User;
2. For other questions, if you cannot understand them, ask the User directly; otherwise, be sure to begin with "{{$.Prefix}}" when querying the System.

Example 1:
User: What is GPT-3?
Agent: {{$.Prefix}} What is GPT-3?

Example 2:
User: How many parameters does it use?
Agent: Sorry, I don't quite understand what you mean.

Example 3:
User: What is GPT-3?
Agent: GPT-3 is an AI model.
User: How many parameters does it use?
Agent: {{$.Prefix}} How many parameters does GPT-3 use?

Conversation:
{{- range $.Turns}}
User: {{.Question}}
Agent: {{.Answer}}
{{- end}}
User: {{$.Question}}
Agent:
"#;

/// Sentinel a front-agent reply starts with when it delegates to retrieval.
pub const DEFAULT_QUERY_PREFIX: &str = "QUERY:";

/// One prior exchange, supplied by the caller on every call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub question: String,
    pub answer: String,
}

impl Turn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PromptData<'a> {
    pub question: &'a str,
    pub sections: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MultiTurnPromptData<'a> {
    pub turns: Vec<TurnData<'a>>,
    pub question: &'a str,
    pub prefix: &'a str,
}

impl<'a> MultiTurnPromptData<'a> {
    pub fn new(history: &'a [Turn], question: &'a str, prefix: &'a str) -> Self {
        Self {
            turns: history.iter().map(TurnData::from).collect(),
            question,
            prefix,
        }
    }
}

/// Template view of a [`Turn`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TurnData<'a> {
    pub question: &'a str,
    pub answer: &'a str,
}

impl<'a> From<&'a Turn> for TurnData<'a> {
    fn from(t: &'a Turn) -> Self {
        Self {
            question: &t.question,
            answer: &t.answer,
        }
    }
}
