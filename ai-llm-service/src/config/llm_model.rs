use std::{fmt, str::FromStr};

use crate::error_handler::ConfigError;

/// Wire protocol a model family is served through.
///
/// See <https://platform.openai.com/docs/models/model-endpoint-compatibility>.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelFamily {
    /// `POST /v1/chat/completions` with role-tagged messages.
    Chat,
    /// `POST /v1/completions` with a list of prompt strings.
    Completion,
}

/// Every model identifier the dispatcher knows how to talk to.
///
/// Parsing an unknown identifier fails with [`ConfigError::UnsupportedModel`];
/// there is no fallback family.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::llm_model::{LlmModel, ModelFamily};
///
/// let m: LlmModel = "gpt-3.5-turbo".parse().unwrap();
/// assert_eq!(m.family(), ModelFamily::Chat);
/// assert!("not-a-real-model".parse::<LlmModel>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmModel {
    Gpt4,
    Gpt35Turbo,
    TextDavinci003,
    TextDavinci002,
    TextCurie001,
    TextBabbage001,
    TextAda001,
}

impl LlmModel {
    /// All supported identifiers, chat family first.
    pub const ALL: [LlmModel; 7] = [
        LlmModel::Gpt4,
        LlmModel::Gpt35Turbo,
        LlmModel::TextDavinci003,
        LlmModel::TextDavinci002,
        LlmModel::TextCurie001,
        LlmModel::TextBabbage001,
        LlmModel::TextAda001,
    ];

    /// Identifier as sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            LlmModel::Gpt4 => "gpt-4",
            LlmModel::Gpt35Turbo => "gpt-3.5-turbo",
            LlmModel::TextDavinci003 => "text-davinci-003",
            LlmModel::TextDavinci002 => "text-davinci-002",
            LlmModel::TextCurie001 => "text-curie-001",
            LlmModel::TextBabbage001 => "text-babbage-001",
            LlmModel::TextAda001 => "text-ada-001",
        }
    }

    pub fn family(self) -> ModelFamily {
        match self {
            LlmModel::Gpt4 | LlmModel::Gpt35Turbo => ModelFamily::Chat,
            LlmModel::TextDavinci003
            | LlmModel::TextDavinci002
            | LlmModel::TextCurie001
            | LlmModel::TextBabbage001
            | LlmModel::TextAda001 => ModelFamily::Completion,
        }
    }
}

impl Default for LlmModel {
    fn default() -> Self {
        LlmModel::Gpt35Turbo
    }
}

impl fmt::Display for LlmModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        if id.is_empty() {
            return Err(ConfigError::EmptyModel);
        }
        LlmModel::ALL
            .into_iter()
            .find(|m| m.as_str() == id)
            .ok_or_else(|| ConfigError::UnsupportedModel(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_round_trip_through_parse() {
        for m in LlmModel::ALL {
            assert_eq!(m.as_str().parse::<LlmModel>().unwrap(), m);
        }
    }

    #[test]
    fn families_are_partitioned() {
        let chat: Vec<_> = LlmModel::ALL
            .into_iter()
            .filter(|m| m.family() == ModelFamily::Chat)
            .map(LlmModel::as_str)
            .collect();
        assert_eq!(chat, ["gpt-4", "gpt-3.5-turbo"]);
        assert_eq!(LlmModel::TextAda001.family(), ModelFamily::Completion);
    }

    #[test]
    fn unknown_and_empty_ids_are_rejected() {
        assert!(matches!(
            "not-a-real-model".parse::<LlmModel>(),
            Err(ConfigError::UnsupportedModel(id)) if id == "not-a-real-model"
        ));
        assert!(matches!("  ".parse::<LlmModel>(), Err(ConfigError::EmptyModel)));
        // Case-sensitive, no fuzzy matching.
        assert!("GPT-4".parse::<LlmModel>().is_err());
    }
}
