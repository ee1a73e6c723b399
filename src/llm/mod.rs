pub mod anthropic;
pub mod ollama;
pub mod openai;
pub mod prompt_builder;
pub mod prompts;

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ReviewError};
use prompt_builder::PromptPair;

/// Trait for talking to an LLM backend.
///
/// A client is built once per run and never mutated; everything it needs
/// (credential, model, endpoint) is fixed at construction.
pub trait LlmClient: Send + Sync {
    /// Send one prompt and return the primary text of the reply.
    fn complete(&self, prompt: &PromptPair) -> Result<String>;

    /// Provider identifier, e.g. "ollama".
    fn name(&self) -> &str;

    fn model(&self) -> &str;
}

/// The three supported wire formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Ollama,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Ollama => "ollama",
        }
    }

    /// Environment variable consulted when the config file has no key.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderKind::OpenAi => Some("OPENAI_API_KEY"),
            ProviderKind::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderKind::Ollama => None,
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" => Ok(ProviderKind::Anthropic),
            "ollama" => Ok(ProviderKind::Ollama),
            other => Err(ReviewError::config(format!(
                "unsupported provider '{other}' (expected ollama, openai, or anthropic)"
            ))),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records the prompt it was given and replies with a canned answer.
    pub struct MockClient {
        pub reply: String,
        pub seen: Mutex<Vec<String>>,
    }

    impl MockClient {
        pub fn new(reply: impl Into<String>) -> Self {
            MockClient {
                reply: reply.into(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl LlmClient for MockClient {
        fn complete(&self, prompt: &PromptPair) -> Result<String> {
            self.seen.lock().unwrap().push(prompt.user.clone());
            Ok(self.reply.clone())
        }

        fn name(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "mock-model"
        }
    }
}
