use log::debug;

use crate::config::Config;
use crate::error::{Result, ReviewError};
use crate::llm::anthropic::{self, AnthropicClient};
use crate::llm::ollama::{self, OllamaClient};
use crate::llm::openai::{self, OpenAiClient};
use crate::llm::prompt_builder::{review_prompt, truncate};
use crate::llm::{LlmClient, ProviderKind};

/// Build the LLM client for `provider` from config, with an optional model override.
///
/// Everything is checked here, before any request goes out: the provider
/// must be known and configured, a model must be resolvable, and hosted
/// providers need an API key.
pub fn build_llm_client(
    provider: &str,
    model_override: Option<&str>,
    cfg: &Config,
) -> Result<Box<dyn LlmClient>> {
    let kind: ProviderKind = provider.parse()?;
    let name = kind.as_str();
    let provider_cfg = cfg.provider(name)?;

    let model = model_override
        .map(str::to_string)
        .or_else(|| provider_cfg.model.clone())
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| {
            ReviewError::config(format!(
                "no model configured for provider '{name}'; pass --model or set one in the config file"
            ))
        })?;

    let endpoint = |default: &str| {
        provider_cfg
            .endpoint
            .clone()
            .unwrap_or_else(|| default.to_string())
    };

    debug!("Using {name} client with model: {model}");

    let client: Box<dyn LlmClient> = match kind {
        ProviderKind::OpenAi => Box::new(OpenAiClient::new(
            require_api_key(cfg, kind)?,
            model,
            endpoint(openai::DEFAULT_BASE_URL),
        )?),
        ProviderKind::Anthropic => Box::new(AnthropicClient::new(
            require_api_key(cfg, kind)?,
            model,
            endpoint(anthropic::DEFAULT_BASE_URL),
        )?),
        ProviderKind::Ollama => {
            Box::new(OllamaClient::new(endpoint(ollama::DEFAULT_BASE_URL), model)?)
        }
    };

    Ok(client)
}

fn require_api_key(cfg: &Config, kind: ProviderKind) -> Result<String> {
    let name = kind.as_str();
    let env_var = kind.api_key_env().unwrap_or_default();
    cfg.api_key(name, env_var).ok_or_else(|| {
        ReviewError::config(format!(
            "no API key configured for provider '{name}'; set {env_var} or api_key in the config file"
        ))
    })
}

/// Render `template` around `source` and send it as one review request.
///
/// Provider and model travel inside `client`, as fixed by [`build_llm_client`].
pub fn send(client: &dyn LlmClient, template: &str, source: &str) -> Result<String> {
    let prompt = review_prompt(template, source);

    log::trace!(
        "Review prompt for {} ({}):\n{}",
        client.name(),
        client.model(),
        truncate(&prompt.user, 3000)
    );

    client.complete(&prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::MockClient;
    use mockito::Server;

    fn config_with(name: &str, f: impl FnOnce(&mut crate::config::ProviderConfig)) -> Config {
        let mut cfg = Config::default();
        f(cfg.providers.get_mut(name).unwrap());
        cfg
    }

    #[test]
    fn unknown_provider_fails_without_network() {
        let mut server = Server::new();
        let never = server.mock("POST", mockito::Matcher::Any).expect(0).create();

        let cfg = config_with("ollama", |p| p.endpoint = Some(server.url()));
        let err = build_llm_client("gemini", None, &cfg).err().unwrap();

        assert!(matches!(err, ReviewError::Config { .. }));
        never.assert();
    }

    #[test]
    fn provider_removed_from_config_is_rejected() {
        let mut cfg = Config::default();
        cfg.providers.remove("anthropic");

        let err = build_llm_client("anthropic", None, &cfg).err().unwrap();
        assert!(matches!(err, ReviewError::Config { msg, .. } if msg.contains("not configured")));
    }

    #[test]
    fn model_override_beats_config_default() {
        let cfg = Config::default();
        let client = build_llm_client("ollama", Some("llama3:8b"), &cfg).unwrap();
        assert_eq!(client.name(), "ollama");
        assert_eq!(client.model(), "llama3:8b");
    }

    #[test]
    fn config_default_model_is_used_without_override() {
        let cfg = config_with("anthropic", |p| p.api_key = Some("key-a".into()));
        let client = build_llm_client("anthropic", None, &cfg).unwrap();
        assert_eq!(client.model(), "claude-3-5-sonnet-latest");
    }

    #[test]
    fn missing_model_is_a_config_error() {
        let cfg = config_with("ollama", |p| p.model = None);
        let err = build_llm_client("ollama", None, &cfg).err().unwrap();
        assert!(matches!(err, ReviewError::Config { msg, .. } if msg.contains("no model")));
    }

    #[test]
    fn send_returns_exactly_the_extracted_text() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(
                r#"{"id":"x","model":"gpt-4o-mini","system_fingerprint":"fp",
                    "choices":[{"message":{"role":"assistant","content":"  Rename `tmp`.\n"}}]}"#,
            )
            .create();

        let cfg = config_with("openai", |p| {
            p.api_key = Some("sk-test".into());
            p.endpoint = Some(server.url());
        });

        let client = build_llm_client("openai", None, &cfg).unwrap();
        let out = send(client.as_ref(), "Review {code}", "tmp = 1").unwrap();
        mock.assert();
        assert_eq!(out, "  Rename `tmp`.\n");
    }

    #[test]
    fn send_substitutes_source_into_template() {
        let client = MockClient::new("looks fine");
        let out = send(&client, "Review:\n{code}", "let x = 1;").unwrap();

        assert_eq!(out, "looks fine");
        assert_eq!(client.seen.lock().unwrap().as_slice(), ["Review:\nlet x = 1;"]);
    }
}
