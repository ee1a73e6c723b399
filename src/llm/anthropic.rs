use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::prompt_builder::PromptPair;
use super::prompts::{ANTHROPIC_MAX_TOKENS, TEMPERATURE};
use super::LlmClient;
use crate::error::{Result, ReviewError};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Request/response structs for the Anthropic Messages API.
#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

/// Anthropic-based implementation of LlmClient.
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    model: String,
    api_base_url: String,
}

impl AnthropicClient {
    pub fn new(api_key: String, model: String, api_base_url: String) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| ReviewError::provider("failed to build HTTP client").with_source(e))?;

        Ok(AnthropicClient {
            client,
            api_key,
            model,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn messages_url(&self) -> String {
        if self.api_base_url.ends_with("/v1") {
            format!("{}/messages", self.api_base_url)
        } else {
            format!("{}/v1/messages", self.api_base_url)
        }
    }
}

impl LlmClient for AnthropicClient {
    fn complete(&self, prompt: &PromptPair) -> Result<String> {
        let req = MessagesRequest {
            model: &self.model,
            max_tokens: ANTHROPIC_MAX_TOKENS,
            temperature: TEMPERATURE,
            system: &prompt.system,
            messages: vec![Message {
                role: "user",
                content: &prompt.user,
            }],
        };

        let url = self.messages_url();
        log::info!("Calling Anthropic model {:?}", self.model);

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&req)
            .send()
            .map_err(|e| ReviewError::provider("failed to send request to Anthropic").with_source(e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_default();
            return Err(ReviewError::provider(format!(
                "Anthropic API error: HTTP {} - {}",
                status.as_u16(),
                text
            )));
        }

        let parsed: MessagesResponse = resp
            .json()
            .map_err(|e| ReviewError::provider("failed to parse Anthropic response").with_source(e))?;

        if let Some(usage) = &parsed.usage {
            log::debug!(
                "Token usage: input={}, output={}",
                usage.input_tokens,
                usage.output_tokens
            );
        }

        parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| ReviewError::provider("no text block returned from Anthropic"))
    }

    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
