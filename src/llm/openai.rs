use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::prompt_builder::PromptPair;
use super::prompts::TEMPERATURE;
use super::LlmClient;
use crate::error::{Result, ReviewError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Minimal request/response structs for OpenAI Chat Completions API.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// OpenAI-based implementation of LlmClient.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    api_base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String, api_base_url: String) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| ReviewError::provider("failed to build HTTP client").with_source(e))?;

        Ok(OpenAiClient {
            client,
            api_key,
            model,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chat_url(&self) -> String {
        if self.api_base_url.ends_with("/v1") {
            format!("{}/chat/completions", self.api_base_url)
        } else {
            format!("{}/v1/chat/completions", self.api_base_url)
        }
    }
}

impl LlmClient for OpenAiClient {
    fn complete(&self, prompt: &PromptPair) -> Result<String> {
        let req = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: TEMPERATURE,
        };

        let url = self.chat_url();
        log::info!("Calling OpenAI model {:?}", self.model);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .map_err(|e| ReviewError::provider("failed to send request to OpenAI").with_source(e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_default();
            return Err(ReviewError::provider(format!(
                "OpenAI API error: HTTP {} - {}",
                status.as_u16(),
                text
            )));
        }

        let chat_resp: ChatResponse = resp
            .json()
            .map_err(|e| ReviewError::provider("failed to parse OpenAI response").with_source(e))?;

        if let Some(usage) = &chat_resp.usage {
            log::debug!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            );
        }

        chat_resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ReviewError::provider("no content returned from OpenAI"))
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
