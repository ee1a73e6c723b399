use musli::json;
use musli::{Decode, Encode};
use reqwest::blocking::Client;

use super::prompt_builder::{truncate, PromptPair};
use super::prompts::TEMPERATURE;
use super::LlmClient;
use crate::error::{Result, ReviewError};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

#[derive(Debug, Encode, Decode)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Encode)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Encode)]
struct OllamaChatRequest {
    model: String,
    stream: bool,
    messages: Vec<OllamaMessage>,
    options: OllamaOptions,
}

#[derive(Debug, Decode)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

/// Synchronous Ollama client using /api/chat.
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| ReviewError::provider("failed to build HTTP client").with_source(e))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

impl LlmClient for OllamaClient {
    fn complete(&self, prompt: &PromptPair) -> Result<String> {
        let req_body = OllamaChatRequest {
            model: self.model.clone(),
            stream: false,
            messages: vec![
                OllamaMessage {
                    role: "system".to_string(),
                    content: prompt.system.clone(),
                },
                OllamaMessage {
                    role: "user".to_string(),
                    content: prompt.user.clone(),
                },
            ],
            options: OllamaOptions {
                temperature: TEMPERATURE,
            },
        };

        let body_str = json::to_string(&req_body).map_err(|e| {
            ReviewError::provider(format!("failed to encode Ollama JSON request: {e}"))
        })?;

        log::trace!("Ollama request body: {}", truncate(&body_str, 4000));

        let url = self.chat_url();
        log::info!("Calling Ollama model {:?} at {url}", self.model);

        let resp = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body_str)
            .send()
            .map_err(|e| ReviewError::provider(format!("error calling Ollama at {url}")).with_source(e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_default();
            return Err(ReviewError::provider(format!(
                "Ollama HTTP error from {url}: HTTP {} - {}",
                status.as_u16(),
                text
            )));
        }

        let resp_text = resp
            .text()
            .map_err(|e| ReviewError::provider("failed to read Ollama response body").with_source(e))?;

        log::trace!("Ollama raw JSON response: {}", truncate(&resp_text, 4000));

        let parsed: OllamaChatResponse = json::from_str(&resp_text)
            .map_err(|e| ReviewError::provider(format!("failed to decode Ollama JSON: {e}")))?;

        Ok(parsed.message.content)
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
