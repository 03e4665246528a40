use super::{ChatMessage, Llm, LlmProvider, LlmResponse};
use crate::config::LlmConfig;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Chat-completions request body shared by the OpenAI-protocol providers
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

fn build_client(config: &LlmConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()
        .map_err(Into::into)
}

fn request_body(config: &LlmConfig, messages: Vec<ChatMessage>) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: config.model.clone(),
        messages,
        max_tokens: config.max_tokens,
        temperature: config.temperature,
    }
}

fn first_choice(response: ChatCompletionResponse, service: &str) -> Result<LlmResponse> {
    let content = response
        .choices
        .first()
        .ok_or_else(|| anyhow!("No response from {}", service))?
        .message
        .content
        .clone();

    Ok(LlmResponse {
        content,
        tokens_used: response.usage.map(|u| u.total_tokens),
    })
}

/// OpenAI provider implementation
pub struct OpenAiProvider {
    config: LlmConfig,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(config: LlmConfig) -> Result<Self> {
        if config.api_key.is_none() {
            return Err(anyhow!("OpenAI API key required"));
        }

        let client = build_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl Llm for OpenAiProvider {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<LlmResponse> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| anyhow!("OpenAI API key not configured"))?;

        debug!("Sending request to OpenAI API");

        let response = self
            .client
            .post(OPENAI_CHAT_URL)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request_body(&self.config, messages))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("OpenAI API error {}: {}", status, text));
        }

        first_choice(response.json().await?, "OpenAI")
    }

    fn provider_type(&self) -> LlmProvider {
        LlmProvider::OpenAi
    }
}

/// LM Studio provider: a local server speaking the OpenAI chat protocol
pub struct LmStudioProvider {
    config: LlmConfig,
    client: reqwest::Client,
}

impl LmStudioProvider {
    pub fn new(config: LlmConfig) -> Result<Self> {
        if config.endpoint.is_none() {
            return Err(anyhow!("LM Studio endpoint required"));
        }

        let client = build_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl Llm for LmStudioProvider {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<LlmResponse> {
        let endpoint = self
            .config
            .endpoint
            .as_ref()
            .ok_or_else(|| anyhow!("LM Studio endpoint not configured"))?;

        debug!("Sending request to LM Studio at {}", endpoint);

        let response = self
            .client
            .post(endpoint)
            .json(&request_body(&self.config, messages))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("LM Studio API error {}: {}", status, text));
        }

        first_choice(response.json().await?, "LM Studio")
    }

    fn provider_type(&self) -> LlmProvider {
        LlmProvider::LmStudio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> LlmConfig {
        LlmConfig {
            provider: LlmProvider::OpenAi,
            endpoint: None,
            api_key: Some("sk-test".to_string()),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 256,
            temperature: 0.7,
            timeout_seconds: 30,
        }
    }

    #[test]
    fn test_openai_provider_requires_api_key() {
        let mut config = test_config();
        config.api_key = None;
        assert!(OpenAiProvider::new(config).is_err());
    }

    #[test]
    fn test_lmstudio_provider_requires_endpoint() {
        let mut config = test_config();
        config.provider = LlmProvider::LmStudio;
        assert!(LmStudioProvider::new(config).is_err());
    }

    #[test]
    fn test_chat_completion_response_parsing() {
        let json = r#"{
            "choices": [{"message": {"role": "assistant", "content": "-NARRATION-\nhi\n-MANIM-\ncode"}}],
            "usage": {"total_tokens": 42}
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        let response = first_choice(parsed, "OpenAI").unwrap();
        assert!(response.content.contains("-MANIM-"));
        assert_eq!(response.tokens_used, Some(42));
    }
}
