pub mod prompts;
pub mod providers;
pub mod script;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;

/// LLM provider types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    LmStudio,
}

/// Chat message for LLM communication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// LLM response
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub tokens_used: Option<u32>,
}

/// Trait for LLM providers
#[async_trait]
pub trait Llm: Send + Sync {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<LlmResponse>;
    fn provider_type(&self) -> LlmProvider;
}

/// Create LLM instance based on configuration
pub fn create_llm(config: &LlmConfig) -> Result<Box<dyn Llm>> {
    match config.provider {
        LlmProvider::OpenAi => Ok(Box::new(providers::OpenAiProvider::new(config.clone())?)),
        LlmProvider::LmStudio => Ok(Box::new(providers::LmStudioProvider::new(config.clone())?)),
    }
}
