//! Script generation and code repair over the chat-completion boundary.

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

use super::prompts;
use super::{create_llm, ChatMessage, Llm};
use crate::config::LlmConfig;

/// Generates the raw model response for a topic: a narration script plus a
/// Manim scene, in the marker layout the parser consumes.
pub struct ScriptGenerator {
    llm: Box<dyn Llm>,
}

impl ScriptGenerator {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            llm: create_llm(config)?,
        })
    }

    /// Ask the model for a narrated-animation script about `topic`.
    pub async fn generate(&self, topic: &str) -> Result<String> {
        info!("🧠 Requesting script for topic: {}", topic);

        let messages = vec![
            ChatMessage::system(prompts::GENERATION_SYSTEM_PROMPT),
            ChatMessage::user(topic),
        ];

        let response = self.llm.chat(messages).await?;
        debug!(
            "Script generation completed ({} chars, tokens: {:?})",
            response.content.len(),
            response.tokens_used
        );

        Ok(response.content)
    }
}

/// Boundary contract for the repair loop: failing animation source plus a
/// classified diagnostic in, a complete replacement source out.
#[async_trait]
pub trait RepairClient: Send + Sync {
    async fn repair(&self, source: &str, diagnostic: &str) -> Result<String>;
}

/// RepairClient backed by a chat-completion service.
pub struct LlmRepairClient {
    llm: Box<dyn Llm>,
}

impl LlmRepairClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            llm: create_llm(config)?,
        })
    }
}

#[async_trait]
impl RepairClient for LlmRepairClient {
    async fn repair(&self, source: &str, diagnostic: &str) -> Result<String> {
        info!("🔧 Requesting code repair ({} chars of source)", source.len());

        let messages = vec![
            ChatMessage::system(prompts::REPAIR_SYSTEM_PROMPT),
            ChatMessage::user(prompts::repair_request(source, diagnostic)),
        ];

        let response = self.llm.chat(messages).await?;
        debug!(
            "Repair completed ({} chars, tokens: {:?})",
            response.content.len(),
            response.tokens_used
        );

        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmProvider, LlmResponse};

    struct CannedLlm {
        reply: String,
    }

    #[async_trait]
    impl Llm for CannedLlm {
        async fn chat(&self, _messages: Vec<ChatMessage>) -> Result<LlmResponse> {
            Ok(LlmResponse {
                content: self.reply.clone(),
                tokens_used: Some(10),
            })
        }

        fn provider_type(&self) -> LlmProvider {
            LlmProvider::LmStudio
        }
    }

    #[tokio::test]
    async fn test_repair_client_returns_replacement_source() {
        let client = LlmRepairClient {
            llm: Box::new(CannedLlm {
                reply: "```python\nfixed = True\n```".to_string(),
            }),
        };

        let replacement = client.repair("broken = True", "SyntaxError").await.unwrap();
        // The orchestrator owns fence normalization; the client hands the
        // model output through untouched.
        assert_eq!(replacement, "```python\nfixed = True\n```");
    }

    #[tokio::test]
    async fn test_script_generator_passes_topic_through() {
        let generator = ScriptGenerator {
            llm: Box::new(CannedLlm {
                reply: "-NARRATION-\nhi\n-MANIM-\ncode".to_string(),
            }),
        };

        let raw = generator.generate("Pythagorean Theorem").await.unwrap();
        assert!(raw.contains("-NARRATION-"));
    }
}
