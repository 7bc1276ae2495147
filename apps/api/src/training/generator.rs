//! Module generation collaborator.
//!
//! The generator is treated as an opaque external producer: it returns a
//! raw JSON payload which the module store validates before anything
//! trusts it. Pluggable behind a trait so handlers can be exercised
//! without a live LLM.

use async_trait::async_trait;
use serde_json::Value;

use crate::llm_client::{ChatMessage, ChatRole, GeminiClient, LlmError};
use crate::training::prompts::{transcript_user_message, MODULE_GENERATION_SYSTEM};

#[async_trait]
pub trait ModuleGenerator: Send + Sync {
    /// Produces a module payload from a flattened interview transcript.
    async fn generate(&self, transcript_text: &str) -> Result<Value, LlmError>;
}

/// Production generator backed by the Gemini client.
pub struct LlmModuleGenerator {
    llm: GeminiClient,
}

impl LlmModuleGenerator {
    pub fn new(llm: GeminiClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ModuleGenerator for LlmModuleGenerator {
    async fn generate(&self, transcript_text: &str) -> Result<Value, LlmError> {
        let history = [ChatMessage {
            role: ChatRole::User,
            text: transcript_user_message(transcript_text),
        }];

        self.llm
            .generate_json(&history, MODULE_GENERATION_SYSTEM)
            .await
    }
}
