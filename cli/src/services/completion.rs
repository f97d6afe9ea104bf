//! # Text Completion Service
//!
//! File: cli/src/services/completion.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! The bot treats the language model as an opaque "messages in, text out"
//! service. `Completer` is that seam; `LlmCompleter` implements it with the
//! `llm` crate, building a client per request for the configured provider
//! and model. Tests substitute scripted completers.
//!
use crate::core::config::LlmConfig;
use crate::core::error::{MakanError, Result};
use anyhow::anyhow;
use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatMessage;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One message of a conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A complete request: optional system prompt, the turns, and an output cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub turns: Vec<ChatTurn>,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// A request consisting of a single user prompt.
    pub fn prompt(text: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            system: None,
            turns: vec![ChatTurn::user(text)],
            max_tokens,
        }
    }
}

/// Text-completion backend.
#[async_trait]
pub trait Completer: Send + Sync {
    /// Returns the model's reply, trimmed. Empty replies are errors.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

pub fn map_backend(provider: &str) -> std::result::Result<LLMBackend, String> {
    match provider {
        "openai" => Ok(LLMBackend::OpenAI),
        "anthropic" => Ok(LLMBackend::Anthropic),
        "ollama" => Ok(LLMBackend::Ollama),
        "groq" => Ok(LLMBackend::Groq),
        "mistral" => Ok(LLMBackend::Mistral),
        "deepseek" => Ok(LLMBackend::DeepSeek),
        other => Err(format!("unknown provider: {other}")),
    }
}

/// `Completer` backed by the `llm` crate.
#[derive(Debug, Clone)]
pub struct LlmCompleter {
    provider: String,
    model: String,
    api_key: Option<String>,
}

impl LlmCompleter {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            provider: config.provider.clone(),
            model: config.model.clone(),
            api_key: config.api_key(),
        }
    }
}

#[async_trait]
impl Completer for LlmCompleter {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let backend = map_backend(&self.provider).map_err(|e| anyhow!(MakanError::Completion(e)))?;

        let mut builder = LLMBuilder::new()
            .backend(backend)
            .model(&self.model)
            .max_tokens(request.max_tokens);
        if let Some(system) = &request.system {
            builder = builder.system(system);
        }
        if let Some(key) = &self.api_key {
            builder = builder.api_key(key);
        }

        let llm = builder
            .build()
            .map_err(|e| anyhow!(MakanError::Completion(format!("build LLM: {e}"))))?;

        let messages: Vec<ChatMessage> = request
            .turns
            .iter()
            .map(|turn| match turn.role {
                Role::User => ChatMessage::user().content(&turn.content).build(),
                Role::Assistant => ChatMessage::assistant().content(&turn.content).build(),
            })
            .collect();

        debug!(
            "Sending {} message(s) to {} ({})",
            messages.len(),
            self.provider,
            self.model
        );
        let response = llm
            .chat(&messages)
            .await
            .map_err(|e| anyhow!(MakanError::Completion(format!("chat: {e}"))))?;

        match response.text() {
            Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            Some(_) => Err(anyhow!(MakanError::Completion(
                "model returned empty text".to_string()
            ))),
            None => Err(anyhow!(MakanError::Completion(
                "model returned no text".to_string()
            ))),
        }
    }
}
