// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! OpenAI-compatible HTTP provider.
//!
//! Implements all three capabilities against the `/embeddings` and
//! `/chat/completions` endpoints, so any OpenAI-compatible server
//! (including local ones) can back the engine.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, ProviderResult};
use crate::traits::{Answerer, Embedder, Summarizer};

/// Configuration for the OpenAI-compatible provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API endpoint, e.g. "https://api.openai.com/v1".
    pub endpoint: String,

    /// API key, or a `${VAR}` placeholder resolved from the environment.
    pub api_key: Option<String>,

    /// Embedding model name.
    pub embed_model: String,

    /// Chat model used for summarization and answering.
    pub chat_model: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: None,
            embed_model: "text-embedding-3-small".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            timeout_secs: 60,
        }
    }
}

impl OpenAiConfig {
    /// Configuration for the hosted OpenAI API.
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Configuration for a local OpenAI-compatible server.
    pub fn local(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            ..Default::default()
        }
    }

    /// Resolve the API key, expanding `${VAR}` placeholders.
    pub fn resolve_api_key(&self) -> Option<String> {
        let key = self.api_key.as_ref()?;
        if let Some(var) = key.strip_prefix("${").and_then(|k| k.strip_suffix('}')) {
            std::env::var(var).ok()
        } else {
            Some(key.clone())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ProviderResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(ProviderError::InvalidConfig("endpoint must not be empty".into()));
        }
        if self.embed_model.trim().is_empty() || self.chat_model.trim().is_empty() {
            return Err(ProviderError::InvalidConfig("model names must not be empty".into()));
        }
        Ok(())
    }
}

/// OpenAI-compatible provider for embeddings, summaries and answers.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    config: OpenAiConfig,
    dimension: usize,
}

impl OpenAiProvider {
    /// Create a provider from configuration.
    pub fn new(config: OpenAiConfig) -> ProviderResult<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::InvalidConfig(e.to_string()))?;

        let dimension = Self::model_dimension(&config.embed_model);

        Ok(Self {
            client,
            config,
            dimension,
        })
    }

    /// The expected embedding dimension for a model.
    fn model_dimension(model: &str) -> usize {
        match model {
            "text-embedding-3-small" => 1536,
            "text-embedding-3-large" => 3072,
            "text-embedding-ada-002" => 1536,
            _ => 1536,
        }
    }

    async fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> ProviderResult<R> {
        let url = format!("{}/{}", self.config.endpoint.trim_end_matches('/'), path);
        let mut request = self.client.post(&url).json(body);

        if let Some(key) = self.config.resolve_api_key() {
            request = request.bearer_auth(key);
        }

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(timeout)
            } else {
                ProviderError::Network(e.to_string())
            }
        })?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::Auth(format!("status {}", status.as_u16())));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited(format!("status {}", status.as_u16())));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))
    }

    async fn chat(&self, system: &str, user: String, max_tokens: usize) -> ProviderResult<String> {
        let body = ChatRequest {
            model: self.config.chat_model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user,
                },
            ],
            max_tokens,
        };

        let response: ChatResponse = self.post("chat/completions", &body).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(ProviderError::EmptyResponse)?;
        Ok(content)
    }
}

#[async_trait]
impl Embedder for OpenAiProvider {
    async fn embed(&self, text: &str) -> ProviderResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyInput);
        }

        let body = EmbeddingRequest {
            model: self.config.embed_model.clone(),
            input: text.to_string(),
        };
        let response: EmbeddingResponse = self.post("embeddings", &body).await?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or(ProviderError::EmptyResponse)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[async_trait]
impl Summarizer for OpenAiProvider {
    async fn summarize(&self, texts: &[String], max_tokens: usize) -> ProviderResult<String> {
        if texts.is_empty() {
            return Err(ProviderError::EmptyInput);
        }

        let system = format!(
            "Summarize the following report excerpts in at most {} words. \
             Preserve figures, company names and fiscal years.",
            max_tokens
        );
        self.chat(&system, texts.join("\n\n"), max_tokens).await
    }
}

#[async_trait]
impl Answerer for OpenAiProvider {
    async fn answer(&self, context: &str, question: &str) -> ProviderResult<String> {
        let system = "Answer the question using only the provided context. \
                      Cite figures exactly as they appear.";
        let user = format!("Context:\n{}\n\nQuestion: {}", context, question);
        self.chat(system, user, 512).await
    }
}

#[derive(Serialize)]
struct EmbeddingRequest {
    model: String,
    input: String,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider = OpenAiProvider::new(OpenAiConfig::openai("sk-test")).unwrap();
        assert_eq!(provider.dimension(), 1536);
    }

    #[test]
    fn test_model_dimensions() {
        assert_eq!(OpenAiProvider::model_dimension("text-embedding-3-small"), 1536);
        assert_eq!(OpenAiProvider::model_dimension("text-embedding-3-large"), 3072);
        assert_eq!(OpenAiProvider::model_dimension("custom-model"), 1536);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = OpenAiConfig {
            endpoint: "".to_string(),
            ..Default::default()
        };
        assert!(OpenAiProvider::new(config).is_err());
    }

    #[test]
    fn test_api_key_passthrough() {
        let config = OpenAiConfig::openai("sk-direct");
        assert_eq!(config.resolve_api_key().unwrap(), "sk-direct");
    }

    #[test]
    fn test_api_key_env_placeholder() {
        let config = OpenAiConfig {
            api_key: Some("${CAIRN_TEST_KEY_THAT_IS_UNSET}".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key(), None);
    }
}
