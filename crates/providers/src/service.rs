// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Resilient provider clients.
//!
//! Thin wrappers that apply the retry/timeout discipline around the raw
//! provider traits. The embedding client additionally memoises per-build
//! results, which both saves round trips and pins "identical input yields
//! identical output" for the duration of a build.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::fallback::ExtractiveSummarizer;
use crate::retry::{with_retries, RetryPolicy};
use crate::traits::{Answerer, Embedder, Summarizer};

/// Embedding client with retries and an in-memory cache.
#[derive(Clone)]
pub struct EmbeddingClient {
    backend: Arc<dyn Embedder>,
    policy: RetryPolicy,
    cache: Arc<RwLock<HashMap<String, Vec<f32>>>>,
}

impl EmbeddingClient {
    /// Create a client around a backend.
    pub fn new(backend: Arc<dyn Embedder>, policy: RetryPolicy) -> Self {
        Self {
            backend,
            policy,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// The embedding dimension of the backend.
    pub fn dimension(&self) -> usize {
        self.backend.dimension()
    }

    /// Embed `text`, naming `subject` in any exhaustion error.
    pub async fn embed(&self, subject: &str, text: &str) -> ProviderResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyInput);
        }

        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(text) {
                return Ok(cached.clone());
            }
        }

        let backend = self.backend.clone();
        let embedding = with_retries(&self.policy, "embedding", subject, || {
            let backend = backend.clone();
            let text = text.to_string();
            async move { backend.embed(&text).await }
        })
        .await?;

        if embedding.len() != self.backend.dimension() {
            return Err(ProviderError::MalformedResponse(format!(
                "embedding has dimension {}, backend promised {}",
                embedding.len(),
                self.backend.dimension()
            )));
        }

        let mut cache = self.cache.write().await;
        cache.insert(text.to_string(), embedding.clone());
        Ok(embedding)
    }

    /// Drop all memoised embeddings.
    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }

    /// Number of memoised embeddings.
    pub async fn cache_size(&self) -> usize {
        self.cache.read().await.len()
    }
}

/// A summary together with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// The summary text.
    pub text: String,

    /// Whether the extractive fallback produced it.
    pub used_fallback: bool,
}

/// Summarization client with retries and extractive fallback.
#[derive(Clone)]
pub struct SummaryClient {
    backend: Arc<dyn Summarizer>,
    fallback: ExtractiveSummarizer,
    policy: RetryPolicy,
}

impl SummaryClient {
    /// Create a client around a backend.
    pub fn new(backend: Arc<dyn Summarizer>, policy: RetryPolicy) -> Self {
        Self {
            backend,
            fallback: ExtractiveSummarizer::new(),
            policy,
        }
    }

    /// Summarize `texts`, naming `subject` in diagnostics.
    ///
    /// Retry exhaustion and empty provider output degrade to the
    /// deterministic extractive fallback; permanent provider errors
    /// propagate.
    pub async fn summarize(
        &self,
        subject: &str,
        texts: &[String],
        max_tokens: usize,
    ) -> ProviderResult<Summary> {
        if texts.is_empty() {
            return Err(ProviderError::EmptyInput);
        }

        let backend = self.backend.clone();
        let result = with_retries(&self.policy, "summarization", subject, || {
            let backend = backend.clone();
            let texts = texts.to_vec();
            async move { backend.summarize(&texts, max_tokens).await }
        })
        .await;

        match result {
            Ok(text) if !text.trim().is_empty() => Ok(Summary {
                text,
                used_fallback: false,
            }),
            Ok(_) => {
                warn!(subject, "provider returned an empty summary, using extractive fallback");
                self.fallback_summary(texts, max_tokens)
            }
            Err(error @ ProviderError::Exhausted { .. }) => {
                warn!(subject, %error, "summarizer retries exhausted, using extractive fallback");
                self.fallback_summary(texts, max_tokens)
            }
            Err(error) => Err(error),
        }
    }

    fn fallback_summary(&self, texts: &[String], max_tokens: usize) -> ProviderResult<Summary> {
        let text = self.fallback.extract(texts, max_tokens)?;
        Ok(Summary {
            text,
            used_fallback: true,
        })
    }
}

/// Question-answering client with retries.
#[derive(Clone)]
pub struct QaClient {
    backend: Arc<dyn Answerer>,
    policy: RetryPolicy,
}

impl QaClient {
    /// Create a client around a backend.
    pub fn new(backend: Arc<dyn Answerer>, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    /// Answer `question` over `context`.
    pub async fn answer(&self, context: &str, question: &str) -> ProviderResult<String> {
        let backend = self.backend.clone();
        let answer = with_retries(&self.policy, "answering", "query", || {
            let backend = backend.clone();
            let context = context.to_string();
            let question = question.to_string();
            async move { backend.answer(&context, &question).await }
        })
        .await?;

        debug!(answer_len = answer.len(), "qa provider answered");
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{EchoAnswerer, HashEmbedder, JoinSummarizer};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingEmbedder {
        inner: HashEmbedder,
        calls: AtomicU32,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed(&self, text: &str) -> ProviderResult<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.embed(text).await
        }

        fn dimension(&self) -> usize {
            self.inner.dimension()
        }
    }

    #[tokio::test]
    async fn test_embedding_cache_hits() {
        let backend = Arc::new(CountingEmbedder {
            inner: HashEmbedder::new(8),
            calls: AtomicU32::new(0),
        });
        let client = EmbeddingClient::new(backend.clone(), RetryPolicy::default());

        let a = client.embed("leaf_0_0", "same text").await.unwrap();
        let b = client.embed("leaf_0_1", "same text").await.unwrap();

        assert_eq!(a, b);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.cache_size().await, 1);
    }

    #[tokio::test]
    async fn test_embedding_rejects_blank() {
        let client = EmbeddingClient::new(Arc::new(HashEmbedder::new(8)), RetryPolicy::default());
        let result = client.embed("leaf_0_0", "  ").await;
        assert!(matches!(result, Err(ProviderError::EmptyInput)));
    }

    struct FailingSummarizer;

    #[async_trait]
    impl Summarizer for FailingSummarizer {
        async fn summarize(&self, _texts: &[String], _max_tokens: usize) -> ProviderResult<String> {
            Err(ProviderError::Network("provider down".into()))
        }
    }

    struct EmptySummarizer;

    #[async_trait]
    impl Summarizer for EmptySummarizer {
        async fn summarize(&self, _texts: &[String], _max_tokens: usize) -> ProviderResult<String> {
            Ok("   ".to_string())
        }
    }

    struct UnauthorizedSummarizer;

    #[async_trait]
    impl Summarizer for UnauthorizedSummarizer {
        async fn summarize(&self, _texts: &[String], _max_tokens: usize) -> ProviderResult<String> {
            Err(ProviderError::Auth("expired key".into()))
        }
    }

    #[tokio::test]
    async fn test_summary_happy_path() {
        let client = SummaryClient::new(Arc::new(JoinSummarizer::new()), RetryPolicy::default());
        let summary = client
            .summarize("l1_c0", &["alpha".to_string(), "beta".to_string()], 200)
            .await
            .unwrap();

        assert_eq!(summary.text, "SUM(alpha beta)");
        assert!(!summary.used_fallback);
    }

    #[tokio::test(start_paused = true)]
    async fn test_summary_falls_back_on_exhaustion() {
        let client = SummaryClient::new(Arc::new(FailingSummarizer), RetryPolicy::default());
        let summary = client
            .summarize("l1_c0", &["First sentence. Second sentence.".to_string()], 10)
            .await
            .unwrap();

        assert!(summary.used_fallback);
        assert!(summary.text.starts_with("First sentence."));
    }

    #[tokio::test]
    async fn test_summary_falls_back_on_empty_output() {
        let client = SummaryClient::new(Arc::new(EmptySummarizer), RetryPolicy::default());
        let summary = client
            .summarize("l1_c0", &["Usable input text.".to_string()], 10)
            .await
            .unwrap();

        assert!(summary.used_fallback);
        assert_eq!(summary.text, "Usable input text.");
    }

    #[tokio::test]
    async fn test_summary_propagates_permanent_errors() {
        let client = SummaryClient::new(Arc::new(UnauthorizedSummarizer), RetryPolicy::default());
        let result = client
            .summarize("l1_c0", &["text".to_string()], 10)
            .await;

        assert!(matches!(result, Err(ProviderError::Auth(_))));
    }

    #[tokio::test]
    async fn test_qa_client_round_trip() {
        let client = QaClient::new(Arc::new(EchoAnswerer::new()), RetryPolicy::default());
        let answer = client.answer("context", "What was revenue?").await.unwrap();
        assert!(answer.contains("What was revenue?"));
    }
}
