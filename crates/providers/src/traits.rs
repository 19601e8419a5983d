// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! The three provider capabilities consumed by the engine.

use async_trait::async_trait;

use crate::error::ProviderResult;

/// Maps a string to a fixed-dimension dense vector.
///
/// Implementations must be deterministic for a fixed provider version:
/// the same text yields the same vector within one build.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> ProviderResult<Vec<f32>>;

    /// The dimension of produced vectors.
    fn dimension(&self) -> usize;
}

/// Maps an ordered list of texts to one summary bounded by a token budget.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `texts` into at most `max_tokens` whitespace tokens.
    async fn summarize(&self, texts: &[String], max_tokens: usize) -> ProviderResult<String>;
}

/// Maps `(context, question)` to an answer string.
#[async_trait]
pub trait Answerer: Send + Sync {
    /// Answer `question` given the retrieved `context`.
    async fn answer(&self, context: &str, question: &str) -> ProviderResult<String>;
}
