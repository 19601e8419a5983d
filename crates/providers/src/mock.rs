// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Deterministic in-process providers.
//!
//! These implementations are pure functions of their input and are stable
//! across processes, which makes them suitable as test doubles wherever
//! the build or retrieval contract demands reproducibility.

use async_trait::async_trait;

use crate::error::{ProviderError, ProviderResult};
use crate::traits::{Answerer, Embedder, Summarizer};

/// Token-bag embedder over hashed buckets.
///
/// Each lowercase alphanumeric token is hashed (FNV-1a, stable across
/// runs) into one of `dimension` buckets; the bucket counts are
/// L2-normalised into a unit vector. Lexical overlap therefore translates
/// into cosine similarity.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Create an embedder producing vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> ProviderResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyInput);
        }

        let mut vector = vec![0.0_f32; self.dimension];
        for token in tokenize(text) {
            let bucket = (fnv1a(token.as_bytes()) % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        } else {
            vector[0] = 1.0;
        }

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Summarizer that wraps the concatenated inputs in `SUM(..)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JoinSummarizer;

impl JoinSummarizer {
    /// Create a new join summarizer.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Summarizer for JoinSummarizer {
    async fn summarize(&self, texts: &[String], max_tokens: usize) -> ProviderResult<String> {
        if texts.is_empty() {
            return Err(ProviderError::EmptyInput);
        }
        let joined = texts.join(" ");
        let bounded: Vec<&str> = joined.split_whitespace().take(max_tokens).collect();
        Ok(format!("SUM({})", bounded.join(" ")))
    }
}

/// Answerer that echoes the question and the context size.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoAnswerer;

impl EchoAnswerer {
    /// Create a new echo answerer.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Answerer for EchoAnswerer {
    async fn answer(&self, context: &str, question: &str) -> ProviderResult<String> {
        Ok(format!(
            "[mock answer] question: {} (context: {} chars)",
            question,
            context.len()
        ))
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET;
    for &byte in bytes {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
