// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Deterministic extractive fallback summarizer.
//!
//! Used when the abstractive provider exhausts its retries or returns an
//! empty summary: the leading sentences of the input are kept until the
//! token budget is spent.

use async_trait::async_trait;

use crate::error::{ProviderError, ProviderResult};
use crate::traits::Summarizer;

/// Extractive summarizer: first sentences within the token budget.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractiveSummarizer;

impl ExtractiveSummarizer {
    /// Create a new extractive summarizer.
    pub fn new() -> Self {
        Self
    }

    /// Summarize synchronously.
    pub fn extract(&self, texts: &[String], max_tokens: usize) -> ProviderResult<String> {
        if texts.iter().all(|t| t.trim().is_empty()) {
            return Err(ProviderError::EmptyInput);
        }

        let joined = texts.join(" ");
        let mut summary = String::new();
        let mut budget = max_tokens;

        for sentence in split_sentences(&joined) {
            let cost = sentence.split_whitespace().count();
            if cost > budget {
                break;
            }
            if !summary.is_empty() {
                summary.push(' ');
            }
            summary.push_str(&sentence);
            budget -= cost;
        }

        // Not even the first sentence fits: hard-truncate it.
        if summary.is_empty() {
            let first = split_sentences(&joined).into_iter().next().unwrap_or(joined);
            summary = first
                .split_whitespace()
                .take(max_tokens)
                .collect::<Vec<_>>()
                .join(" ");
        }

        Ok(summary)
    }
}

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    async fn summarize(&self, texts: &[String], max_tokens: usize) -> ProviderResult<String> {
        self.extract(texts, max_tokens)
    }
}

/// Split text into sentences on `.`, `!` and `?` followed by whitespace.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);

        if c == '.' || c == '!' || c == '?' {
            match chars.peek() {
                Some(&next) if next.is_whitespace() => {
                    let sentence = current.trim().to_string();
                    if !sentence.is_empty() {
                        sentences.push(sentence);
                    }
                    current = String::new();
                }
                None => {}
                _ => {}
            }
        }
    }

    let remaining = current.trim().to_string();
    if !remaining.is_empty() {
        sentences.push(remaining);
    }

    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences() {
        let text = "Revenue grew. Margins held steady! What changed? Costs.";
        let sentences = split_sentences(text);
        assert_eq!(sentences.len(), 4);
        assert_eq!(sentences[0], "Revenue grew.");
        assert_eq!(sentences[2], "What changed?");
    }

    #[test]
    fn test_decimal_numbers_do_not_split() {
        let sentences = split_sentences("Revenue was 383.3 billion. Costs fell.");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0], "Revenue was 383.3 billion.");
    }

    #[test]
    fn test_extract_respects_budget() {
        let summarizer = ExtractiveSummarizer::new();
        let texts = vec![
            "One two three. Four five six seven. Eight nine ten eleven twelve.".to_string(),
        ];

        let summary = summarizer.extract(&texts, 7).unwrap();
        assert_eq!(summary, "One two three. Four five six seven.");
        assert!(summary.split_whitespace().count() <= 7);
    }

    #[test]
    fn test_extract_truncates_oversized_first_sentence() {
        let summarizer = ExtractiveSummarizer::new();
        let texts = vec!["alpha beta gamma delta epsilon zeta".to_string()];

        let summary = summarizer.extract(&texts, 3).unwrap();
        assert_eq!(summary, "alpha beta gamma");
    }

    #[test]
    fn test_extract_rejects_blank_input() {
        let summarizer = ExtractiveSummarizer::new();
        let result = summarizer.extract(&["  ".to_string()], 10);
        assert!(matches!(result, Err(ProviderError::EmptyInput)));
    }

    #[tokio::test]
    async fn test_trait_impl_matches_extract() {
        let summarizer = ExtractiveSummarizer::new();
        let texts = vec!["First point. Second point.".to_string()];
        let via_trait = summarizer.summarize(&texts, 10).await.unwrap();
        let direct = summarizer.extract(&texts, 10).unwrap();
        assert_eq!(via_trait, direct);
    }
}
