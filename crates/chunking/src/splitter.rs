// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Sentence-aligned token window splitting.

use tracing::debug;

use crate::{
    error::{ChunkingError, ChunkingResult},
    extract::extract_facets,
    record::{DocumentChunk, DocumentRecord},
};

// Boundary tolerance around the target chunk size, in percent.
const BOUNDARY_TOLERANCE_PCT: usize = 15;

/// Configuration for document chunking.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkerConfig {
    /// Target chunk size in whitespace tokens.
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in tokens.
    pub chunk_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 50,
        }
    }
}

impl ChunkerConfig {
    /// Create a config with explicit sizes.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ChunkingResult<()> {
        if self.chunk_size == 0 {
            return Err(ChunkingError::InvalidChunkSize(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ChunkingError::InvalidOverlap(
                "chunk_overlap must be less than chunk_size".to_string(),
            ));
        }
        Ok(())
    }
}

/// Splits documents into overlapping token windows with facet metadata.
#[derive(Debug, Clone)]
pub struct DocumentChunker {
    config: ChunkerConfig,
}

impl DocumentChunker {
    /// Create a chunker with default configuration.
    pub fn new() -> Self {
        Self {
            config: ChunkerConfig::default(),
        }
    }

    /// Create a chunker with custom configuration.
    pub fn with_config(config: ChunkerConfig) -> ChunkingResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active configuration.
    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Chunk every document of a corpus, preserving document order.
    pub fn chunk_corpus(&self, documents: &[DocumentRecord]) -> Vec<DocumentChunk> {
        documents
            .iter()
            .enumerate()
            .flat_map(|(doc_index, record)| self.chunk_document(doc_index, record))
            .collect()
    }

    /// Chunk a single document.
    ///
    /// Facets are extracted once from the whole document and attached to
    /// every chunk. An empty document yields no chunks.
    pub fn chunk_document(&self, doc_index: usize, record: &DocumentRecord) -> Vec<DocumentChunk> {
        let tokens: Vec<&str> = record.text.split_whitespace().collect();
        if tokens.is_empty() {
            return Vec::new();
        }

        let facets = extract_facets(&record.text, &record.metadata);
        let windows = token_windows(&tokens, self.config.chunk_size, self.config.chunk_overlap);

        debug!(
            doc_index,
            tokens = tokens.len(),
            chunks = windows.len(),
            sector = %facets.sector,
            "chunked document"
        );

        windows
            .into_iter()
            .enumerate()
            .map(|(chunk_index, (start, end))| DocumentChunk {
                doc_index,
                chunk_index,
                text: tokens[start..end].join(" "),
                facets: facets.clone(),
            })
            .collect()
    }
}

impl Default for DocumentChunker {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the `(start, end)` token windows for one document.
fn token_windows(tokens: &[&str], size: usize, overlap: usize) -> Vec<(usize, usize)> {
    let len = tokens.len();
    let slack = (size * BOUNDARY_TOLERANCE_PCT).div_ceil(100);
    let upper = size + slack;
    let lower = size.saturating_sub(slack).max(1);

    let mut windows = Vec::new();
    let mut start = 0;

    while start < len {
        if len - start <= upper {
            windows.push((start, len));
            break;
        }

        let end = split_sentence_bounded(tokens, start, size, lower, upper);
        windows.push((start, end));

        // The next window backs up by the overlap, but always advances.
        let next = end.saturating_sub(overlap);
        start = if next > start { next } else { end };
    }

    windows
}

/// Pick a cut point for the window starting at `start`.
///
/// Prefers the sentence terminator closest to `start + size` within the
/// `[lower, upper]` token tolerance band; falls back to the plain token
/// boundary at the target size.
pub fn split_sentence_bounded(
    tokens: &[&str],
    start: usize,
    size: usize,
    lower: usize,
    upper: usize,
) -> usize {
    let target = start + size;
    let window_start = start + lower;
    let window_end = (start + upper).min(tokens.len());

    let mut best: Option<usize> = None;
    for end in window_start..=window_end {
        if ends_sentence(tokens[end - 1]) {
            let better = match best {
                None => true,
                Some(current) => end.abs_diff(target) < current.abs_diff(target),
            };
            if better {
                best = Some(end);
            }
        }
    }

    best.unwrap_or(target)
}

/// Whether a token terminates a sentence, ignoring closing quotes and
/// brackets.
fn ends_sentence(token: &str) -> bool {
    token
        .trim_end_matches(['"', '\'', ')', ']'])
        .ends_with(['.', '!', '?'])
}
