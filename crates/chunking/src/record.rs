// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Input and output records of the chunking stage.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use cairn_core::Facets;

/// A raw document handed to the engine by the ingestion layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Full document text.
    pub text: String,

    /// Optional metadata supplied by the caller. Recognised keys
    /// (`sector`, `company`, `year`) override regex-extracted values.
    pub metadata: HashMap<String, String>,
}

impl DocumentRecord {
    /// Create a record from plain text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata override.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl From<&str> for DocumentRecord {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// One chunk of a document, with the document's facets attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Index of the source document within the corpus.
    pub doc_index: usize,

    /// Index of this chunk within its document.
    pub chunk_index: usize,

    /// Chunk text.
    pub text: String,

    /// Facets extracted once per document and shared by all its chunks.
    pub facets: Facets,
}

impl DocumentChunk {
    /// Number of whitespace tokens in the chunk.
    pub fn token_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Whether the chunk carries no usable text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
