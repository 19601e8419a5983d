// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Error types for retrieval.

/// Retrieval error type.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// Retrieval was attempted on an empty tree.
    #[error("Tree not built: nothing to retrieve from")]
    EmptyTree,

    /// Invalid retrieval cap.
    #[error("Invalid k: must be greater than 0")]
    InvalidK,

    /// Query embedding dimension does not match the tree.
    #[error("Query dimension mismatch: tree has {expected}, query has {found}")]
    DimensionMismatch {
        /// Tree embedding dimension.
        expected: usize,
        /// Query embedding dimension.
        found: usize,
    },

    /// The query could not be embedded.
    #[error("Query embedding failed: {0}")]
    QueryEmbeddingFailed(String),
}

/// Result type alias for retrieval operations.
pub type RetrievalResult<T> = std::result::Result<T, RetrievalError>;
