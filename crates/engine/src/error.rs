// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Error types for the engine facade.

use cairn_core::CoreError;
use cairn_retrieval::RetrievalError;
use cairn_storage::StorageError;
use cairn_tree::BuildError;

/// Engine error type.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid call-time configuration (k, method, question).
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// An operation required a tree that has not been built or loaded.
    #[error("Tree not built")]
    TreeNotBuilt,

    /// Embedding the query failed after retries.
    #[error("Query embedding failed: {0}")]
    QueryEmbedding(String),

    /// Core data error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Build failure.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Retrieval failure.
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    /// Persistence failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type alias for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
