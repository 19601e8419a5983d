// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Error types for the chunking module.

/// Chunking error type.
#[derive(Debug, thiserror::Error)]
pub enum ChunkingError {
    /// Invalid chunk size.
    #[error("Invalid chunk size: {0}")]
    InvalidChunkSize(String),

    /// Invalid overlap size.
    #[error("Invalid overlap size: {0}")]
    InvalidOverlap(String),
}

/// Result type alias for chunking operations.
pub type ChunkingResult<T> = std::result::Result<T, ChunkingError>;
