// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Error types for the clustering module.

/// Clustering error type.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    /// Invalid configuration.
    #[error("Invalid cluster configuration: {0}")]
    InvalidConfig(String),

    /// A level outside the interior range was requested.
    #[error("Invalid clustering level {level}: must be between 1 and {max_depth}")]
    InvalidLevel {
        /// Requested level.
        level: usize,
        /// Configured maximum depth.
        max_depth: usize,
    },

    /// Input embeddings disagree on dimension.
    #[error("Embedding dimension mismatch: expected {expected}, got {found}")]
    DimensionMismatch {
        /// Dimension of the first embedding.
        expected: usize,
        /// Dimension of the offending embedding.
        found: usize,
    },
}

/// Result type alias for clustering operations.
pub type ClusterResult<T> = std::result::Result<T, ClusterError>;
