// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Error types for tree construction.

use cairn_core::CoreError;
use cairn_cluster::ClusterError;
use cairn_providers::ProviderError;

/// Build error type.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The corpus contained no usable chunks.
    #[error("Corpus is empty: no non-blank chunks to build from")]
    EmptyCorpus,

    /// The build was cancelled cooperatively.
    #[error("Build cancelled")]
    Cancelled,

    /// Embedding a chunk or summary failed terminally.
    #[error("Embedding failed for {subject}")]
    Embedding {
        /// Id of the chunk or summary that failed.
        subject: String,
        /// Underlying provider error.
        #[source]
        source: ProviderError,
    },

    /// Summarization failed terminally (permanent provider error).
    #[error("Summarization failed for {subject}")]
    Summarization {
        /// Id of the cluster that failed.
        subject: String,
        /// Underlying provider error.
        #[source]
        source: ProviderError,
    },

    /// Core data error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Clustering error.
    #[error(transparent)]
    Cluster(#[from] ClusterError),
}

/// Result type alias for build operations.
pub type BuildResult<T> = std::result::Result<T, BuildError>;
