// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Error types for persistence.

use std::path::PathBuf;

use cairn_core::CoreError;

/// Storage error type.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary encoding or decoding failure.
    #[error("Binary snapshot error: {0}")]
    Binary(String),

    /// The snapshot manifest is missing.
    #[error("Index not found at {0}")]
    IndexNotFound(PathBuf),

    /// The snapshot contradicts its manifest.
    #[error("Corrupt snapshot: {0}")]
    Corrupt(String),

    /// Core data error while rebuilding the tree.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
