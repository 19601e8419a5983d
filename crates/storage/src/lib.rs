// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Tree persistence.
//!
//! A snapshot is a directory of three files: `nodes.bin` (compact
//! bincode), `nodes.json` (textual form of the same records) and
//! `index.json` (the manifest and source of truth for dimension and
//! level counts). Loading tries the binary form first and falls back to
//! JSON; neither path calls an external provider.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod snapshot;

pub use error::{StorageError, StorageResult};
pub use snapshot::{load, save, IndexFile, SnapshotConfig, BINARY_FILE, INDEX_FILE, JSON_FILE};
