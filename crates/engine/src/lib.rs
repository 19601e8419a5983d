// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! The CAIRN engine facade.
//!
//! Composes chunking, tree building, retrieval and persistence behind a
//! small surface: `add_documents`, `query`, `save`, `load` and
//! `statistics`. Providers are injected at construction and held for the
//! engine's lifetime.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod engine;
mod error;

pub use engine::{Engine, EngineStats, ProviderSet};
pub use error::{EngineError, EngineResult};

/// Re-exports commonly used types.
pub mod prelude {
    pub use crate::{Engine, EngineError, EngineResult, EngineStats, ProviderSet};
    pub use cairn_chunking::DocumentRecord;
    pub use cairn_core::{EngineConfig, TraversalMethod};
    pub use cairn_retrieval::QueryResponse;
}
