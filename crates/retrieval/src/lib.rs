// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Retrieval over a built summary tree.
//!
//! Two complementary strategies share one scoring discipline (cosine
//! similarity, ties broken by node id): a hierarchical frontier descent
//! from the root that mixes abstraction levels, and a flattened search
//! where leaves compete directly with summaries.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod context;
mod error;
mod retriever;
mod score;

pub use context::{assemble_context, NodePreview, QueryResponse, PREVIEW_CHARS};
pub use error::{RetrievalError, RetrievalResult};
pub use retriever::{Retriever, RetrieverConfig, ScoredNode};
pub use score::cosine_similarity;
