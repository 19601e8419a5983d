// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! CAIRN core data types.
//!
//! This crate provides the fundamental data structures for the CAIRN
//! engine: tree nodes, the summary tree itself, report facet metadata,
//! and the engine configuration.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
mod meta;
mod node;
mod tree;

pub use config::{EngineConfig, TraversalMethod};
pub use error::{CoreError, CoreResult};
pub use meta::{Facets, MetadataKey, NodeMeta, ALL, UNKNOWN};
pub use node::{Node, NodeId};
pub use tree::Tree;

/// Re-exports commonly used types.
pub mod prelude {
    pub use crate::{EngineConfig, Facets, Node, NodeId, NodeMeta, TraversalMethod, Tree};
}
