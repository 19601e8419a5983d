// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Tree nodes and their deterministic identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult, NodeMeta};

/// Deterministic identifier of a tree node.
///
/// Leaves are keyed by `(document index, chunk index)`, interior nodes by
/// `(level, cluster index)`, so rebuilding the same corpus yields the same
/// ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Id for a level-0 node.
    pub fn leaf(doc_index: usize, chunk_index: usize) -> Self {
        Self(format!("leaf_{}_{}", doc_index, chunk_index))
    }

    /// Id for an interior node at `level` built from cluster `cluster_index`.
    pub fn interior(level: usize, cluster_index: usize) -> Self {
        Self(format!("l{}_c{}", level, cluster_index))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A node in the summary tree.
///
/// Leaves carry original document chunks; interior nodes carry abstractive
/// summaries of their children. Nodes are created by the tree builder and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Deterministic identifier.
    pub id: NodeId,

    /// Tree level, 0 for leaves.
    pub level: usize,

    /// Chunk text (level 0) or generated summary (levels >= 1).
    pub text: String,

    /// Embedding of `text`, produced by the external embedder.
    pub embedding: Vec<f32>,

    /// Ordered child ids (empty at level 0).
    pub children: Vec<NodeId>,

    /// Parent id, `None` for the root (and for nodes not yet linked).
    pub parent: Option<NodeId>,

    /// Facet metadata and diagnostics.
    pub meta: NodeMeta,
}

impl Node {
    /// Create a leaf node.
    pub fn leaf(id: NodeId, text: String, embedding: Vec<f32>, meta: NodeMeta) -> Self {
        Self {
            id,
            level: 0,
            text,
            embedding,
            children: Vec::new(),
            parent: None,
            meta,
        }
    }

    /// Create an interior node.
    pub fn interior(
        id: NodeId,
        level: usize,
        text: String,
        embedding: Vec<f32>,
        children: Vec<NodeId>,
        meta: NodeMeta,
    ) -> Self {
        Self {
            id,
            level,
            text,
            embedding,
            children,
            parent: None,
            meta,
        }
    }

    /// Whether this node is a leaf.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.level == 0
    }

    /// The embedding dimension.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }

    /// Validate the node's data.
    pub fn validate(&self, expected_dimension: usize) -> CoreResult<()> {
        if self.text.trim().is_empty() {
            return Err(CoreError::EmptyText(self.id.clone()));
        }
        if self.embedding.len() != expected_dimension {
            return Err(CoreError::DimensionMismatch {
                expected: expected_dimension,
                found: self.embedding.len(),
            });
        }
        if self.meta.num_children != self.children.len() {
            return Err(CoreError::InvalidConfig(format!(
                "num_children {} does not match children list of {}",
                self.meta.num_children,
                self.children.len()
            )));
        }
        Ok(())
    }
}
