// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! The summary tree: an id-indexed node store with per-level ordering.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult, Node, NodeId};

/// A built summary tree.
///
/// Holds every node by id plus an ordered index per level. The tree is
/// populated by the builder (or restored from a snapshot) and is read-only
/// for all query operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    nodes: HashMap<NodeId, Node>,
    levels: Vec<Vec<NodeId>>,
    dimension: usize,
    warnings: Vec<String>,
}

impl Tree {
    /// Create an empty tree for embeddings of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            nodes: HashMap::new(),
            levels: Vec::new(),
            dimension,
            warnings: Vec::new(),
        }
    }

    /// Insert a node, appending it to its level's ordered list.
    ///
    /// Insertion order within a level is preserved; it is the caller's
    /// responsibility to insert leaves in document-then-chunk order and
    /// interior nodes in cluster order.
    pub fn insert(&mut self, node: Node) -> CoreResult<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(CoreError::DuplicateNode(node.id));
        }
        node.validate(self.dimension)?;

        while self.levels.len() <= node.level {
            self.levels.push(Vec::new());
        }
        self.levels[node.level].push(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Record the parent link on an already inserted node.
    pub fn set_parent(&mut self, child: &NodeId, parent: NodeId) -> CoreResult<()> {
        let node = self
            .nodes
            .get_mut(child)
            .ok_or_else(|| CoreError::NodeNotFound(child.clone()))?;
        node.parent = Some(parent);
        Ok(())
    }

    /// Append a build warning (e.g. a skipped empty chunk).
    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Get a node by id.
    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// The root node: the single node on the top non-empty level.
    pub fn root(&self) -> Option<&Node> {
        let top = self.levels.iter().rev().find(|level| !level.is_empty())?;
        if top.len() != 1 {
            return None;
        }
        self.nodes.get(&top[0])
    }

    /// Ordered node ids at a level (empty slice if the level is absent).
    pub fn level(&self, level: usize) -> &[NodeId] {
        self.levels.get(level).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ordered nodes at a level.
    pub fn nodes_at_level(&self, level: usize) -> Vec<&Node> {
        self.level(level)
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .collect()
    }

    /// Resolve child nodes of a node, in child order.
    pub fn children_of(&self, node: &Node) -> Vec<&Node> {
        node.children
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .collect()
    }

    /// Number of levels that contain at least one node.
    pub fn depth(&self) -> usize {
        self.levels.iter().filter(|level| !level.is_empty()).count()
    }

    /// Highest level index in use.
    pub fn max_level(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    /// Node count per level, indexed by level.
    pub fn nodes_per_level(&self) -> Vec<usize> {
        self.levels.iter().map(Vec::len).collect()
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The embedding dimension this tree was built with.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Build warnings accumulated during construction.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Iterate all nodes in level-then-position order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.levels
            .iter()
            .flat_map(move |level| level.iter().filter_map(move |id| self.nodes.get(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Facets, NodeMeta};

    fn leaf(doc: usize, chunk: usize) -> Node {
        Node::leaf(
            NodeId::leaf(doc, chunk),
            format!("chunk {} of document {}", chunk, doc),
            vec![1.0, 0.0],
            NodeMeta::leaf(Facets::unknown()),
        )
    }

    #[test]
    fn test_empty_tree() {
        let tree = Tree::new(2);
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn test_insert_preserves_level_order() {
        let mut tree = Tree::new(2);
        tree.insert(leaf(0, 0)).unwrap();
        tree.insert(leaf(0, 1)).unwrap();
        tree.insert(leaf(1, 0)).unwrap();

        let ids: Vec<&str> = tree.level(0).iter().map(NodeId::as_str).collect();
        assert_eq!(ids, vec!["leaf_0_0", "leaf_0_1", "leaf_1_0"]);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut tree = Tree::new(2);
        tree.insert(leaf(0, 0)).unwrap();
        let result = tree.insert(leaf(0, 0));
        assert!(matches!(result, Err(CoreError::DuplicateNode(_))));
    }

    #[test]
    fn test_dimension_enforced() {
        let mut tree = Tree::new(3);
        let result = tree.insert(leaf(0, 0));
        assert!(matches!(result, Err(CoreError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_root_and_parent_links() {
        let mut tree = Tree::new(2);
        tree.insert(leaf(0, 0)).unwrap();
        tree.insert(leaf(1, 0)).unwrap();

        let root = Node::interior(
            NodeId::interior(1, 0),
            1,
            "summary of both".to_string(),
            vec![0.0, 1.0],
            vec![NodeId::leaf(0, 0), NodeId::leaf(1, 0)],
            NodeMeta::interior(Facets::unknown(), 2, 0),
        );
        tree.insert(root).unwrap();
        tree.set_parent(&NodeId::leaf(0, 0), NodeId::interior(1, 0)).unwrap();
        tree.set_parent(&NodeId::leaf(1, 0), NodeId::interior(1, 0)).unwrap();

        let root = tree.root().expect("root");
        assert_eq!(root.id.as_str(), "l1_c0");
        assert_eq!(tree.depth(), 2);

        let child = tree.get(&NodeId::leaf(0, 0)).unwrap();
        assert_eq!(child.parent.as_ref().unwrap().as_str(), "l1_c0");
    }

    #[test]
    fn test_root_requires_single_top_node() {
        let mut tree = Tree::new(2);
        tree.insert(leaf(0, 0)).unwrap();
        tree.insert(leaf(1, 0)).unwrap();
        // Two nodes on the top level: no root yet.
        assert!(tree.root().is_none());
    }
}
