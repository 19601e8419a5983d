// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! The two retrieval strategies.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use cairn_core::{Node, NodeId, TraversalMethod, Tree};

use crate::{
    error::{RetrievalError, RetrievalResult},
    score::cosine_similarity,
};

/// A retrieved node reference with its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredNode {
    /// Node id.
    pub id: NodeId,

    /// Tree level of the node.
    pub level: usize,

    /// Similarity score against the query (after level weighting).
    pub score: f32,
}

/// Configuration for the retriever.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrieverConfig {
    /// Children retained per level during hierarchical descent.
    /// Defaults to the caller's `k`.
    pub k_per_level: Option<usize>,

    /// Score multipliers per level for the flattened strategy.
    /// Missing levels weigh 1.0.
    pub level_weights: HashMap<usize, f32>,
}

impl RetrieverConfig {
    /// Create a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the per-level retention cap of the hierarchical strategy.
    pub fn with_k_per_level(mut self, k: usize) -> Self {
        self.k_per_level = Some(k);
        self
    }

    /// Set a score multiplier for one level.
    pub fn with_level_weight(mut self, level: usize, weight: f32) -> Self {
        self.level_weights.insert(level, weight);
        self
    }

    fn weight(&self, level: usize) -> f32 {
        self.level_weights.get(&level).copied().unwrap_or(1.0)
    }
}

/// Retrieves a ranked, deduplicated set of nodes for a query embedding.
#[derive(Debug, Clone, Default)]
pub struct Retriever {
    config: RetrieverConfig,
}

impl Retriever {
    /// Create a retriever with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a retriever with custom configuration.
    pub fn with_config(config: RetrieverConfig) -> Self {
        Self { config }
    }

    /// Retrieve up to `k` nodes for the query embedding.
    pub fn retrieve(
        &self,
        tree: &Tree,
        query: &[f32],
        k: usize,
        method: TraversalMethod,
    ) -> RetrievalResult<Vec<ScoredNode>> {
        if k == 0 {
            return Err(RetrievalError::InvalidK);
        }
        if tree.is_empty() {
            return Err(RetrievalError::EmptyTree);
        }
        if query.len() != tree.dimension() {
            return Err(RetrievalError::DimensionMismatch {
                expected: tree.dimension(),
                found: query.len(),
            });
        }

        let results = match method {
            TraversalMethod::Hierarchical => self.hierarchical(tree, query, k),
            TraversalMethod::Flattened => self.flattened(tree, query, k),
        };

        debug!(method = %method, k, returned = results.len(), "retrieval complete");
        Ok(results)
    }

    /// Top-down frontier descent from the root.
    ///
    /// At each level the children of the current frontier are scored and
    /// the best `k_per_level` survive into both the result accumulator and
    /// the next frontier. A node has a single parent, so duplicates cannot
    /// arise.
    fn hierarchical(&self, tree: &Tree, query: &[f32], k: usize) -> Vec<ScoredNode> {
        let k_per_level = self.config.k_per_level.unwrap_or(k);

        let Some(root) = tree.root() else {
            // No single top node: fall back to scoring the top level.
            return self.flattened(tree, query, k);
        };

        let mut accumulator: Vec<ScoredNode> = Vec::new();
        let mut frontier: Vec<&Node> = vec![root];

        loop {
            let mut candidates: Vec<(ScoredNode, &Node)> = frontier
                .iter()
                .flat_map(|node| tree.children_of(node))
                .map(|child| {
                    let scored = ScoredNode {
                        id: child.id.clone(),
                        level: child.level,
                        score: cosine_similarity(query, &child.embedding),
                    };
                    (scored, child)
                })
                .collect();
            if candidates.is_empty() {
                break;
            }

            candidates.sort_by(|(a, _), (b, _)| {
                b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id))
            });
            candidates.truncate(k_per_level);

            frontier = candidates.iter().map(|(_, node)| *node).collect();
            accumulator.extend(candidates.into_iter().map(|(scored, _)| scored));
        }

        accumulator.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        accumulator.truncate(k);
        accumulator
    }

    /// Flat ranking across the union of all levels.
    fn flattened(&self, tree: &Tree, query: &[f32], k: usize) -> Vec<ScoredNode> {
        let mut scored: Vec<ScoredNode> = tree
            .iter()
            .map(|node| ScoredNode {
                id: node.id.clone(),
                level: node.level,
                score: cosine_similarity(query, &node.embedding) * self.config.weight(node.level),
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));

        let mut seen = HashSet::new();
        scored.retain(|node| seen.insert(node.id.clone()));
        scored.truncate(k);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_core::{Facets, NodeMeta};

    // A small hand-built tree: two leaves under one root, with axis-aligned
    // embeddings so scores are exact.
    fn test_tree() -> Tree {
        let mut tree = Tree::new(3);

        tree.insert(Node::leaf(
            NodeId::leaf(0, 0),
            "alpha chunk".to_string(),
            vec![1.0, 0.0, 0.0],
            NodeMeta::leaf(Facets::new("technology", "Alpha Inc", "2023")),
        ))
        .unwrap();
        tree.insert(Node::leaf(
            NodeId::leaf(1, 0),
            "beta chunk".to_string(),
            vec![0.0, 1.0, 0.0],
            NodeMeta::leaf(Facets::new("finance", "Beta Corp", "2023")),
        ))
        .unwrap();

        tree.insert(Node::interior(
            NodeId::interior(1, 0),
            1,
            "summary of both".to_string(),
            vec![0.0, 0.0, 1.0],
            vec![NodeId::leaf(0, 0), NodeId::leaf(1, 0)],
            NodeMeta::interior(Facets::aggregated(), 2, 0),
        ))
        .unwrap();
        tree.set_parent(&NodeId::leaf(0, 0), NodeId::interior(1, 0)).unwrap();
        tree.set_parent(&NodeId::leaf(1, 0), NodeId::interior(1, 0)).unwrap();

        tree
    }

    #[test]
    fn test_flattened_ranks_by_similarity() {
        let tree = test_tree();
        let retriever = Retriever::new();

        let results = retriever
            .retrieve(&tree, &[1.0, 0.1, 0.0], 3, TraversalMethod::Flattened)
            .unwrap();

        assert_eq!(results[0].id, NodeId::leaf(0, 0));
        assert!(results[0].score > results[1].score);
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_hierarchical_collects_descendants() {
        let tree = test_tree();
        let retriever = Retriever::new();

        let results = retriever
            .retrieve(&tree, &[1.0, 0.0, 0.0], 2, TraversalMethod::Hierarchical)
            .unwrap();

        // The frontier descends from the root to the leaves; the alpha
        // leaf matches the query exactly.
        assert_eq!(results[0].id, NodeId::leaf(0, 0));
        assert!(results.len() <= 2);
    }

    #[test]
    fn test_k_bounds_output() {
        let tree = test_tree();
        let retriever = Retriever::new();

        for k in 1..4 {
            for method in [TraversalMethod::Hierarchical, TraversalMethod::Flattened] {
                let results = retriever
                    .retrieve(&tree, &[0.5, 0.5, 0.5], k, method)
                    .unwrap();
                assert!(results.len() <= k);
            }
        }
    }

    #[test]
    fn test_no_duplicate_ids() {
        let tree = test_tree();
        let retriever = Retriever::new();

        let results = retriever
            .retrieve(&tree, &[0.5, 0.5, 0.5], 10, TraversalMethod::Flattened)
            .unwrap();

        let mut ids: Vec<&NodeId> = results.iter().map(|r| &r.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), results.len());
    }

    #[test]
    fn test_retrieval_is_idempotent() {
        let tree = test_tree();
        let retriever = Retriever::new();

        let first = retriever
            .retrieve(&tree, &[0.3, 0.3, 0.9], 3, TraversalMethod::Hierarchical)
            .unwrap();
        let second = retriever
            .retrieve(&tree, &[0.3, 0.3, 0.9], 3, TraversalMethod::Hierarchical)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ties_break_by_id() {
        let tree = test_tree();
        let retriever = Retriever::new();

        // Orthogonal to every embedding: all scores are zero, so ids
        // decide the order.
        let results = retriever
            .retrieve(&tree, &[0.0, 0.0, 0.0], 3, TraversalMethod::Flattened)
            .unwrap();

        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["l1_c0", "leaf_0_0", "leaf_1_0"]);
    }

    #[test]
    fn test_level_weights_bias_flattened() {
        let tree = test_tree();
        let retriever =
            Retriever::with_config(RetrieverConfig::new().with_level_weight(0, 0.0));

        let results = retriever
            .retrieve(&tree, &[0.0, 0.0, 1.0], 1, TraversalMethod::Flattened)
            .unwrap();

        // Leaves are zeroed out, only the summary can win.
        assert_eq!(results[0].id, NodeId::interior(1, 0));
    }

    #[test]
    fn test_empty_tree_rejected() {
        let tree = Tree::new(3);
        let retriever = Retriever::new();
        let result = retriever.retrieve(&tree, &[1.0, 0.0, 0.0], 3, TraversalMethod::Flattened);
        assert!(matches!(result, Err(RetrievalError::EmptyTree)));
    }

    #[test]
    fn test_invalid_k_rejected() {
        let tree = test_tree();
        let retriever = Retriever::new();
        let result = retriever.retrieve(&tree, &[1.0, 0.0, 0.0], 0, TraversalMethod::Flattened);
        assert!(matches!(result, Err(RetrievalError::InvalidK)));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let tree = test_tree();
        let retriever = Retriever::new();
        let result = retriever.retrieve(&tree, &[1.0, 0.0], 3, TraversalMethod::Flattened);
        assert!(matches!(result, Err(RetrievalError::DimensionMismatch { .. })));
    }
}
