// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Context assembly for the QA provider.

use serde::{Deserialize, Serialize};

use cairn_core::{NodeId, TraversalMethod, Tree};

use crate::retriever::ScoredNode;

/// Characters kept in a node preview.
pub const PREVIEW_CHARS: usize = 200;

/// An inspectable view of one retrieved node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePreview {
    /// Node id.
    pub id: NodeId,

    /// Tree level.
    pub level: usize,

    /// Similarity score.
    pub score: f32,

    /// First characters of the node text.
    pub text_preview: String,
}

/// The full response to one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// The question as asked.
    pub question: String,

    /// The provider's answer, or an error marker if answering failed.
    pub answer: String,

    /// The concatenated context handed to the QA provider.
    pub context: String,

    /// Retrieved nodes in retrieval order.
    pub retrieved_nodes: Vec<NodePreview>,

    /// The strategy that produced the nodes.
    pub retrieval_method: TraversalMethod,
}

/// Concatenate retrieved node texts into one context string.
///
/// Nodes appear in retrieval order, each prefixed with a
/// `[L{level} #{id}]` header line. Returns the context and the previews
/// for inspection.
pub fn assemble_context(tree: &Tree, scored: &[ScoredNode]) -> (String, Vec<NodePreview>) {
    let mut sections = Vec::with_capacity(scored.len());
    let mut previews = Vec::with_capacity(scored.len());

    for entry in scored {
        let Some(node) = tree.get(&entry.id) else {
            continue;
        };

        sections.push(format!("[L{} #{}]\n{}", node.level, node.id, node.text));
        previews.push(NodePreview {
            id: entry.id.clone(),
            level: entry.level,
            score: entry.score,
            text_preview: truncate_chars(&node.text, PREVIEW_CHARS),
        });
    }

    (sections.join("\n\n"), previews)
}

/// First `limit` characters of `text`, on a char boundary.
fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_core::{Facets, Node, NodeMeta};

    fn tree_with_one_leaf(text: &str) -> Tree {
        let mut tree = Tree::new(2);
        tree.insert(Node::leaf(
            NodeId::leaf(0, 0),
            text.to_string(),
            vec![1.0, 0.0],
            NodeMeta::leaf(Facets::unknown()),
        ))
        .unwrap();
        tree
    }

    #[test]
    fn test_context_headers() {
        let tree = tree_with_one_leaf("Revenue was 383.3 billion.");
        let scored = vec![ScoredNode {
            id: NodeId::leaf(0, 0),
            level: 0,
            score: 0.9,
        }];

        let (context, previews) = assemble_context(&tree, &scored);
        assert_eq!(context, "[L0 #leaf_0_0]\nRevenue was 383.3 billion.");
        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0].text_preview, "Revenue was 383.3 billion.");
    }

    #[test]
    fn test_preview_truncation() {
        let long_text = "x".repeat(500);
        let tree = tree_with_one_leaf(&long_text);
        let scored = vec![ScoredNode {
            id: NodeId::leaf(0, 0),
            level: 0,
            score: 0.5,
        }];

        let (context, previews) = assemble_context(&tree, &scored);
        assert_eq!(previews[0].text_preview.len(), PREVIEW_CHARS);
        // The context itself is not truncated.
        assert!(context.len() > PREVIEW_CHARS);
    }

    #[test]
    fn test_sections_joined_by_blank_line() {
        let mut tree = tree_with_one_leaf("first");
        tree.insert(Node::leaf(
            NodeId::leaf(0, 1),
            "second".to_string(),
            vec![0.0, 1.0],
            NodeMeta::leaf(Facets::unknown()),
        ))
        .unwrap();

        let scored = vec![
            ScoredNode { id: NodeId::leaf(0, 1), level: 0, score: 0.8 },
            ScoredNode { id: NodeId::leaf(0, 0), level: 0, score: 0.2 },
        ];

        let (context, previews) = assemble_context(&tree, &scored);
        // Retrieval order is preserved, not id order.
        assert!(context.starts_with("[L0 #leaf_0_1]\nsecond"));
        assert!(context.contains("\n\n[L0 #leaf_0_0]\nfirst"));
        assert_eq!(previews[0].id, NodeId::leaf(0, 1));
    }

    #[test]
    fn test_missing_nodes_are_skipped() {
        let tree = tree_with_one_leaf("present");
        let scored = vec![ScoredNode {
            id: NodeId::from("leaf_9_9"),
            level: 0,
            score: 0.1,
        }];

        let (context, previews) = assemble_context(&tree, &scored);
        assert!(context.is_empty());
        assert!(previews.is_empty());
    }
}
