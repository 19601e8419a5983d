// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Snapshot round-trip tests.

use cairn_core::{EngineConfig, Facets, Node, NodeId, NodeMeta, Tree};
use cairn_storage::{load, save, StorageError, BINARY_FILE, INDEX_FILE, JSON_FILE};

/// Two leaves under a root, with non-trivial embedding values.
fn sample_tree() -> Tree {
    let mut tree = Tree::new(3);

    tree.insert(Node::leaf(
        NodeId::leaf(0, 0),
        "Apple revenue was 383.3 billion.".to_string(),
        vec![0.123_456_79, 0.0, -1.5],
        NodeMeta::leaf(Facets::new("technology", "Apple Inc", "2023")),
    ))
    .unwrap();
    tree.insert(Node::leaf(
        NodeId::leaf(1, 0),
        "JPMorgan revenue was 158.1 billion.".to_string(),
        vec![0.0, 0.987_654_3, 2.25],
        NodeMeta::leaf(Facets::new("finance", "JPMorgan Chase & Co.", "2023")),
    ))
    .unwrap();

    tree.insert(Node::interior(
        NodeId::interior(1, 0),
        1,
        "Summary of both reports.".to_string(),
        vec![0.5, 0.5, 0.001],
        vec![NodeId::leaf(0, 0), NodeId::leaf(1, 0)],
        NodeMeta::interior(Facets::new("technology", "Apple Inc", "2023"), 2, 0),
    ))
    .unwrap();
    tree.set_parent(&NodeId::leaf(0, 0), NodeId::interior(1, 0)).unwrap();
    tree.set_parent(&NodeId::leaf(1, 0), NodeId::interior(1, 0)).unwrap();

    tree
}

#[test]
fn test_round_trip_is_structurally_identical() {
    let dir = tempfile::tempdir().unwrap();
    let tree = sample_tree();
    let config = EngineConfig::default();

    save(&tree, &config, dir.path()).unwrap();
    let (restored, index) = load(dir.path()).unwrap();

    assert_eq!(restored, tree);
    assert_eq!(index.dimension, 3);
    assert_eq!(index.total_nodes, 3);
    assert_eq!(index.levels, vec![2, 1]);
    assert_eq!(index.config.chunk_size, config.chunk_size);
}

#[test]
fn test_child_order_survives_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let tree = sample_tree();

    save(&tree, &EngineConfig::default(), dir.path()).unwrap();
    let (restored, _) = load(dir.path()).unwrap();

    let root = restored.root().unwrap();
    assert_eq!(root.children, vec![NodeId::leaf(0, 0), NodeId::leaf(1, 0)]);

    let leaf = restored.get(&NodeId::leaf(1, 0)).unwrap();
    assert_eq!(leaf.parent.as_ref().unwrap(), &NodeId::interior(1, 0));
}

#[test]
fn test_embeddings_survive_binary_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let tree = sample_tree();

    save(&tree, &EngineConfig::default(), dir.path()).unwrap();
    let (restored, _) = load(dir.path()).unwrap();

    let original = tree.get(&NodeId::leaf(0, 0)).unwrap();
    let loaded = restored.get(&NodeId::leaf(0, 0)).unwrap();
    assert_eq!(original.embedding, loaded.embedding);
}

#[test]
fn test_json_fallback_when_binary_missing() {
    let dir = tempfile::tempdir().unwrap();
    let tree = sample_tree();

    save(&tree, &EngineConfig::default(), dir.path()).unwrap();
    std::fs::remove_file(dir.path().join(BINARY_FILE)).unwrap();

    let (restored, _) = load(dir.path()).unwrap();
    assert_eq!(restored, tree);
}

#[test]
fn test_json_fallback_when_binary_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let tree = sample_tree();

    save(&tree, &EngineConfig::default(), dir.path()).unwrap();
    std::fs::write(dir.path().join(BINARY_FILE), b"not bincode").unwrap();

    let (restored, _) = load(dir.path()).unwrap();
    assert_eq!(restored, tree);
}

#[test]
fn test_missing_index_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let result = load(dir.path());
    assert!(matches!(result, Err(StorageError::IndexNotFound(_))));
}

#[test]
fn test_node_count_mismatch_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let tree = sample_tree();

    save(&tree, &EngineConfig::default(), dir.path()).unwrap();

    // Rewrite both node files with one record dropped.
    let records: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.path().join(JSON_FILE)).unwrap()).unwrap();
    let truncated: Vec<serde_json::Value> =
        records.as_array().unwrap().iter().take(2).cloned().collect();
    std::fs::write(
        dir.path().join(JSON_FILE),
        serde_json::to_vec(&truncated).unwrap(),
    )
    .unwrap();
    std::fs::remove_file(dir.path().join(BINARY_FILE)).unwrap();

    let result = load(dir.path());
    assert!(matches!(result, Err(StorageError::Corrupt(_))));
}

#[test]
fn test_all_snapshot_files_written() {
    let dir = tempfile::tempdir().unwrap();
    save(&sample_tree(), &EngineConfig::default(), dir.path()).unwrap();

    assert!(dir.path().join(BINARY_FILE).exists());
    assert!(dir.path().join(JSON_FILE).exists());
    assert!(dir.path().join(INDEX_FILE).exists());
}
