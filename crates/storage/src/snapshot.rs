// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Snapshot serialization.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use cairn_core::{EngineConfig, Node, NodeId, NodeMeta, Tree};

use crate::error::{StorageError, StorageResult};

/// Compact binary node file.
pub const BINARY_FILE: &str = "nodes.bin";

/// Textual node file.
pub const JSON_FILE: &str = "nodes.json";

/// Snapshot manifest.
pub const INDEX_FILE: &str = "index.json";

const FORMAT_VERSION: u32 = 1;

/// The build-relevant configuration recorded in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Target chunk size in tokens.
    pub chunk_size: usize,
    /// Chunk overlap in tokens.
    pub chunk_overlap: usize,
    /// Maximum interior level.
    pub max_depth: usize,
    /// Reduction target dimensionality.
    pub reduction_dimension: usize,
    /// BIC component cap.
    pub max_clusters: usize,
    /// Absorb-into-neighbour threshold.
    pub min_cluster_size: usize,
    /// Sub-clustering trigger size.
    pub max_cluster_size: usize,
    /// Summarizer token budget.
    pub summarization_length: usize,
}

impl From<&EngineConfig> for SnapshotConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            max_depth: config.max_depth,
            reduction_dimension: config.reduction_dimension,
            max_clusters: config.max_clusters,
            min_cluster_size: config.min_cluster_size,
            max_cluster_size: config.max_cluster_size,
            summarization_length: config.summarization_length,
        }
    }
}

/// The snapshot manifest: source of truth for dimension and level counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexFile {
    /// Snapshot format version.
    pub format_version: u32,

    /// Embedding dimension.
    pub dimension: usize,

    /// Total number of persisted nodes.
    pub total_nodes: usize,

    /// Node count per level, indexed by level.
    pub levels: Vec<usize>,

    /// When the snapshot was written.
    pub built_at: DateTime<Utc>,

    /// Configuration the tree was built with.
    pub config: SnapshotConfig,
}

/// One persisted node, in level-then-cluster order within the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct NodeRecord {
    id: NodeId,
    level: usize,
    text: String,
    embedding: Vec<f32>,
    parent: Option<NodeId>,
    meta: NodeMeta,
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            level: node.level,
            text: node.text.clone(),
            embedding: node.embedding.clone(),
            parent: node.parent.clone(),
            meta: node.meta.clone(),
        }
    }
}

/// Persist a tree into `dir`, writing both forms plus the manifest.
pub fn save(tree: &Tree, config: &EngineConfig, dir: impl AsRef<Path>) -> StorageResult<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let records: Vec<NodeRecord> = tree.iter().map(NodeRecord::from).collect();

    let binary = bincode::serialize(&records).map_err(|e| StorageError::Binary(e.to_string()))?;
    fs::write(dir.join(BINARY_FILE), binary)?;
    fs::write(dir.join(JSON_FILE), serde_json::to_vec_pretty(&records)?)?;

    let index = IndexFile {
        format_version: FORMAT_VERSION,
        dimension: tree.dimension(),
        total_nodes: tree.len(),
        levels: tree.nodes_per_level(),
        built_at: Utc::now(),
        config: SnapshotConfig::from(config),
    };
    fs::write(dir.join(INDEX_FILE), serde_json::to_vec_pretty(&index)?)?;

    debug!(path = %dir.display(), nodes = records.len(), "snapshot written");
    Ok(())
}

/// Restore a tree from `dir`.
///
/// The binary form is tried first; decode failures fall back to the JSON
/// form. The manifest decides the dimension and the expected counts.
pub fn load(dir: impl AsRef<Path>) -> StorageResult<(Tree, IndexFile)> {
    let dir = dir.as_ref();

    let index_path = dir.join(INDEX_FILE);
    if !index_path.exists() {
        return Err(StorageError::IndexNotFound(index_path));
    }
    let index: IndexFile = serde_json::from_slice(&fs::read(index_path)?)?;

    let records = read_records(dir)?;
    if records.len() != index.total_nodes {
        return Err(StorageError::Corrupt(format!(
            "index promises {} nodes, found {}",
            index.total_nodes,
            records.len()
        )));
    }

    let tree = rebuild(records, &index)?;
    Ok((tree, index))
}

fn read_records(dir: &Path) -> StorageResult<Vec<NodeRecord>> {
    let binary_path = dir.join(BINARY_FILE);
    if binary_path.exists() {
        match bincode::deserialize::<Vec<NodeRecord>>(&fs::read(&binary_path)?) {
            Ok(records) => return Ok(records),
            Err(error) => {
                warn!(%error, "binary snapshot unreadable, falling back to JSON");
            }
        }
    }

    let json_path = dir.join(JSON_FILE);
    if !json_path.exists() {
        return Err(StorageError::Corrupt(
            "snapshot has neither a readable binary nor a JSON node file".to_string(),
        ));
    }
    Ok(serde_json::from_slice(&fs::read(json_path)?)?)
}

/// Rebuild the tree from records.
///
/// Children are reconstructed from parent ids: records appear in
/// level-then-cluster order and every cluster lists its members in
/// ascending input order, so appending each child to its parent in record
/// order restores the original child lists exactly.
fn rebuild(records: Vec<NodeRecord>, index: &IndexFile) -> StorageResult<Tree> {
    let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for record in &records {
        if let Some(parent) = &record.parent {
            children
                .entry(parent.clone())
                .or_default()
                .push(record.id.clone());
        }
    }

    let mut by_level: Vec<Vec<Node>> = Vec::new();
    for record in records {
        if record.embedding.len() != index.dimension {
            return Err(StorageError::Corrupt(format!(
                "node {} has dimension {}, index promises {}",
                record.id,
                record.embedding.len(),
                index.dimension
            )));
        }

        let node = Node {
            id: record.id.clone(),
            level: record.level,
            text: record.text,
            embedding: record.embedding,
            children: children.remove(&record.id).unwrap_or_default(),
            parent: record.parent,
            meta: record.meta,
        };

        while by_level.len() <= node.level {
            by_level.push(Vec::new());
        }
        by_level[node.level].push(node);
    }

    let counts: Vec<usize> = by_level.iter().map(Vec::len).collect();
    if counts != index.levels {
        return Err(StorageError::Corrupt(format!(
            "index promises level counts {:?}, found {:?}",
            index.levels, counts
        )));
    }

    let mut tree = Tree::new(index.dimension);
    for level in by_level {
        for node in level {
            tree.insert(node)?;
        }
    }
    Ok(tree)
}
