// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! The level clusterer: metadata grouping first, embeddings second.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use cairn_core::{EngineConfig, MetadataKey, Node};

use crate::{
    error::{ClusterError, ClusterResult},
    gmm::select_components,
    hierarchy::{compare_keys, group_key},
    reduce::reduce_dimensions,
};

/// Configuration for the clusterer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Metadata groups larger than this are split by embedding similarity.
    pub max_cluster_size: usize,

    /// Sub-clusters smaller than this are absorbed into a neighbour.
    pub min_cluster_size: usize,

    /// Target dimensionality of the reduction step.
    pub reduction_dimension: usize,

    /// Cap on the component count searched by BIC.
    pub max_clusters: usize,

    /// Seed for the reduction step.
    pub random_state: u64,

    /// Maximum interior level of the tree.
    pub max_depth: usize,

    /// Facet dimensions defining the hierarchy, outermost first.
    pub metadata_keys: Vec<MetadataKey>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            max_cluster_size: 100,
            min_cluster_size: 5,
            reduction_dimension: 10,
            max_clusters: 5,
            random_state: 42,
            max_depth: 4,
            metadata_keys: MetadataKey::ALL_KEYS.to_vec(),
        }
    }
}

impl ClusterConfig {
    /// Derive the clusterer configuration from an engine configuration.
    pub fn from_engine(config: &EngineConfig) -> Self {
        Self {
            max_cluster_size: config.max_cluster_size,
            min_cluster_size: config.min_cluster_size,
            reduction_dimension: config.reduction_dimension,
            max_clusters: config.max_clusters,
            random_state: config.gaussian_random_state,
            max_depth: config.max_depth,
            metadata_keys: config.metadata_keys.clone(),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ClusterResult<()> {
        if self.max_cluster_size == 0 {
            return Err(ClusterError::InvalidConfig(
                "max_cluster_size must be greater than 0".to_string(),
            ));
        }
        if self.min_cluster_size == 0 {
            return Err(ClusterError::InvalidConfig(
                "min_cluster_size must be greater than 0".to_string(),
            ));
        }
        if self.max_clusters == 0 {
            return Err(ClusterError::InvalidConfig(
                "max_clusters must be greater than 0".to_string(),
            ));
        }
        if self.metadata_keys.is_empty() {
            return Err(ClusterError::InvalidConfig(
                "metadata_keys must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Groups sibling nodes into the clusters that become their parents.
#[derive(Debug, Clone)]
pub struct Clusterer {
    config: ClusterConfig,
}

impl Clusterer {
    /// Create a clusterer with default configuration.
    pub fn new() -> Self {
        Self {
            config: ClusterConfig::default(),
        }
    }

    /// Create a clusterer with custom configuration.
    pub fn with_config(config: ClusterConfig) -> ClusterResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active configuration.
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Cluster the nodes of level `level - 1` for building level `level`.
    ///
    /// Returns clusters as ordered lists of indices into `nodes`; every
    /// cluster lists its members in ascending input order, groups are
    /// sorted by their canonical key, and sub-clusters of an oversized
    /// group by decreasing size (ties to the smallest member index).
    pub fn cluster_level(&self, nodes: &[Node], level: usize) -> ClusterResult<Vec<Vec<usize>>> {
        if level == 0 || level > self.config.max_depth {
            return Err(ClusterError::InvalidLevel {
                level,
                max_depth: self.config.max_depth,
            });
        }
        if nodes.is_empty() {
            return Ok(Vec::new());
        }
        check_dimensions(nodes)?;

        // Primary grouping is deterministic, by facet key.
        let mut groups: HashMap<Vec<String>, Vec<usize>> = HashMap::new();
        for (index, node) in nodes.iter().enumerate() {
            let key = group_key(
                &node.meta.facets,
                &self.config.metadata_keys,
                level,
                self.config.max_depth,
            );
            groups.entry(key).or_default().push(index);
        }

        let mut ordered: Vec<(Vec<String>, Vec<usize>)> = groups.into_iter().collect();
        ordered.sort_by(|(a, _), (b, _)| compare_keys(a, b));

        let mut clusters = Vec::new();
        for (key, members) in ordered {
            if members.len() <= self.config.max_cluster_size {
                clusters.push(members);
            } else {
                debug!(
                    level,
                    group = ?key,
                    size = members.len(),
                    "subdividing oversized group"
                );
                clusters.extend(self.subdivide(nodes, &members));
            }
        }

        Ok(clusters)
    }

    /// Split one oversized group by embedding similarity.
    fn subdivide(&self, nodes: &[Node], members: &[usize]) -> Vec<Vec<usize>> {
        let embeddings: Vec<Vec<f32>> = members
            .iter()
            .map(|&i| nodes[i].embedding.clone())
            .collect();

        let reduced = reduce_dimensions(
            &embeddings,
            self.config.reduction_dimension,
            self.config.random_state,
        );
        let assignments = select_components(&reduced, self.config.max_clusters);

        // Bucket member positions per component; iteration order keeps the
        // members of each bucket ascending.
        let components = assignments.iter().copied().max().map_or(1, |m| m + 1);
        let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); components];
        for (position, &component) in assignments.iter().enumerate() {
            buckets[component].push(position);
        }
        buckets.retain(|bucket| !bucket.is_empty());

        self.absorb_small_buckets(&embeddings, &mut buckets);

        // Size-descending order, ties to the smallest member position.
        buckets.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));

        buckets
            .into_iter()
            .map(|bucket| bucket.into_iter().map(|pos| members[pos]).collect())
            .collect()
    }

    /// Merge buckets below the minimum size into their nearest surviving
    /// neighbour by centroid cosine distance.
    fn absorb_small_buckets(&self, embeddings: &[Vec<f32>], buckets: &mut Vec<Vec<usize>>) {
        while buckets.len() > 1 {
            let Some(small) = buckets
                .iter()
                .enumerate()
                .filter(|(_, b)| b.len() < self.config.min_cluster_size)
                .min_by_key(|(_, b)| b.len())
                .map(|(i, _)| i)
            else {
                break;
            };

            let small_centroid = centroid(embeddings, &buckets[small]);
            let nearest = buckets
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != small)
                .map(|(i, bucket)| {
                    let distance = 1.0 - cosine(&small_centroid, &centroid(embeddings, bucket));
                    (i, distance)
                })
                .min_by(|(_, a), (_, b)| a.total_cmp(b))
                .map(|(i, _)| i);

            let Some(target) = nearest else { break };
            let absorbed = buckets.remove(small);
            let target = if target > small { target - 1 } else { target };
            buckets[target].extend(absorbed);
            buckets[target].sort_unstable();
        }
    }
}

impl Default for Clusterer {
    fn default() -> Self {
        Self::new()
    }
}

fn check_dimensions(nodes: &[Node]) -> ClusterResult<()> {
    let expected = nodes[0].embedding.len();
    for node in nodes {
        if node.embedding.len() != expected {
            return Err(ClusterError::DimensionMismatch {
                expected,
                found: node.embedding.len(),
            });
        }
    }
    Ok(())
}

fn centroid(embeddings: &[Vec<f32>], members: &[usize]) -> Vec<f64> {
    let dim = embeddings[members[0]].len();
    let mut center = vec![0.0; dim];
    for &member in members {
        for (c, &v) in center.iter_mut().zip(embeddings[member].iter()) {
            *c += v as f64;
        }
    }
    for c in &mut center {
        *c /= members.len() as f64;
    }
    center
}

fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
