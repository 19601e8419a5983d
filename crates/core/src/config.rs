// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Engine configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult, MetadataKey};

/// Retrieval strategy over the summary tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalMethod {
    /// Top-down frontier descent from the root; mixes abstraction levels.
    #[default]
    Hierarchical,
    /// All levels compete in a single flat ranking.
    Flattened,
}

impl TraversalMethod {
    /// Get the name of this method.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hierarchical => "hierarchical",
            Self::Flattened => "flattened",
        }
    }
}

impl fmt::Display for TraversalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for TraversalMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hierarchical" => Ok(Self::Hierarchical),
            "flattened" => Ok(Self::Flattened),
            other => Err(CoreError::InvalidConfig(format!(
                "unknown traversal method: {}",
                other
            ))),
        }
    }
}

/// Configuration for the CAIRN engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Target chunk size in whitespace tokens.
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in tokens.
    pub chunk_overlap: usize,

    /// Maximum interior level of the tree.
    pub max_depth: usize,

    /// Metadata groups larger than this are split by embedding similarity.
    pub max_cluster_size: usize,

    /// Sub-clusters smaller than this are absorbed into a neighbour.
    pub min_cluster_size: usize,

    /// Target dimensionality for the reduction step before mixture fitting.
    pub reduction_dimension: usize,

    /// Cap on the number of mixture components searched by BIC.
    pub max_clusters: usize,

    /// Seed fixing the sub-clustering path.
    pub gaussian_random_state: u64,

    /// Token budget handed to the summarizer.
    pub summarization_length: usize,

    /// Default retrieval cap.
    pub top_k: usize,

    /// Default retrieval strategy.
    pub traversal_method: TraversalMethod,

    /// Maximum concurrent provider requests within one level.
    pub provider_parallelism: usize,

    /// Per provider call timeout in seconds.
    pub provider_timeout_seconds: u64,

    /// Facet dimensions defining the fixed hierarchy, outermost first.
    pub metadata_keys: Vec<MetadataKey>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 50,
            max_depth: 4,
            max_cluster_size: 100,
            min_cluster_size: 5,
            reduction_dimension: 10,
            max_clusters: 5,
            gaussian_random_state: 42,
            summarization_length: 200,
            top_k: 10,
            traversal_method: TraversalMethod::Hierarchical,
            provider_parallelism: 8,
            provider_timeout_seconds: 60,
            metadata_keys: MetadataKey::ALL_KEYS.to_vec(),
        }
    }
}

impl EngineConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chunk size.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Set the chunk overlap.
    pub fn with_chunk_overlap(mut self, overlap: usize) -> Self {
        self.chunk_overlap = overlap;
        self
    }

    /// Set the maximum tree depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the default retrieval cap.
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }

    /// Set the default traversal method.
    pub fn with_traversal_method(mut self, method: TraversalMethod) -> Self {
        self.traversal_method = method;
        self
    }

    /// Set the provider parallelism.
    pub fn with_provider_parallelism(mut self, n: usize) -> Self {
        self.provider_parallelism = n;
        self
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(source: &str) -> CoreResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| CoreError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> CoreResult<()> {
        if self.chunk_size == 0 {
            return Err(CoreError::InvalidConfig(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(CoreError::InvalidConfig(
                "chunk_overlap must be less than chunk_size".to_string(),
            ));
        }
        if self.max_depth == 0 || self.max_depth > 4 {
            return Err(CoreError::InvalidConfig(
                "max_depth must be between 1 and 4".to_string(),
            ));
        }
        if self.max_cluster_size == 0 {
            return Err(CoreError::InvalidConfig(
                "max_cluster_size must be greater than 0".to_string(),
            ));
        }
        if self.min_cluster_size == 0 {
            return Err(CoreError::InvalidConfig(
                "min_cluster_size must be greater than 0".to_string(),
            ));
        }
        if self.reduction_dimension == 0 {
            return Err(CoreError::InvalidConfig(
                "reduction_dimension must be greater than 0".to_string(),
            ));
        }
        if self.max_clusters == 0 {
            return Err(CoreError::InvalidConfig(
                "max_clusters must be greater than 0".to_string(),
            ));
        }
        if self.summarization_length == 0 {
            return Err(CoreError::InvalidConfig(
                "summarization_length must be greater than 0".to_string(),
            ));
        }
        if self.top_k == 0 {
            return Err(CoreError::InvalidConfig(
                "top_k must be greater than 0".to_string(),
            ));
        }
        if self.provider_parallelism == 0 {
            return Err(CoreError::InvalidConfig(
                "provider_parallelism must be greater than 0".to_string(),
            ));
        }
        if self.metadata_keys.is_empty() {
            return Err(CoreError::InvalidConfig(
                "metadata_keys must not be empty".to_string(),
            ));
        }
        for (i, key) in self.metadata_keys.iter().enumerate() {
            if self.metadata_keys[..i].contains(key) {
                return Err(CoreError::InvalidConfig(format!(
                    "duplicate metadata key: {}",
                    key
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_size, 512);
        assert_eq!(config.chunk_overlap, 50);
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.gaussian_random_state, 42);
        assert_eq!(config.metadata_keys.len(), 3);
    }

    #[test]
    fn test_invalid_overlap() {
        let config = EngineConfig::default()
            .with_chunk_size(50)
            .with_chunk_overlap(50);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_depth() {
        let config = EngineConfig::default().with_max_depth(5);
        assert!(config.validate().is_err());

        let config = EngineConfig::default().with_max_depth(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_traversal_method_parsing() {
        assert_eq!(
            "hierarchical".parse::<TraversalMethod>().unwrap(),
            TraversalMethod::Hierarchical
        );
        assert_eq!(
            "flattened".parse::<TraversalMethod>().unwrap(),
            TraversalMethod::Flattened
        );
        assert!("breadth_first".parse::<TraversalMethod>().is_err());
    }

    #[test]
    fn test_from_toml() {
        let config = EngineConfig::from_toml(
            r#"
            chunk_size = 256
            chunk_overlap = 25
            traversal_method = "flattened"
            metadata_keys = ["sector", "company", "year"]
            "#,
        )
        .unwrap();

        assert_eq!(config.chunk_size, 256);
        assert_eq!(config.traversal_method, TraversalMethod::Flattened);
        // Unspecified fields keep their defaults.
        assert_eq!(config.max_depth, 4);
    }

    #[test]
    fn test_from_toml_rejects_duplicate_keys() {
        let result = EngineConfig::from_toml(r#"metadata_keys = ["sector", "sector"]"#);
        assert!(result.is_err());
    }
}
