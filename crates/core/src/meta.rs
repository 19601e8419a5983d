// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Report facet metadata carried by every tree node.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sentinel for a facet value that could not be extracted.
pub const UNKNOWN: &str = "unknown";

/// Sentinel for a facet that has been aggregated across its dimension.
pub const ALL: &str = "all";

/// The facet dimensions recognised by the fixed hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataKey {
    /// Industry sector of the report.
    Sector,
    /// Issuing company.
    Company,
    /// Fiscal year of the report.
    Year,
}

impl MetadataKey {
    /// All recognised keys in hierarchy order.
    pub const ALL_KEYS: [MetadataKey; 3] = [Self::Sector, Self::Company, Self::Year];

    /// Get the name of this key.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sector => "sector",
            Self::Company => "company",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for MetadataKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sector" => Ok(Self::Sector),
            "company" => Ok(Self::Company),
            "year" => Ok(Self::Year),
            other => Err(format!("unknown metadata key: {}", other)),
        }
    }
}

/// The (sector, company, year) triple attached to every node.
///
/// Values are either concrete strings, [`UNKNOWN`] when extraction found
/// nothing, or [`ALL`] once the dimension has been aggregated away at an
/// upper tree level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Facets {
    /// Industry sector, e.g. "technology".
    pub sector: String,

    /// Company name as extracted from the document.
    pub company: String,

    /// Four-digit fiscal year as a string.
    pub year: String,
}

impl Facets {
    /// Create facets from concrete values.
    pub fn new(
        sector: impl Into<String>,
        company: impl Into<String>,
        year: impl Into<String>,
    ) -> Self {
        Self {
            sector: sector.into(),
            company: company.into(),
            year: year.into(),
        }
    }

    /// Facets with every dimension unknown.
    pub fn unknown() -> Self {
        Self::new(UNKNOWN, UNKNOWN, UNKNOWN)
    }

    /// Facets with every dimension aggregated.
    pub fn aggregated() -> Self {
        Self::new(ALL, ALL, ALL)
    }

    /// Get the value for a facet dimension.
    pub fn get(&self, key: MetadataKey) -> &str {
        match key {
            MetadataKey::Sector => &self.sector,
            MetadataKey::Company => &self.company,
            MetadataKey::Year => &self.year,
        }
    }

    /// Set the value for a facet dimension.
    pub fn set(&mut self, key: MetadataKey, value: impl Into<String>) {
        match key {
            MetadataKey::Sector => self.sector = value.into(),
            MetadataKey::Company => self.company = value.into(),
            MetadataKey::Year => self.year = value.into(),
        }
    }
}

impl Default for Facets {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Metadata attached to a tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMeta {
    /// Report facets, concrete at the leaves and progressively
    /// aggregated towards the root.
    pub facets: Facets,

    /// Number of direct children (0 for leaves).
    pub num_children: usize,

    /// Index of the cluster this node was built from, within its level.
    pub cluster_idx: Option<usize>,
}

impl NodeMeta {
    /// Metadata for a leaf node.
    pub fn leaf(facets: Facets) -> Self {
        Self {
            facets,
            num_children: 0,
            cluster_idx: None,
        }
    }

    /// Metadata for an interior node.
    pub fn interior(facets: Facets, num_children: usize, cluster_idx: usize) -> Self {
        Self {
            facets,
            num_children,
            cluster_idx: Some(cluster_idx),
        }
    }
}

impl Default for NodeMeta {
    fn default() -> Self {
        Self::leaf(Facets::unknown())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_key_round_trip() {
        for key in MetadataKey::ALL_KEYS {
            assert_eq!(key.name().parse::<MetadataKey>().unwrap(), key);
        }
        assert!("market_cap".parse::<MetadataKey>().is_err());
    }

    #[test]
    fn test_facets_get_set() {
        let mut facets = Facets::unknown();
        assert_eq!(facets.get(MetadataKey::Sector), UNKNOWN);

        facets.set(MetadataKey::Sector, "finance");
        facets.set(MetadataKey::Year, "2023");
        assert_eq!(facets.get(MetadataKey::Sector), "finance");
        assert_eq!(facets.get(MetadataKey::Year), "2023");
        assert_eq!(facets.get(MetadataKey::Company), UNKNOWN);
    }

    #[test]
    fn test_aggregated_facets() {
        let facets = Facets::aggregated();
        for key in MetadataKey::ALL_KEYS {
            assert_eq!(facets.get(key), ALL);
        }
    }

    #[test]
    fn test_node_meta_constructors() {
        let leaf = NodeMeta::leaf(Facets::new("energy", "Petro Corp", "2021"));
        assert_eq!(leaf.num_children, 0);
        assert_eq!(leaf.cluster_idx, None);

        let interior = NodeMeta::interior(Facets::aggregated(), 7, 2);
        assert_eq!(interior.num_children, 7);
        assert_eq!(interior.cluster_idx, Some(2));
    }
}
