// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! The fixed metadata hierarchy and its group-key ordering.

use std::cmp::Ordering;

use cairn_core::{Facets, MetadataKey, ALL};

/// Number of facet keys that participate in the group key at `level`.
///
/// With the default three keys and depth 4 this is the 3/2/1/0 ladder:
/// level 1 groups by (sector, company, year), level 2 by (sector, company),
/// level 3 by (sector), and the top level forms a single group.
pub fn active_key_count(level: usize, max_depth: usize, total_keys: usize) -> usize {
    if level >= max_depth {
        0
    } else {
        total_keys.saturating_sub(level.saturating_sub(1))
    }
}

/// The group key for a node's facets at a target level.
pub fn group_key(
    facets: &Facets,
    keys: &[MetadataKey],
    level: usize,
    max_depth: usize,
) -> Vec<String> {
    let count = active_key_count(level, max_depth, keys.len());
    keys[..count]
        .iter()
        .map(|key| facets.get(*key).to_string())
        .collect()
}

/// Canonical ordering of group keys.
///
/// Element-wise lexicographic, except that the `"all"` sentinel sorts after
/// every concrete value.
pub fn compare_keys(a: &[String], b: &[String]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let ord = match (x == ALL, y == ALL) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => x.cmp(y),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}
