// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Facet inheritance from children to their parent node.

use std::collections::HashMap;

use cairn_core::{Facets, MetadataKey, ALL, UNKNOWN};
use cairn_cluster::active_key_count;

/// Compute the parent facets for a cluster of children at `level`.
///
/// Keys still active at this level inherit the majority child value, with
/// `"unknown"` votes discarded and ties broken by first appearance in
/// child order. Squashed keys (and keys outside the configured hierarchy)
/// become `"all"`; a key with no valid votes stays `"unknown"`.
pub fn inherit_facets(
    children: &[&Facets],
    level: usize,
    max_depth: usize,
    keys: &[MetadataKey],
) -> Facets {
    let active = active_key_count(level, max_depth, keys.len());

    let mut facets = Facets::aggregated();
    for (position, key) in keys.iter().enumerate() {
        if position < active {
            let votes = children.iter().map(|f| f.get(*key));
            let value = majority_value(votes).unwrap_or_else(|| UNKNOWN.to_string());
            facets.set(*key, value);
        } else {
            facets.set(*key, ALL);
        }
    }
    facets
}

/// Most common value among `votes`, excluding the `"unknown"` sentinel.
///
/// Ties go to the value that appeared first.
pub fn majority_value<'a, I>(votes: I) -> Option<String>
where
    I: Iterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (order, vote) in votes.enumerate() {
        if vote == UNKNOWN || vote.is_empty() {
            continue;
        }
        let entry = counts.entry(vote).or_insert((0, order));
        entry.0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, _)| value.to_string())
}
