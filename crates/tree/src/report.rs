// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Build outcome summary.

use serde::{Deserialize, Serialize};

/// Diagnostics returned alongside a freshly built tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildReport {
    /// Node count per level, indexed by level.
    pub nodes_per_level: Vec<usize>,

    /// Warnings accumulated during the build (skipped chunks, fallback
    /// summaries).
    pub warnings: Vec<String>,

    /// Wall-clock build duration in milliseconds.
    pub elapsed_ms: u64,
}

impl BuildReport {
    /// Total number of nodes built.
    pub fn total_nodes(&self) -> usize {
        self.nodes_per_level.iter().sum()
    }

    /// Number of levels that contain nodes.
    pub fn depth(&self) -> usize {
        self.nodes_per_level.iter().filter(|&&n| n > 0).count()
    }
}
