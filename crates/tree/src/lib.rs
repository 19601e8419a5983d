// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Tree construction for the CAIRN engine.
//!
//! Orchestrates the build levels: embed the chunks into leaves, then for
//! each level cluster the previous level's nodes, summarize every cluster,
//! embed the summaries and create parent nodes with inherited facets.
//! Provider calls within a level run under a bounded work pool; levels
//! never interleave.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod builder;
mod error;
mod inherit;
mod report;

pub use builder::TreeBuilder;
pub use error::{BuildError, BuildResult};
pub use inherit::{inherit_facets, majority_value};
pub use report::BuildReport;
