// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Clustering for the CAIRN tree builder.
//!
//! The primary grouping is deterministic and metadata driven: each level
//! groups its input nodes by a fixed facet key tuple (sector+company+year,
//! then sector+company, then sector, then nothing at the root). Oversized
//! groups are subdivided by embedding similarity: a seeded random
//! projection followed by a Gaussian mixture whose component count is
//! selected by BIC.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod clusterer;
mod error;
mod gmm;
mod hierarchy;
mod reduce;

pub use clusterer::{ClusterConfig, Clusterer};
pub use error::{ClusterError, ClusterResult};
pub use hierarchy::{active_key_count, compare_keys, group_key};
pub use reduce::reduce_dimensions;
