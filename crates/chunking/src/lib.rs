// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Document chunking for the CAIRN engine.
//!
//! Splits report text into overlapping, sentence-aligned token windows and
//! attaches per-document facet metadata (sector, company, year) extracted
//! with static lexicons and regular expressions.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod extract;
mod record;
mod splitter;

pub use error::{ChunkingError, ChunkingResult};
pub use extract::extract_facets;
pub use record::{DocumentChunk, DocumentRecord};
pub use splitter::{split_sentence_bounded, ChunkerConfig, DocumentChunker};
