// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! The tree builder.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

use cairn_chunking::DocumentChunk;
use cairn_cluster::{ClusterConfig, Clusterer};
use cairn_core::{EngineConfig, Node, NodeId, NodeMeta, Tree};
use cairn_providers::{EmbeddingClient, SummaryClient};

use crate::{
    error::{BuildError, BuildResult},
    inherit::inherit_facets,
    report::BuildReport,
};

/// Builds the five-level summary tree from document chunks.
pub struct TreeBuilder {
    config: EngineConfig,
    clusterer: Clusterer,
    embedder: EmbeddingClient,
    summarizer: SummaryClient,
    cancel: Arc<AtomicBool>,
}

impl TreeBuilder {
    /// Create a builder from configuration and provider clients.
    pub fn new(
        config: EngineConfig,
        embedder: EmbeddingClient,
        summarizer: SummaryClient,
    ) -> BuildResult<Self> {
        config.validate()?;
        let clusterer = Clusterer::with_config(ClusterConfig::from_engine(&config))?;

        Ok(Self {
            config,
            clusterer,
            embedder,
            summarizer,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// A handle that cancels the running build when set.
    ///
    /// Cancellation is cooperative: it is observed at cluster boundaries,
    /// in-flight provider calls are allowed to finish, and the partial
    /// tree is discarded.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// Observe an externally owned cancel flag instead of the built-in one.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Build the tree for a corpus of chunks.
    ///
    /// Blank chunks are skipped with a warning; an entirely blank corpus
    /// aborts the build. Rebuilding the same corpus with the same
    /// providers yields identical ids, children and metadata.
    pub async fn build(&self, chunks: &[DocumentChunk]) -> BuildResult<(Tree, BuildReport)> {
        let started = Instant::now();
        let mut warnings = Vec::new();

        let mut usable = Vec::new();
        for chunk in chunks {
            if chunk.is_blank() {
                warnings.push(format!(
                    "skipped empty chunk {} of document {}",
                    chunk.chunk_index, chunk.doc_index
                ));
            } else {
                usable.push(chunk);
            }
        }
        if usable.is_empty() {
            return Err(BuildError::EmptyCorpus);
        }

        let leaves = self.embed_leaves(&usable).await?;
        info!(leaves = leaves.len(), "level 0 complete");

        let mut levels: Vec<Vec<Node>> = vec![leaves];
        for level in 1..=self.config.max_depth {
            let previous = levels.last().map(Vec::as_slice).unwrap_or(&[]);
            let clusters = self.clusterer.cluster_level(previous, level)?;

            let built = self.build_level(level, previous, clusters, &mut warnings).await?;
            debug!(level, nodes = built.len(), "level complete");

            let reached_root = built.len() == 1;
            levels.push(built);
            if reached_root {
                break;
            }
        }

        let tree = assemble(levels, self.embedder.dimension(), warnings)?;
        let report = BuildReport {
            nodes_per_level: tree.nodes_per_level(),
            warnings: tree.warnings().to_vec(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            total_nodes = tree.len(),
            depth = tree.depth(),
            elapsed_ms = report.elapsed_ms,
            "tree built"
        );
        Ok((tree, report))
    }

    /// Embed every usable chunk into a level-0 node.
    ///
    /// Requests are dispatched in chunk order under the bounded pool;
    /// `buffered` yields results in dispatch order, so the leaf list
    /// mirrors document-then-chunk order regardless of completion order.
    async fn embed_leaves(&self, chunks: &[&DocumentChunk]) -> BuildResult<Vec<Node>> {
        let jobs = chunks.iter().map(|chunk| {
            let id = NodeId::leaf(chunk.doc_index, chunk.chunk_index);
            let text = chunk.text.clone();
            let facets = chunk.facets.clone();
            let embedder = self.embedder.clone();
            let cancel = self.cancel.clone();

            async move {
                if cancel.load(Ordering::SeqCst) {
                    return Err(BuildError::Cancelled);
                }
                let embedding = embedder
                    .embed(id.as_str(), &text)
                    .await
                    .map_err(|source| BuildError::Embedding {
                        subject: id.to_string(),
                        source,
                    })?;
                Ok(Node::leaf(id, text, embedding, NodeMeta::leaf(facets)))
            }
        });

        stream::iter(jobs)
            .buffered(self.config.provider_parallelism)
            .try_collect()
            .await
    }

    /// Summarize and embed every cluster of `previous` into level nodes.
    async fn build_level(
        &self,
        level: usize,
        previous: &[Node],
        clusters: Vec<Vec<usize>>,
        warnings: &mut Vec<String>,
    ) -> BuildResult<Vec<Node>> {
        let jobs = clusters.into_iter().enumerate().map(|(cluster_idx, members)| {
            let id = NodeId::interior(level, cluster_idx);
            let texts: Vec<String> = members.iter().map(|&i| previous[i].text.clone()).collect();
            let children: Vec<NodeId> = members.iter().map(|&i| previous[i].id.clone()).collect();

            let child_facets: Vec<_> = members.iter().map(|&i| &previous[i].meta.facets).collect();
            let facets = inherit_facets(
                &child_facets,
                level,
                self.config.max_depth,
                &self.config.metadata_keys,
            );

            let summarizer = self.summarizer.clone();
            let embedder = self.embedder.clone();
            let cancel = self.cancel.clone();
            let budget = self.config.summarization_length;

            async move {
                if cancel.load(Ordering::SeqCst) {
                    return Err(BuildError::Cancelled);
                }

                let summary = summarizer
                    .summarize(id.as_str(), &texts, budget)
                    .await
                    .map_err(|source| BuildError::Summarization {
                        subject: id.to_string(),
                        source,
                    })?;

                let embedding = embedder
                    .embed(id.as_str(), &summary.text)
                    .await
                    .map_err(|source| BuildError::Embedding {
                        subject: id.to_string(),
                        source,
                    })?;

                let warning = summary
                    .used_fallback
                    .then(|| format!("extractive fallback summary for {}", id));

                let meta = NodeMeta::interior(facets, children.len(), cluster_idx);
                let node = Node::interior(id, level, summary.text, embedding, children, meta);
                Ok((node, warning))
            }
        });

        let results: Vec<(Node, Option<String>)> = stream::iter(jobs)
            .buffered(self.config.provider_parallelism)
            .try_collect()
            .await?;

        let mut nodes = Vec::with_capacity(results.len());
        for (node, warning) in results {
            if let Some(warning) = warning {
                warnings.push(warning);
            }
            nodes.push(node);
        }
        Ok(nodes)
    }
}

/// Move the per-level node lists into a tree and wire up parent links.
fn assemble(levels: Vec<Vec<Node>>, dimension: usize, warnings: Vec<String>) -> BuildResult<Tree> {
    let mut tree = Tree::new(dimension);
    for warning in warnings {
        tree.push_warning(warning);
    }

    let parent_links: Vec<(NodeId, NodeId)> = levels
        .iter()
        .skip(1)
        .flat_map(|level| {
            level.iter().flat_map(|node| {
                node.children
                    .iter()
                    .map(|child| (child.clone(), node.id.clone()))
            })
        })
        .collect();

    for level in levels {
        for node in level {
            tree.insert(node)?;
        }
    }
    for (child, parent) in parent_links {
        tree.set_parent(&child, parent)?;
    }

    Ok(tree)
}
