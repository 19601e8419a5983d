// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! The engine itself.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use cairn_chunking::{ChunkerConfig, DocumentChunker, DocumentRecord};
use cairn_core::{EngineConfig, TraversalMethod, Tree};
use cairn_providers::{
    Answerer, Embedder, EmbeddingClient, HashEmbedder, JoinSummarizer, EchoAnswerer, QaClient,
    RetryPolicy, Summarizer, SummaryClient,
};
use cairn_retrieval::{assemble_context, QueryResponse, Retriever};
use cairn_tree::{BuildReport, TreeBuilder};

use crate::error::{EngineError, EngineResult};

/// The providers an engine is constructed with.
///
/// One set is injected at construction and held for the engine's
/// lifetime; swapping providers mid-build is therefore impossible.
#[derive(Clone)]
pub struct ProviderSet {
    /// Embedding provider.
    pub embedder: Arc<dyn Embedder>,

    /// Summarization provider.
    pub summarizer: Arc<dyn Summarizer>,

    /// Question-answering provider.
    pub answerer: Arc<dyn Answerer>,
}

impl ProviderSet {
    /// Create a provider set.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        summarizer: Arc<dyn Summarizer>,
        answerer: Arc<dyn Answerer>,
    ) -> Self {
        Self {
            embedder,
            summarizer,
            answerer,
        }
    }

    /// Fully deterministic in-process providers.
    ///
    /// Useful for tests and offline smoke runs; no network is involved.
    pub fn deterministic(dimension: usize) -> Self {
        Self::new(
            Arc::new(HashEmbedder::new(dimension)),
            Arc::new(JoinSummarizer::new()),
            Arc::new(EchoAnswerer::new()),
        )
    }
}

/// Tree statistics reported by [`Engine::statistics`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Total number of nodes.
    pub total_nodes: usize,

    /// Number of populated levels.
    pub tree_depth: usize,

    /// Node count per level, indexed by level.
    pub nodes_per_level: Vec<usize>,

    /// Embedding dimension of the tree.
    pub dimension: usize,

    /// Distinct sector values per level, indexed by level.
    pub sectors_per_level: Vec<usize>,
}

/// The CAIRN engine: a thin facade over the core components.
///
/// The tree is published atomically at the end of a successful build;
/// concurrent queries observe either the previous tree or the new one,
/// never a partial build.
pub struct Engine {
    config: EngineConfig,
    chunker: DocumentChunker,
    embedding: EmbeddingClient,
    summaries: SummaryClient,
    qa: QaClient,
    retriever: Retriever,
    tree: RwLock<Option<Arc<Tree>>>,
    cancel: Arc<AtomicBool>,
}

impl Engine {
    /// Create an engine from configuration and providers.
    pub fn new(config: EngineConfig, providers: ProviderSet) -> EngineResult<Self> {
        config.validate()?;

        let chunker = DocumentChunker::with_config(ChunkerConfig::new(
            config.chunk_size,
            config.chunk_overlap,
        ))
        .map_err(|e| EngineError::Config(e.to_string()))?;

        let policy =
            RetryPolicy::with_timeout(Duration::from_secs(config.provider_timeout_seconds));

        Ok(Self {
            chunker,
            embedding: EmbeddingClient::new(providers.embedder, policy),
            summaries: SummaryClient::new(providers.summarizer, policy),
            qa: QaClient::new(providers.answerer, policy),
            retriever: Retriever::new(),
            tree: RwLock::new(None),
            cancel: Arc::new(AtomicBool::new(false)),
            config,
        })
    }

    /// An engine with default configuration and deterministic providers.
    pub fn deterministic(dimension: usize) -> EngineResult<Self> {
        Self::new(EngineConfig::default(), ProviderSet::deterministic(dimension))
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Chunk `documents` and build a fresh tree, replacing any existing one.
    ///
    /// Either the build succeeds and the new tree is published with a
    /// single assignment, or the previous tree (if any) stays in effect.
    pub async fn add_documents(
        &self,
        documents: &[DocumentRecord],
    ) -> EngineResult<BuildReport> {
        self.cancel.store(false, Ordering::SeqCst);

        let chunks = self.chunker.chunk_corpus(documents);
        info!(documents = documents.len(), chunks = chunks.len(), "corpus chunked");

        let builder = TreeBuilder::new(
            self.config.clone(),
            self.embedding.clone(),
            self.summaries.clone(),
        )?
        .with_cancel(self.cancel.clone());

        let (tree, report) = builder.build(&chunks).await?;

        *self.tree.write().await = Some(Arc::new(tree));
        Ok(report)
    }

    /// Request cancellation of a running build.
    pub fn cancel_build(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Answer a question over the built tree.
    pub async fn query(
        &self,
        question: &str,
        method: Option<TraversalMethod>,
        k: Option<usize>,
    ) -> EngineResult<QueryResponse> {
        if question.trim().is_empty() {
            return Err(EngineError::Config("question must not be empty".to_string()));
        }
        let k = k.unwrap_or(self.config.top_k);
        if k == 0 {
            return Err(EngineError::Config("k must be greater than 0".to_string()));
        }
        let method = method.unwrap_or(self.config.traversal_method);

        let tree = self.current_tree().await?;

        let query_embedding = self
            .embedding
            .embed("query", question)
            .await
            .map_err(|e| EngineError::QueryEmbedding(e.to_string()))?;

        let scored = self.retriever.retrieve(&tree, &query_embedding, k, method)?;
        let (context, previews) = assemble_context(&tree, &scored);

        let answer = match self.qa.answer(&context, question).await {
            Ok(answer) => answer,
            Err(error) => {
                warn!(%error, "qa provider failed, returning error marker");
                format!("[error] answer unavailable: {}", error)
            }
        };

        Ok(QueryResponse {
            question: question.to_string(),
            answer,
            context,
            retrieved_nodes: previews,
            retrieval_method: method,
        })
    }

    /// Persist the current tree into `dir`.
    pub async fn save(&self, dir: impl AsRef<Path>) -> EngineResult<()> {
        let tree = self.current_tree().await?;
        cairn_storage::save(&tree, &self.config, dir)?;
        Ok(())
    }

    /// Restore a tree from `dir` without calling any provider.
    pub async fn load(&self, dir: impl AsRef<Path>) -> EngineResult<()> {
        let (tree, index) = cairn_storage::load(dir)?;

        if index.dimension != self.embedding.dimension() {
            return Err(EngineError::Config(format!(
                "snapshot dimension {} does not match the embedder's {}",
                index.dimension,
                self.embedding.dimension()
            )));
        }

        *self.tree.write().await = Some(Arc::new(tree));
        Ok(())
    }

    /// Statistics about the current tree.
    pub async fn statistics(&self) -> EngineResult<EngineStats> {
        let tree = self.current_tree().await?;

        let sectors_per_level = (0..=tree.max_level())
            .map(|level| {
                tree.nodes_at_level(level)
                    .iter()
                    .map(|node| node.meta.facets.sector.as_str())
                    .collect::<HashSet<_>>()
                    .len()
            })
            .collect();

        Ok(EngineStats {
            total_nodes: tree.len(),
            tree_depth: tree.depth(),
            nodes_per_level: tree.nodes_per_level(),
            dimension: tree.dimension(),
            sectors_per_level,
        })
    }

    async fn current_tree(&self) -> EngineResult<Arc<Tree>> {
        self.tree
            .read()
            .await
            .clone()
            .ok_or(EngineError::TreeNotBuilt)
    }
}
