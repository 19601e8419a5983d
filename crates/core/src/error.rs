// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

use std::fmt;

use crate::node::NodeId;

/// Core error type for CAIRN.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A node with this id already exists in the tree
    DuplicateNode(NodeId),

    /// Embedding dimension does not match the tree dimension
    DimensionMismatch {
        /// Dimension the tree was created with
        expected: usize,
        /// Dimension of the offending vector
        found: usize,
    },

    /// Node text is empty
    EmptyText(NodeId),

    /// Level outside the supported range
    InvalidLevel(usize),

    /// Referenced node does not exist
    NodeNotFound(NodeId),

    /// Invalid configuration value
    InvalidConfig(String),

    /// Configuration file could not be parsed
    ConfigParse(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateNode(id) => write!(f, "Node already exists: {}", id),
            Self::DimensionMismatch { expected, found } => {
                write!(f, "Embedding dimension mismatch: expected {}, got {}", expected, found)
            }
            Self::EmptyText(id) => write!(f, "Node has empty text: {}", id),
            Self::InvalidLevel(level) => write!(f, "Invalid tree level: {}", level),
            Self::NodeNotFound(id) => write!(f, "Node not found: {}", id),
            Self::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Self::ConfigParse(msg) => write!(f, "Failed to parse configuration: {}", msg),
        }
    }
}

impl std::error::Error for CoreError {}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
