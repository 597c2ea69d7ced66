//! Error types for ruletree core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("unknown operator token: {0}")]
    UnknownOperator(String),

    #[error("unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("unknown aggregator: {0}")]
    UnknownAggregator(String),

    #[error("invalid value for operator: {0}")]
    ValueCardinality(String),

    #[error("malformed condition document: {0}")]
    MalformedTree(String),

    #[error("condition tree exceeds maximum depth of {0}")]
    DepthExceeded(usize),
}

pub type Result<T> = std::result::Result<T, CoreError>;
