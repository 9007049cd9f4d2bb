//! Shard strategy error types
//!
//! Every variant is a precondition violation: raised synchronously, before
//! any read or write reaches the store.

use thiserror::Error;

/// Result type for shard strategy operations
pub type ShardResult<T> = Result<T, ShardError>;

/// Shard strategy errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShardError {
    #[error("Shard prefix cannot be empty")]
    EmptyPrefix,

    #[error("Invalid partition count: {0} (must be greater than 1)")]
    InvalidPartitionCount(usize),

    #[error("Shard value cannot be empty")]
    EmptyValue,

    #[error("Invalid shard range: start {start} is after end {end}")]
    InvalidRange { start: String, end: String },

    #[error("Unknown shard size: {0}")]
    UnknownShardSize(String),
}

impl ShardError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ShardError::EmptyPrefix => "WIDEROW_SHARD_EMPTY_PREFIX",
            ShardError::InvalidPartitionCount(_) => "WIDEROW_SHARD_INVALID_PARTITIONS",
            ShardError::EmptyValue => "WIDEROW_SHARD_EMPTY_VALUE",
            ShardError::InvalidRange { .. } => "WIDEROW_SHARD_INVALID_RANGE",
            ShardError::UnknownShardSize(_) => "WIDEROW_SHARD_UNKNOWN_SIZE",
        }
    }
}
