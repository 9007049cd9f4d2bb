//! Index error types
//!
//! Error codes:
//! - WIDEROW_INDEX_STORAGE (ERROR): a reader's count/read call failed
//! - WIDEROW_INDEX_INVALID_CONFIG (ERROR)
//! - WIDEROW_PAGE_* / WIDEROW_SHARD_*: precondition violations forwarded from
//!   the page and shard layers
//!
//! Storage faults are propagated unchanged. The integrator never retries and
//! never turns a failure into an empty result.

use thiserror::Error;

use crate::observability::Severity;
use crate::page::PageError;
use crate::shard::ShardError;

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Index errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("Storage fault: {0}")]
    Storage(String),

    #[error("Invalid integrator config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Page(#[from] PageError),

    #[error(transparent)]
    Shard(#[from] ShardError),
}

impl IndexError {
    /// Storage fault raised by a reader
    pub fn storage(reason: impl Into<String>) -> Self {
        IndexError::Storage(reason.into())
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            IndexError::Storage(_) => "WIDEROW_INDEX_STORAGE",
            IndexError::InvalidConfig(_) => "WIDEROW_INDEX_INVALID_CONFIG",
            IndexError::Page(err) => err.code(),
            IndexError::Shard(err) => err.code(),
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Error
    }

    /// True for persistence-kind failures coming from the store
    pub fn is_storage(&self) -> bool {
        matches!(self, IndexError::Storage(_))
    }
}
