//! Page error types
//!
//! Error codes:
//! - WIDEROW_PAGE_INVALID_SIZE (ERROR)

use thiserror::Error;

/// Result type for page construction
pub type PageResult<T> = Result<T, PageError>;

/// Page request errors. All are precondition violations raised before any I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("Invalid page size: {0} (must be greater than zero)")]
    InvalidSize(usize),
}

impl PageError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            PageError::InvalidSize(_) => "WIDEROW_PAGE_INVALID_SIZE",
        }
    }
}
