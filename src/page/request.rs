//! Mark-based page requests
//!
//! A mark is the boundary entry of the previous page. It is exclusive: the
//! requested page starts strictly after it (NEXT) or strictly before it
//! (PREVIOUS). A request without a mark starts at the beginning (NEXT) or the
//! end (PREVIOUS) of the sequence.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::errors::{PageError, PageResult};

/// Direction to walk from the mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Navigation {
    /// Entries after the mark
    Next,
    /// Entries before the mark
    Previous,
}

impl Navigation {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Navigation::Next => "NEXT",
            Navigation::Previous => "PREVIOUS",
        }
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request for a page of at most `size` elements relative to an optional mark.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkPageRequest<M> {
    mark: Option<M>,
    navigation: Navigation,
    #[serde(deserialize_with = "deserialize_page_size")]
    size: usize,
}

/// Applies the `new` size check to deserialized requests.
fn deserialize_page_size<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let size = usize::deserialize(deserializer)?;
    if size == 0 {
        return Err(serde::de::Error::custom(PageError::InvalidSize(size)));
    }
    Ok(size)
}

impl<M> MarkPageRequest<M> {
    /// Creates a request for the first page (no mark, NEXT).
    pub fn first(size: usize) -> PageResult<Self> {
        Self::new(None, Navigation::Next, size)
    }

    /// Creates a request.
    ///
    /// Fails if `size` is zero.
    pub fn new(mark: Option<M>, navigation: Navigation, size: usize) -> PageResult<Self> {
        if size == 0 {
            return Err(PageError::InvalidSize(size));
        }

        Ok(Self {
            mark,
            navigation,
            size,
        })
    }

    /// Returns the mark, if any
    pub fn mark(&self) -> Option<&M> {
        self.mark.as_ref()
    }

    /// Returns the navigation direction
    pub fn navigation(&self) -> Navigation {
        self.navigation
    }

    /// Returns the maximum page size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Same navigation and size, different mark.
    pub fn with_mark<T>(&self, mark: Option<T>) -> MarkPageRequest<T> {
        MarkPageRequest {
            mark,
            navigation: self.navigation,
            size: self.size,
        }
    }

    /// Same mark and navigation, different size.
    pub fn with_size(&self, size: usize) -> PageResult<Self>
    where
        M: Clone,
    {
        Self::new(self.mark.clone(), self.navigation, size)
    }

    /// Converts the mark keeping navigation and size.
    pub fn map_mark<T, F>(self, f: F) -> MarkPageRequest<T>
    where
        F: FnOnce(M) -> T,
    {
        MarkPageRequest {
            mark: self.mark.map(f),
            navigation: self.navigation,
            size: self.size,
        }
    }
}
