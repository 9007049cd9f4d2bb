//! Mark-based pages
//!
//! Page data is always ascending regardless of the navigation that produced
//! it. An empty page is the "no more results" signal.

use serde::{Deserialize, Serialize};

use super::request::{MarkPageRequest, Navigation};

/// A page of data produced for a [`MarkPageRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkPage<T> {
    request: MarkPageRequest<T>,
    data: Vec<T>,
}

impl<T> MarkPage<T> {
    /// Creates a page for the given request.
    pub fn new(request: MarkPageRequest<T>, data: Vec<T>) -> Self {
        Self { request, data }
    }

    /// Creates an empty page for the given request.
    pub fn empty(request: MarkPageRequest<T>) -> Self {
        Self::new(request, Vec::new())
    }

    /// Returns the request that produced this page
    pub fn request(&self) -> &MarkPageRequest<T> {
        &self.request
    }

    /// Returns the page data, ascending
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Consumes the page returning its data
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Returns true if the page carries no data
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of elements in the page
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Transforms every element (marks included).
    pub fn map<U, F>(self, mut f: F) -> MarkPage<U>
    where
        F: FnMut(T) -> U,
    {
        let request = self.request.map_mark(&mut f);
        let data = self.data.into_iter().map(f).collect();
        MarkPage { request, data }
    }
}

impl<T: Clone> MarkPage<T> {
    /// Request for the page following this one: last element as mark, NEXT.
    ///
    /// An empty page keeps the original mark.
    pub fn next_page_request(&self) -> MarkPageRequest<T> {
        let mark = match self.data.last() {
            Some(last) => Some(last.clone()),
            None => self.request.mark().cloned(),
        };
        self.derive(mark, Navigation::Next)
    }

    /// Request for the page preceding this one: first element as mark, PREVIOUS.
    ///
    /// An empty page keeps the original mark.
    pub fn previous_page_request(&self) -> MarkPageRequest<T> {
        let mark = match self.data.first() {
            Some(first) => Some(first.clone()),
            None => self.request.mark().cloned(),
        };
        self.derive(mark, Navigation::Previous)
    }

    fn derive(&self, mark: Option<T>, navigation: Navigation) -> MarkPageRequest<T> {
        // Size was validated when the original request was built.
        match MarkPageRequest::new(mark, navigation, self.request.size()) {
            Ok(request) => request,
            Err(_) => self.request.clone(),
        }
    }
}
