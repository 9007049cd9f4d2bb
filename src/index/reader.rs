//! Secondary index reader capability
//!
//! One reader exposes the sorted entries of one (attribute, value) index,
//! possibly spread over several shard rows. Readers are supplied by the
//! storage layer; the integrator only consumes them.

use crate::column::{Column, IndexEntry};
use crate::page::{MarkPage, MarkPageRequest};

use super::errors::IndexResult;

/// Read access to one sorted secondary index.
///
/// Every sequence returned is ascending by entry and free of duplicates.
/// Failures are storage faults and are returned as-is to the caller of the
/// integrator.
pub trait SecondaryIndexReader {
    /// Index entry (column name) type
    type Entry: IndexEntry;
    /// Denormalized column value type, ignored by set algebra
    type Value;

    /// Total number of entries across all shards, without materializing them.
    fn count(&self) -> IndexResult<u64>;

    /// Every entry, ascending.
    fn read(&self) -> IndexResult<Vec<Column<Self::Entry, Self::Value>>>;

    /// At most `request.size()` entries strictly after (NEXT) or strictly
    /// before (PREVIOUS) the request's mark, or from the matching end of the
    /// index when there is no mark.
    ///
    /// `end` bounds the walk inclusively: NEXT stops after `end`, PREVIOUS
    /// stops before it, even when the page is not full. The page data is
    /// always ascending; for PREVIOUS it holds the entries closest to the mark.
    fn read_page(
        &self,
        request: &MarkPageRequest<Self::Entry>,
        end: Option<&Self::Entry>,
    ) -> IndexResult<MarkPage<Column<Self::Entry, Self::Value>>>;

    /// The entries among `candidates` that exist in this index, in candidate
    /// order.
    fn read_entries(
        &self,
        candidates: &[Self::Entry],
    ) -> IndexResult<Vec<Column<Self::Entry, Self::Value>>>;
}

impl<R: SecondaryIndexReader + ?Sized> SecondaryIndexReader for &R {
    type Entry = R::Entry;
    type Value = R::Value;

    fn count(&self) -> IndexResult<u64> {
        (**self).count()
    }

    fn read(&self) -> IndexResult<Vec<Column<Self::Entry, Self::Value>>> {
        (**self).read()
    }

    fn read_page(
        &self,
        request: &MarkPageRequest<Self::Entry>,
        end: Option<&Self::Entry>,
    ) -> IndexResult<MarkPage<Column<Self::Entry, Self::Value>>> {
        (**self).read_page(request, end)
    }

    fn read_entries(
        &self,
        candidates: &[Self::Entry],
    ) -> IndexResult<Vec<Column<Self::Entry, Self::Value>>> {
        (**self).read_entries(candidates)
    }
}

impl<R: SecondaryIndexReader + ?Sized> SecondaryIndexReader for Box<R> {
    type Entry = R::Entry;
    type Value = R::Value;

    fn count(&self) -> IndexResult<u64> {
        (**self).count()
    }

    fn read(&self) -> IndexResult<Vec<Column<Self::Entry, Self::Value>>> {
        (**self).read()
    }

    fn read_page(
        &self,
        request: &MarkPageRequest<Self::Entry>,
        end: Option<&Self::Entry>,
    ) -> IndexResult<MarkPage<Column<Self::Entry, Self::Value>>> {
        (**self).read_page(request, end)
    }

    fn read_entries(
        &self,
        candidates: &[Self::Entry],
    ) -> IndexResult<Vec<Column<Self::Entry, Self::Value>>> {
        (**self).read_entries(candidates)
    }
}
