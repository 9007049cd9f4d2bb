//! In-memory wide-row index storage
//!
//! Each index row is a sorted map of column name (the index entry) to an
//! optional value. A logical index spans several rows, one per shard key.
//!
//! - [`WideRowStore`]: shared map of row key -> sorted columns
//! - [`ShardedIndex`]: routes writes through a [`ShardStrategy`]
//! - [`WideRowReader`]: [`SecondaryIndexReader`] over a set of rows

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::ops::Bound;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::column::{Column, IndexEntry};
use crate::page::{MarkPage, MarkPageRequest, Navigation};
use crate::shard::{ShardKey, ShardStrategy};

use super::errors::{IndexError, IndexResult};
use super::reader::SecondaryIndexReader;

type Row<C, V> = BTreeMap<C, Option<V>>;

/// Thread-safe in-memory wide-row store. Clones share the same rows.
pub struct WideRowStore<C, V = ()> {
    rows: Arc<RwLock<BTreeMap<ShardKey, Row<C, V>>>>,
}

impl<C, V> Clone for WideRowStore<C, V> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<C: IndexEntry, V: Clone> Default for WideRowStore<C, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: IndexEntry, V: Clone> WideRowStore<C, V> {
    /// Creates an empty store
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Inserts or replaces a column in a row
    pub fn insert(&self, row: &str, column: Column<C, V>) -> IndexResult<()> {
        let (name, value) = column.into_parts();
        self.write()?
            .entry(row.to_string())
            .or_default()
            .insert(name, value);
        Ok(())
    }

    /// Removes a column. Returns true if it existed.
    ///
    /// A row left without columns is dropped.
    pub fn delete(&self, row: &str, entry: &C) -> IndexResult<bool> {
        let mut rows = self.write()?;
        let Some(columns) = rows.get_mut(row) else {
            return Ok(false);
        };

        let removed = columns.remove(entry).is_some();
        if columns.is_empty() {
            rows.remove(row);
        }
        Ok(removed)
    }

    /// Removes a whole row, returning how many columns it held
    pub fn clear_row(&self, row: &str) -> IndexResult<usize> {
        Ok(self.write()?.remove(row).map_or(0, |columns| columns.len()))
    }

    /// Number of columns in a row (0 for a missing row)
    pub fn row_count(&self, row: &str) -> IndexResult<usize> {
        Ok(self.read()?.get(row).map_or(0, |columns| columns.len()))
    }

    /// All row keys, ascending
    pub fn row_keys(&self) -> IndexResult<Vec<ShardKey>> {
        Ok(self.read()?.keys().cloned().collect())
    }

    /// Opens a reader over the given rows
    pub fn reader<I>(&self, rows: I) -> WideRowReader<C, V>
    where
        I: IntoIterator<Item = ShardKey>,
    {
        WideRowReader::new(self.clone(), rows)
    }

    fn read(&self) -> IndexResult<RwLockReadGuard<'_, BTreeMap<ShardKey, Row<C, V>>>> {
        self.rows
            .read()
            .map_err(|_| IndexError::storage("wide row store lock poisoned"))
    }

    fn write(&self) -> IndexResult<RwLockWriteGuard<'_, BTreeMap<ShardKey, Row<C, V>>>> {
        self.rows
            .write()
            .map_err(|_| IndexError::storage("wide row store lock poisoned"))
    }
}

/// One logical index whose entries are spread over shard rows.
///
/// `T` is the domain value the strategy shards on, `C` the entry type.
pub struct ShardedIndex<T: ?Sized, S, C, V = ()> {
    strategy: S,
    store: WideRowStore<C, V>,
    _value: PhantomData<fn(&T)>,
}

impl<T, S, C, V> ShardedIndex<T, S, C, V>
where
    T: ?Sized,
    S: ShardStrategy<T>,
    C: IndexEntry,
    V: Clone,
{
    /// Creates an index over `store` sharded by `strategy`
    pub fn new(strategy: S, store: WideRowStore<C, V>) -> Self {
        Self {
            strategy,
            store,
            _value: PhantomData,
        }
    }

    /// Returns the shard strategy
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Returns the backing store
    pub fn store(&self) -> &WideRowStore<C, V> {
        &self.store
    }

    /// Writes `column` to the shard of `value`, returning the shard key.
    pub fn insert(&self, value: &T, column: Column<C, V>) -> IndexResult<ShardKey> {
        let shard = self.strategy.shard(value)?;
        self.store.insert(&shard, column)?;
        Ok(shard)
    }

    /// Removes `entry` from the shard of `value`
    pub fn delete(&self, value: &T, entry: &C) -> IndexResult<bool> {
        let shard = self.strategy.shard(value)?;
        self.store.delete(&shard, entry)
    }

    /// Reader over the shards holding `values`
    pub fn reader<'v, I>(&self, values: I) -> IndexResult<WideRowReader<C, V>>
    where
        I: IntoIterator<Item = &'v T>,
        T: 'v,
    {
        let shards = values
            .into_iter()
            .map(|value| self.strategy.shard(value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.store.reader(shards))
    }

    /// Reader over explicit shard keys
    pub fn reader_for_shards<I>(&self, shards: I) -> WideRowReader<C, V>
    where
        I: IntoIterator<Item = ShardKey>,
    {
        self.store.reader(shards)
    }
}

/// Reads one index spread over several rows as a single sorted sequence.
///
/// An entry stored in more than one row is returned once; `count` sums row
/// sizes and may exceed the number of distinct entries in that case.
pub struct WideRowReader<C, V = ()> {
    store: WideRowStore<C, V>,
    rows: Vec<ShardKey>,
}

impl<C: IndexEntry, V: Clone> WideRowReader<C, V> {
    /// Creates a reader over `rows` of `store`
    pub fn new<I>(store: WideRowStore<C, V>, rows: I) -> Self
    where
        I: IntoIterator<Item = ShardKey>,
    {
        let mut rows: Vec<ShardKey> = rows.into_iter().collect();
        rows.sort();
        rows.dedup();
        Self { store, rows }
    }

    /// Row keys this reader covers
    pub fn rows(&self) -> &[ShardKey] {
        &self.rows
    }
}

impl<C: IndexEntry, V: Clone> SecondaryIndexReader for WideRowReader<C, V> {
    type Entry = C;
    type Value = V;

    fn count(&self) -> IndexResult<u64> {
        let rows = self.store.read()?;
        Ok(self
            .rows
            .iter()
            .filter_map(|key| rows.get(key))
            .map(|columns| columns.len() as u64)
            .sum())
    }

    fn read(&self) -> IndexResult<Vec<Column<C, V>>> {
        let rows = self.store.read()?;
        let mut merged: Row<C, V> = BTreeMap::new();
        for columns in self.rows.iter().filter_map(|key| rows.get(key)) {
            for (name, value) in columns {
                merged
                    .entry(name.clone())
                    .or_insert_with(|| value.clone());
            }
        }
        Ok(merged
            .into_iter()
            .map(|(name, value)| Column::new(name, value))
            .collect())
    }

    fn read_page(
        &self,
        request: &MarkPageRequest<C>,
        end: Option<&C>,
    ) -> IndexResult<MarkPage<Column<C, V>>> {
        let page_request = request.with_mark(request.mark().cloned().map(Column::name_only));
        let size = request.size();
        let navigation = request.navigation();

        let mark = request.mark().map_or(Bound::Unbounded, Bound::Excluded);
        let end = end.map_or(Bound::Unbounded, Bound::Included);
        let (lower, upper) = match navigation {
            Navigation::Next => (mark, end),
            Navigation::Previous => (end, mark),
        };
        if range_is_empty(lower, upper) {
            return Ok(MarkPage::empty(page_request));
        }

        let rows = self.store.read()?;
        let mut merged: Row<C, V> = BTreeMap::new();
        for columns in self.rows.iter().filter_map(|key| rows.get(key)) {
            let range = columns.range::<C, _>((lower, upper));
            let window: Vec<(&C, &Option<V>)> = match navigation {
                Navigation::Next => range.take(size).collect(),
                Navigation::Previous => range.rev().take(size).collect(),
            };
            for (name, value) in window {
                merged
                    .entry(name.clone())
                    .or_insert_with(|| value.clone());
            }
        }

        let mut data: Vec<Column<C, V>> = match navigation {
            Navigation::Next => merged
                .into_iter()
                .take(size)
                .map(|(name, value)| Column::new(name, value))
                .collect(),
            Navigation::Previous => merged
                .into_iter()
                .rev()
                .take(size)
                .map(|(name, value)| Column::new(name, value))
                .collect(),
        };
        if navigation == Navigation::Previous {
            data.reverse();
        }

        Ok(MarkPage::new(page_request, data))
    }

    fn read_entries(&self, candidates: &[C]) -> IndexResult<Vec<Column<C, V>>> {
        let rows = self.store.read()?;
        let shards: Vec<&Row<C, V>> = self.rows.iter().filter_map(|key| rows.get(key)).collect();

        Ok(candidates
            .iter()
            .filter_map(|candidate| {
                shards
                    .iter()
                    .find_map(|columns| columns.get(candidate))
                    .map(|value| Column::new(candidate.clone(), value.clone()))
            })
            .collect())
    }
}

/// BTreeMap::range panics on inverted bounds, so those are checked first.
fn range_is_empty<C: Ord>(lower: Bound<&C>, upper: Bound<&C>) -> bool {
    match (lower, upper) {
        (Bound::Included(l), Bound::Included(u)) => l > u,
        (Bound::Included(l), Bound::Excluded(u))
        | (Bound::Excluded(l), Bound::Included(u))
        | (Bound::Excluded(l), Bound::Excluded(u)) => l >= u,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shard::{HashShardStrategy, StringShardStrategy};

    fn store_with(rows: &[(&str, &[u32])]) -> WideRowStore<u32> {
        let store = WideRowStore::new();
        for (row, entries) in rows {
            for entry in entries.iter() {
                store.insert(row, Column::name_only(*entry)).unwrap();
            }
        }
        store
    }

    fn names(columns: Vec<Column<u32>>) -> Vec<u32> {
        columns.into_iter().map(Column::into_name).collect()
    }

    fn rows(keys: &[&str]) -> Vec<ShardKey> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_insert_delete_and_row_count() {
        let store = store_with(&[("a", &[3, 1, 2])]);
        assert_eq!(store.row_count("a").unwrap(), 3);

        assert!(store.delete("a", &2).unwrap());
        assert!(!store.delete("a", &2).unwrap());
        assert!(!store.delete("missing", &1).unwrap());
        assert_eq!(store.row_count("a").unwrap(), 2);

        assert_eq!(store.clear_row("a").unwrap(), 2);
        assert_eq!(store.row_count("a").unwrap(), 0);
        assert!(store.row_keys().unwrap().is_empty());
    }

    #[test]
    fn test_read_merges_rows() {
        let store = store_with(&[("a", &[1, 5, 9]), ("b", &[2, 5, 7])]);
        let reader = store.reader(rows(&["b", "a", "b"]));

        assert_eq!(reader.rows(), &["a".to_string(), "b".to_string()]);
        assert_eq!(reader.count().unwrap(), 6);
        assert_eq!(names(reader.read().unwrap()), vec![1, 2, 5, 7, 9]);
    }

    #[test]
    fn test_missing_rows_are_empty() {
        let store = store_with(&[("a", &[1])]);
        let reader = store.reader(rows(&["nope"]));
        assert_eq!(reader.count().unwrap(), 0);
        assert!(reader.read().unwrap().is_empty());
    }

    #[test]
    fn test_read_page_next_across_rows() {
        let store = store_with(&[("a", &[1, 4, 7, 10]), ("b", &[2, 5, 8])]);
        let reader = store.reader(rows(&["a", "b"]));

        let first = reader.read_page(&MarkPageRequest::first(3).unwrap(), None).unwrap();
        assert_eq!(names(first.into_data()), vec![1, 2, 4]);

        let request = MarkPageRequest::new(Some(4), Navigation::Next, 3).unwrap();
        let page = reader.read_page(&request, None).unwrap();
        assert_eq!(page.request().mark().map(|c| *c.name()), Some(4));
        assert_eq!(names(page.into_data()), vec![5, 7, 8]);
    }

    #[test]
    fn test_read_page_previous_is_ascending() {
        let store = store_with(&[("a", &[1, 4, 7, 10]), ("b", &[2, 5, 8])]);
        let reader = store.reader(rows(&["a", "b"]));

        let request = MarkPageRequest::new(Some(8), Navigation::Previous, 3).unwrap();
        assert_eq!(names(reader.read_page(&request, None).unwrap().into_data()), vec![4, 5, 7]);

        let last = MarkPageRequest::new(None, Navigation::Previous, 2).unwrap();
        assert_eq!(names(reader.read_page(&last, None).unwrap().into_data()), vec![8, 10]);
    }

    #[test]
    fn test_read_page_end_is_inclusive() {
        let store = store_with(&[("a", &[1, 2, 3, 4, 5, 6])]);
        let reader = store.reader(rows(&["a"]));

        let next = MarkPageRequest::new(Some(1), Navigation::Next, 10).unwrap();
        assert_eq!(names(reader.read_page(&next, Some(&4)).unwrap().into_data()), vec![2, 3, 4]);

        let previous = MarkPageRequest::new(Some(6), Navigation::Previous, 10).unwrap();
        assert_eq!(
            names(reader.read_page(&previous, Some(&4)).unwrap().into_data()),
            vec![4, 5]
        );

        // mark already past the end bound
        let inverted = MarkPageRequest::new(Some(5), Navigation::Next, 10).unwrap();
        assert!(reader.read_page(&inverted, Some(&3)).unwrap().is_empty());
    }

    #[test]
    fn test_stale_mark_is_positional() {
        let store = store_with(&[("a", &[10, 20, 30])]);
        let reader = store.reader(rows(&["a"]));

        let request = MarkPageRequest::new(Some(15), Navigation::Next, 5).unwrap();
        assert_eq!(names(reader.read_page(&request, None).unwrap().into_data()), vec![20, 30]);
    }

    #[test]
    fn test_read_entries_in_candidate_order() {
        let store = store_with(&[("a", &[1, 3]), ("b", &[5, 7])]);
        let reader = store.reader(rows(&["a", "b"]));
        assert_eq!(names(reader.read_entries(&[7, 2, 3, 9, 1]).unwrap()), vec![7, 3, 1]);
    }

    #[test]
    fn test_sharded_index_routes_by_strategy() {
        let store: WideRowStore<u32, String> = WideRowStore::new();
        let index: ShardedIndex<str, _, u32, String> =
            ShardedIndex::new(StringShardStrategy::with_prefix("name"), store.clone());

        let shard = index
            .insert("alice", Column::new(1, Some("alice".to_string())))
            .unwrap();
        assert_eq!(shard, "name_a");
        index.insert("Bob", Column::name_only(2)).unwrap();
        index.insert("42", Column::name_only(3)).unwrap();

        assert_eq!(store.row_keys().unwrap(), vec!["name_9", "name_a", "name_b"]);

        let reader = index.reader(["alice", "anne"]).unwrap();
        let columns = reader.read().unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].value().map(String::as_str), Some("alice"));

        assert!(index.delete("alice", &1).unwrap());
        assert_eq!(index.reader(["alice"]).unwrap().count().unwrap(), 0);
    }

    #[test]
    fn test_sharded_index_rejects_unshardable_value() {
        let index: ShardedIndex<str, _, u32> =
            ShardedIndex::new(StringShardStrategy::new(), WideRowStore::new());
        let err = index.insert("", Column::name_only(1)).unwrap_err();
        assert_eq!(err.code(), "WIDEROW_SHARD_EMPTY_VALUE");
    }

    #[test]
    fn test_reader_for_all_hash_shards() {
        let strategy = HashShardStrategy::<u64>::new("age", 4).unwrap();
        let shards = strategy.all_shards();
        let index: ShardedIndex<u64, _, u64> = ShardedIndex::new(strategy, WideRowStore::new());

        for value in 0..20u64 {
            index.insert(&value, Column::name_only(value)).unwrap();
        }

        let reader = index.reader_for_shards(shards);
        assert_eq!(reader.count().unwrap(), 20);
        let entries: Vec<u64> = reader.read().unwrap().into_iter().map(Column::into_name).collect();
        assert_eq!(entries, (0..20).collect::<Vec<_>>());
    }
}
