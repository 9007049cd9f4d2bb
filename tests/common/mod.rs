//! Shared readers for integrator tests
//!
//! - `CountingReader`: fixed sorted entries, counts every call
//! - `FailingReader`: reports a count, fails every read

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use widerow::column::Column;
use widerow::index::{IndexError, IndexResult, SecondaryIndexReader};
use widerow::page::{MarkPage, MarkPageRequest, Navigation};

/// Reader over a fixed sorted vector
pub struct CountingReader {
    entries: Vec<u64>,
    counts: AtomicUsize,
    reads: AtomicUsize,
    page_reads: AtomicUsize,
    probes: AtomicUsize,
}

impl CountingReader {
    pub fn new(entries: impl IntoIterator<Item = u64>) -> Self {
        let mut entries: Vec<u64> = entries.into_iter().collect();
        entries.sort_unstable();
        entries.dedup();
        Self {
            entries,
            counts: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
            page_reads: AtomicUsize::new(0),
            probes: AtomicUsize::new(0),
        }
    }

    pub fn entries(&self) -> &[u64] {
        &self.entries
    }

    pub fn count_calls(&self) -> usize {
        self.counts.load(Ordering::SeqCst)
    }

    pub fn read_calls(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn page_reads(&self) -> usize {
        self.page_reads.load(Ordering::SeqCst)
    }

    pub fn probe_calls(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    /// Any call that materializes entries
    pub fn data_calls(&self) -> usize {
        self.read_calls() + self.page_reads() + self.probe_calls()
    }
}

fn columns(entries: impl IntoIterator<Item = u64>) -> Vec<Column<u64>> {
    entries.into_iter().map(Column::name_only).collect()
}

impl SecondaryIndexReader for CountingReader {
    type Entry = u64;
    type Value = ();

    fn count(&self) -> IndexResult<u64> {
        self.counts.fetch_add(1, Ordering::SeqCst);
        Ok(self.entries.len() as u64)
    }

    fn read(&self) -> IndexResult<Vec<Column<u64>>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(columns(self.entries.iter().copied()))
    }

    fn read_page(
        &self,
        request: &MarkPageRequest<u64>,
        end: Option<&u64>,
    ) -> IndexResult<MarkPage<Column<u64>>> {
        self.page_reads.fetch_add(1, Ordering::SeqCst);

        let mark = request.mark().copied();
        let end = end.copied();
        let data: Vec<u64> = match request.navigation() {
            Navigation::Next => self
                .entries
                .iter()
                .copied()
                .filter(|e| mark.map_or(true, |m| *e > m))
                .take_while(|e| end.map_or(true, |end| *e <= end))
                .take(request.size())
                .collect(),
            Navigation::Previous => {
                let mut data: Vec<u64> = self
                    .entries
                    .iter()
                    .rev()
                    .copied()
                    .filter(|e| mark.map_or(true, |m| *e < m))
                    .take_while(|e| end.map_or(true, |end| *e >= end))
                    .take(request.size())
                    .collect();
                data.reverse();
                data
            }
        };

        Ok(MarkPage::new(
            request.with_mark(mark.map(Column::name_only)),
            columns(data),
        ))
    }

    fn read_entries(&self, candidates: &[u64]) -> IndexResult<Vec<Column<u64>>> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        Ok(columns(
            candidates
                .iter()
                .copied()
                .filter(|c| self.entries.binary_search(c).is_ok()),
        ))
    }
}

/// Reader whose every data call fails with a storage fault
pub struct FailingReader {
    count: u64,
}

impl FailingReader {
    pub fn new(count: u64) -> Self {
        Self { count }
    }

    fn fault() -> IndexError {
        IndexError::storage("replica unavailable")
    }
}

impl SecondaryIndexReader for FailingReader {
    type Entry = u64;
    type Value = ();

    fn count(&self) -> IndexResult<u64> {
        Ok(self.count)
    }

    fn read(&self) -> IndexResult<Vec<Column<u64>>> {
        Err(Self::fault())
    }

    fn read_page(
        &self,
        _request: &MarkPageRequest<u64>,
        _end: Option<&u64>,
    ) -> IndexResult<MarkPage<Column<u64>>> {
        Err(Self::fault())
    }

    fn read_entries(&self, _candidates: &[u64]) -> IndexResult<Vec<Column<u64>>> {
        Err(Self::fault())
    }
}

pub type DynReader = Box<dyn SecondaryIndexReader<Entry = u64, Value = ()>>;

/// Walks NEXT pages from the start until an empty page
pub fn collect_forward<R: SecondaryIndexReader<Entry = u64>>(
    readers: &[R],
    size: usize,
) -> IndexResult<Vec<u64>> {
    let mut collected = Vec::new();
    let mut request = MarkPageRequest::first(size)?;
    loop {
        let page = widerow::index::intersect_page(readers, &request)?;
        if page.is_empty() {
            return Ok(collected);
        }
        request = page.next_page_request();
        collected.extend(page.into_data());
    }
}

/// Walks PREVIOUS pages from `mark` until an empty page, mark included
pub fn collect_backward<R: SecondaryIndexReader<Entry = u64>>(
    readers: &[R],
    mark: u64,
    size: usize,
) -> IndexResult<Vec<u64>> {
    let mut collected = vec![mark];
    let mut request = MarkPageRequest::new(Some(mark), Navigation::Previous, size)?;
    loop {
        let page = widerow::index::intersect_page(readers, &request)?;
        if page.is_empty() {
            return Ok(collected);
        }
        request = page.previous_page_request();
        collected.extend(page.into_data());
    }
}
