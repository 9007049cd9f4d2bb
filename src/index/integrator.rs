//! Set algebra over secondary index readers
//!
//! Stateless free functions: every call is independent and holds no state
//! between calls. Either the whole (page) result is returned or the call
//! fails; there is no partial result and no retry.
//!
//! # Intersection
//!
//! 1. `count()` every reader. Any zero count answers empty without reading.
//! 2. The reader with the smallest count (first one on ties) is the driver.
//! 3. The driver's entries are the candidates. Every other reader is probed
//!    with the same candidate list and only entries found in all of them
//!    survive, in driver order.
//!
//! The paginated variant walks the driver page by page from the caller's
//! mark until the requested size is filled or the driver is exhausted.

use std::collections::BTreeSet;

use crate::column::Column;
use crate::observability::{log_event, metrics, Event, ObservationScope};
use crate::page::{MarkPage, MarkPageRequest, Navigation};

use super::config::IntegratorConfig;
use super::errors::{IndexError, IndexResult};
use super::reader::SecondaryIndexReader;

/// Union of all readers: every entry once, ascending.
///
/// Reads every reader fully. There is no paginated union.
pub fn merge<R: SecondaryIndexReader>(readers: &[R]) -> IndexResult<Vec<R::Entry>> {
    let scope = ObservationScope::with_fields("MERGE", &[("readers", &readers.len().to_string())]);

    match merge_readers(readers) {
        Ok(entries) => {
            metrics().increment_merges();
            scope.complete_with_fields(&[("entries", &entries.len().to_string())]);
            Ok(entries)
        }
        Err(err) => {
            scope.fail(&err.to_string());
            Err(err)
        }
    }
}

/// Intersection of all readers, ascending, with the default config.
pub fn intersect<R: SecondaryIndexReader>(readers: &[R]) -> IndexResult<Vec<R::Entry>> {
    intersect_with(readers, &IntegratorConfig::default())
}

/// Intersection of all readers, ascending.
///
/// No readers yields an empty result.
pub fn intersect_with<R: SecondaryIndexReader>(
    readers: &[R],
    config: &IntegratorConfig,
) -> IndexResult<Vec<R::Entry>> {
    let scope =
        ObservationScope::with_fields("INTERSECT", &[("readers", &readers.len().to_string())]);

    match intersect_readers(readers, config) {
        Ok(entries) => {
            metrics().increment_intersections();
            scope.complete_with_fields(&[("entries", &entries.len().to_string())]);
            Ok(entries)
        }
        Err(err) => {
            scope.fail(&err.to_string());
            Err(err)
        }
    }
}

/// One page of the intersection of all readers, with the default config.
pub fn intersect_page<R: SecondaryIndexReader>(
    readers: &[R],
    request: &MarkPageRequest<R::Entry>,
) -> IndexResult<MarkPage<R::Entry>> {
    intersect_page_with(readers, request, &IntegratorConfig::default())
}

/// One page of the intersection of all readers.
///
/// The page holds at most `request.size()` entries strictly after (NEXT) or
/// strictly before (PREVIOUS) the mark, ascending in both directions.
/// Concatenating NEXT pages from a mark-less request until an empty page
/// reproduces [`intersect`]. A mark that is no longer in the driver index
/// positions the walk at the nearest following (NEXT) or preceding
/// (PREVIOUS) entry.
pub fn intersect_page_with<R: SecondaryIndexReader>(
    readers: &[R],
    request: &MarkPageRequest<R::Entry>,
    config: &IntegratorConfig,
) -> IndexResult<MarkPage<R::Entry>> {
    let scope = ObservationScope::with_fields(
        "INTERSECT_PAGE",
        &[
            ("navigation", request.navigation().as_str()),
            ("readers", &readers.len().to_string()),
            ("size", &request.size().to_string()),
        ],
    );

    match intersect_page_readers(readers, request, config) {
        Ok(page) => {
            metrics().increment_paged_intersections();
            scope.complete_with_fields(&[("entries", &page.len().to_string())]);
            Ok(page)
        }
        Err(err) => {
            scope.fail(&err.to_string());
            Err(err)
        }
    }
}

fn merge_readers<R: SecondaryIndexReader>(readers: &[R]) -> IndexResult<Vec<R::Entry>> {
    let mut entries = Vec::new();
    for (position, reader) in readers.iter().enumerate() {
        let columns = observe(reader.read(), position, "read")?;
        entries.extend(columns.into_iter().map(Column::into_name));
    }

    entries.sort();
    entries.dedup();
    Ok(entries)
}

fn intersect_readers<R: SecondaryIndexReader>(
    readers: &[R],
    config: &IntegratorConfig,
) -> IndexResult<Vec<R::Entry>> {
    config.validate()?;

    let counts = read_counts(readers)?;
    let Some(driver) = select_driver(&counts) else {
        short_circuit(&counts);
        return Ok(Vec::new());
    };

    let candidates: Vec<R::Entry> = observe(readers[driver].read(), driver, "read")?
        .into_iter()
        .map(Column::into_name)
        .collect();

    probe(readers, driver, candidates, config)
}

fn intersect_page_readers<R: SecondaryIndexReader>(
    readers: &[R],
    request: &MarkPageRequest<R::Entry>,
    config: &IntegratorConfig,
) -> IndexResult<MarkPage<R::Entry>> {
    config.validate()?;

    let counts = read_counts(readers)?;
    let Some(driver) = select_driver(&counts) else {
        short_circuit(&counts);
        return Ok(MarkPage::empty(request.clone()));
    };

    let size = request.size();
    let navigation = request.navigation();
    let mut driver_request = request.with_size(size.saturating_mul(config.driver_page_factor))?;
    // size is caller-chosen and may be huge; grow as survivors arrive
    let mut matched: Vec<R::Entry> = Vec::new();

    loop {
        let page = observe(
            readers[driver].read_page(&driver_request, None),
            driver,
            "read_page",
        )?;
        metrics().increment_driver_pages();
        log_event(
            Event::DriverPageRead,
            &[
                ("driver", &driver.to_string()),
                ("entries", &page.len().to_string()),
                ("navigation", navigation.as_str()),
            ],
        );

        if page.is_empty() {
            break;
        }

        let candidates: Vec<R::Entry> = page.into_data().into_iter().map(Column::into_name).collect();
        let boundary = match navigation {
            Navigation::Next => candidates.last().cloned(),
            Navigation::Previous => candidates.first().cloned(),
        };

        // A driver page that does not move past its mark would loop forever.
        if boundary.is_none() || boundary.as_ref() == driver_request.mark() {
            return Err(IndexError::storage(format!(
                "driver reader {} returned a page that does not advance past its mark",
                driver
            )));
        }

        let survivors = probe(readers, driver, candidates, config)?;
        match navigation {
            Navigation::Next => matched.extend(survivors),
            Navigation::Previous => matched.extend(survivors.into_iter().rev()),
        }

        if matched.len() >= size {
            break;
        }
        driver_request = driver_request.with_mark(boundary);
    }

    // Walking backward collects entries closest to the mark first.
    matched.truncate(size);
    if navigation == Navigation::Previous {
        matched.reverse();
    }

    Ok(MarkPage::new(request.clone(), matched))
}

fn read_counts<R: SecondaryIndexReader>(readers: &[R]) -> IndexResult<Vec<u64>> {
    readers
        .iter()
        .enumerate()
        .map(|(position, reader)| observe(reader.count(), position, "count"))
        .collect()
}

/// Smallest count wins, first one on ties. None when there is nothing to
/// intersect or some reader is empty.
fn select_driver(counts: &[u64]) -> Option<usize> {
    let mut driver: Option<usize> = None;
    for (position, &count) in counts.iter().enumerate() {
        if count == 0 {
            return None;
        }
        match driver {
            Some(current) if counts[current] <= count => {}
            _ => driver = Some(position),
        }
    }

    if let Some(position) = driver {
        log_event(
            Event::DriverSelected,
            &[
                ("count", &counts[position].to_string()),
                ("driver", &position.to_string()),
            ],
        );
    }
    driver
}

fn short_circuit(counts: &[u64]) {
    if let Some(position) = counts.iter().position(|count| *count == 0) {
        metrics().increment_short_circuits();
        log_event(Event::ShortCircuit, &[("reader", &position.to_string())]);
    }
}

/// Keeps the candidates present in every non-driver reader, in candidate
/// order. Each reader is probed with the full candidate list.
fn probe<R: SecondaryIndexReader>(
    readers: &[R],
    driver: usize,
    candidates: Vec<R::Entry>,
    config: &IntegratorConfig,
) -> IndexResult<Vec<R::Entry>> {
    let mut survivors = candidates.clone();

    for (position, reader) in readers.iter().enumerate() {
        if position == driver {
            continue;
        }

        let mut present = BTreeSet::new();
        for batch in candidates.chunks(config.probe_batch_size) {
            metrics().add_probes(1);
            let found = observe(reader.read_entries(batch), position, "read_entries")?;
            present.extend(found.into_iter().map(Column::into_name));
        }
        survivors.retain(|entry| present.contains(entry));
    }

    Ok(survivors)
}

/// Logs and counts reader failures, returning the result untouched.
fn observe<T>(result: IndexResult<T>, position: usize, operation: &str) -> IndexResult<T> {
    if let Err(err) = &result {
        if err.is_storage() {
            metrics().increment_storage_failures();
        }
        log_event(
            Event::ReadFailed,
            &[
                ("code", err.code()),
                ("operation", operation),
                ("reader", &position.to_string()),
                ("reason", &err.to_string()),
            ],
        );
    }
    result
}
