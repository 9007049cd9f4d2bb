//! Secondary index subsystem
//!
//! Combines independently maintained single-attribute indexes into one
//! sorted result:
//!
//! - [`merge`]: union of every reader, read fully
//! - [`intersect`]: intersection, read fully
//! - [`intersect_page`]: intersection one mark-based page at a time
//!
//! Readers come from the storage layer through the [`SecondaryIndexReader`]
//! capability. [`WideRowStore`] is the in-memory reference store.

mod config;
mod errors;
mod integrator;
mod reader;
mod wide_row;

pub use config::IntegratorConfig;
pub use errors::{IndexError, IndexResult};
pub use integrator::{intersect, intersect_page, intersect_page_with, intersect_with, merge};
pub use reader::SecondaryIndexReader;
pub use wide_row::{ShardedIndex, WideRowReader, WideRowStore};
