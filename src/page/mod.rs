//! Mark-based pagination
//!
//! Pagination uses the last-seen entry as an opaque cursor instead of a
//! numeric offset; wide rows have no stable row numbering.

mod errors;
mod mark_page;
mod request;

pub use errors::{PageError, PageResult};
pub use mark_page::MarkPage;
pub use request::{MarkPageRequest, Navigation};
