//! widerow - Secondary indexes for wide-column, sorted-row stores
//!
//! Shard strategies spread one logical index over several physical rows;
//! the integrator combines per-attribute indexes with union and
//! (paginated) intersection.

pub mod column;
pub mod index;
pub mod observability;
pub mod page;
pub mod shard;
