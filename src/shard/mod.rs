//! Shard strategies for index rows
//!
//! A logically single index is spread over several physical wide rows so no
//! single row becomes a hot spot. A strategy maps a domain value to the row
//! key (the shard key) that holds its entries. Shard keys only route reads and
//! writes; they play no part in entry ordering or equality.
//!
//! # Strategies
//!
//! - [`HashShardStrategy`]: `prefix_<|hash| mod n>`
//! - [`StringShardStrategy`]: first character, `9` for digits, `special` otherwise
//! - [`TimeShardStrategy`]: time buckets from SECONDLY to YEARLY

mod errors;
mod hash;
mod string;
mod time;

pub use errors::{ShardError, ShardResult};
pub use hash::HashShardStrategy;
pub use string::StringShardStrategy;
pub use time::{ShardSize, TimeShardStrategy};

/// Row key of one physical shard of an index
pub type ShardKey = String;

/// Maps a value to the shard that stores it.
pub trait ShardStrategy<T: ?Sized> {
    /// Returns the shard key for `value`.
    ///
    /// Fails on values the strategy cannot classify (e.g. empty strings).
    fn shard(&self, value: &T) -> ShardResult<ShardKey>;
}

impl<T: ?Sized, S: ShardStrategy<T> + ?Sized> ShardStrategy<T> for &S {
    fn shard(&self, value: &T) -> ShardResult<ShardKey> {
        (**self).shard(value)
    }
}
