//! Hash-based sharding
//!
//! Spreads values over a fixed number of buckets: `prefix_<bucket>` where
//! `bucket = |hash(value)| mod partition_count`. The hash is a CRC32 over the
//! value's `Hash` stream, read as a signed 32-bit code, so results are stable
//! across processes on the same platform. Integers feed `Hash` in native byte
//! order and `usize` at pointer width, so buckets can differ between targets.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use super::errors::{ShardError, ShardResult};
use super::{ShardKey, ShardStrategy};

/// Shards values by hash code into `partition_count` rows.
pub struct HashShardStrategy<T: ?Sized> {
    prefix: String,
    partition_count: usize,
    _value: PhantomData<fn(&T)>,
}

impl<T: Hash + ?Sized> HashShardStrategy<T> {
    /// Creates a strategy.
    ///
    /// Fails if `prefix` is empty or `partition_count <= 1`.
    pub fn new(prefix: impl Into<String>, partition_count: usize) -> ShardResult<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(ShardError::EmptyPrefix);
        }

        if partition_count <= 1 {
            return Err(ShardError::InvalidPartitionCount(partition_count));
        }

        Ok(Self {
            prefix,
            partition_count,
            _value: PhantomData,
        })
    }

    /// Returns the row key prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the number of partitions
    pub fn partition_count(&self) -> usize {
        self.partition_count
    }

    /// Signed 32-bit hash code of a value
    pub fn hash_code(value: &T) -> i32 {
        let mut hasher = crc32fast::Hasher::new();
        value.hash(&mut hasher);
        hasher.finish() as u32 as i32
    }

    /// Bucket index in `0..partition_count`
    pub fn bucket(&self, value: &T) -> usize {
        // unsigned_abs keeps i32::MIN in range
        Self::hash_code(value).unsigned_abs() as usize % self.partition_count
    }

    /// Every shard key this strategy can produce, in bucket order.
    pub fn all_shards(&self) -> Vec<ShardKey> {
        (0..self.partition_count)
            .map(|bucket| self.key_for(bucket))
            .collect()
    }

    fn key_for(&self, bucket: usize) -> ShardKey {
        format!("{}_{}", self.prefix, bucket)
    }
}

impl<T: Hash + ?Sized> ShardStrategy<T> for HashShardStrategy<T> {
    fn shard(&self, value: &T) -> ShardResult<ShardKey> {
        Ok(self.key_for(self.bucket(value)))
    }
}

impl<T: ?Sized> Clone for HashShardStrategy<T> {
    fn clone(&self) -> Self {
        Self {
            prefix: self.prefix.clone(),
            partition_count: self.partition_count,
            _value: PhantomData,
        }
    }
}

impl<T: ?Sized> fmt::Debug for HashShardStrategy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashShardStrategy")
            .field("prefix", &self.prefix)
            .field("partition_count", &self.partition_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_rejects_empty_prefix() {
        let err = HashShardStrategy::<u64>::new("", 4).unwrap_err();
        assert_eq!(err, ShardError::EmptyPrefix);
    }

    #[test]
    fn test_construction_rejects_single_partition() {
        assert_eq!(
            HashShardStrategy::<u64>::new("users", 1).unwrap_err(),
            ShardError::InvalidPartitionCount(1)
        );
        assert_eq!(
            HashShardStrategy::<u64>::new("users", 0).unwrap_err(),
            ShardError::InvalidPartitionCount(0)
        );
    }

    #[test]
    fn test_shard_is_one_of_all_shards() {
        let strategy = HashShardStrategy::<str>::new("users", 8).unwrap();
        let all = strategy.all_shards();
        assert_eq!(all.len(), 8);
        assert_eq!(all[0], "users_0");
        assert_eq!(all[7], "users_7");

        for name in ["alice", "bob", "carol", "dave", "", "zed"] {
            let shard = strategy.shard(name).unwrap();
            assert!(all.contains(&shard), "{} not in {:?}", shard, all);
        }
    }

    #[test]
    fn test_shard_deterministic() {
        let strategy = HashShardStrategy::<i64>::new("events", 5).unwrap();
        let first = strategy.shard(&-123_456).unwrap();
        for _ in 0..50 {
            assert_eq!(strategy.shard(&-123_456).unwrap(), first);
        }
    }

    #[test]
    fn test_string_buckets_are_pinned() {
        // str hashes as its bytes plus 0xff on every target
        assert_eq!(HashShardStrategy::<str>::hash_code("alice"), 396_319_375);
        assert_eq!(HashShardStrategy::<str>::hash_code("bob"), -1_993_766_367);

        let strategy = HashShardStrategy::<str>::new("users", 8).unwrap();
        assert_eq!(strategy.shard("alice").unwrap(), "users_7");
        assert_eq!(strategy.shard("bob").unwrap(), "users_7");
        assert_eq!(strategy.shard("Palo Alto").unwrap(), "users_4");
    }

    #[test]
    fn test_negative_hash_codes_stay_in_range() {
        let strategy = HashShardStrategy::<u32>::new("p", 3).unwrap();
        let mut saw_negative = false;
        for value in 0u32..512 {
            if HashShardStrategy::<u32>::hash_code(&value) < 0 {
                saw_negative = true;
            }
            assert!(strategy.bucket(&value) < 3);
        }
        assert!(saw_negative);
    }
}
