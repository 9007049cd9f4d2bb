//! Lexical sharding for string values
//!
//! The first character picks the row: letters map to their lower-case form,
//! digits collapse into `9`, everything else goes to `special`.

use super::errors::{ShardError, ShardResult};
use super::{ShardKey, ShardStrategy};

const DIGIT_SHARD: &str = "9";
const SPECIAL_SHARD: &str = "special";

/// Shards strings by their first character.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringShardStrategy {
    prefix: Option<String>,
}

impl StringShardStrategy {
    /// Creates a strategy without prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a strategy with a row key prefix. An empty prefix means none.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            prefix: if prefix.is_empty() { None } else { Some(prefix) },
        }
    }

    /// Returns the row key prefix, if any
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Every shard key this strategy can produce: `a`..`z`, `9`, `special`.
    pub fn all_shards(&self) -> Vec<ShardKey> {
        let letters = ('a'..='z').map(String::from);
        letters
            .chain([DIGIT_SHARD.to_string(), SPECIAL_SHARD.to_string()])
            .map(|suffix| self.key_for(&suffix))
            .collect()
    }

    fn suffix(first: char) -> String {
        let lower = first.to_ascii_lowercase();
        if lower.is_ascii_lowercase() {
            lower.to_string()
        } else if first.is_ascii_digit() {
            DIGIT_SHARD.to_string()
        } else {
            SPECIAL_SHARD.to_string()
        }
    }

    fn key_for(&self, suffix: &str) -> ShardKey {
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, suffix),
            None => suffix.to_string(),
        }
    }
}

impl ShardStrategy<str> for StringShardStrategy {
    fn shard(&self, value: &str) -> ShardResult<ShardKey> {
        let first = value.chars().next().ok_or(ShardError::EmptyValue)?;
        Ok(self.key_for(&Self::suffix(first)))
    }
}

impl ShardStrategy<String> for StringShardStrategy {
    fn shard(&self, value: &String) -> ShardResult<ShardKey> {
        ShardStrategy::<str>::shard(self, value.as_str())
    }
}
