//! Time-bucketed sharding
//!
//! A timestamp is interpreted in the strategy's time zone and truncated to
//! the bucket granularity: `YYYYMMDDHHMMSS` for SECONDLY down to `YYYY` for
//! YEARLY. WEEKLY uses the Monday that starts the ISO week followed by a
//! literal `w`, so weekly rows never collide with daily ones in the same
//! column family.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{ShardError, ShardResult};
use super::{ShardKey, ShardStrategy};

/// Granularity of a time bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShardSize {
    /// One row per second
    Secondly,
    /// One row per minute
    Minutely,
    /// One row per hour
    Hourly,
    /// One row per day
    Daily,
    /// One row per ISO week
    Weekly,
    /// One row per month
    Monthly,
    /// One row per year
    Yearly,
}

impl ShardSize {
    /// All sizes, finest first
    pub const ALL: [ShardSize; 7] = [
        ShardSize::Secondly,
        ShardSize::Minutely,
        ShardSize::Hourly,
        ShardSize::Daily,
        ShardSize::Weekly,
        ShardSize::Monthly,
        ShardSize::Yearly,
    ];

    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ShardSize::Secondly => "SECONDLY",
            ShardSize::Minutely => "MINUTELY",
            ShardSize::Hourly => "HOURLY",
            ShardSize::Daily => "DAILY",
            ShardSize::Weekly => "WEEKLY",
            ShardSize::Monthly => "MONTHLY",
            ShardSize::Yearly => "YEARLY",
        }
    }

    /// Bucket label for `time` as seen in `time_zone`.
    pub fn suffix<Tz: TimeZone>(&self, time: &DateTime<Utc>, time_zone: &Tz) -> String {
        let local = time.with_timezone(time_zone);
        let (year, month, day) = (local.year(), local.month(), local.day());

        match self {
            ShardSize::Secondly => format!(
                "{:04}{:02}{:02}{:02}{:02}{:02}",
                year,
                month,
                day,
                local.hour(),
                local.minute(),
                local.second()
            ),
            ShardSize::Minutely => format!(
                "{:04}{:02}{:02}{:02}{:02}",
                year,
                month,
                day,
                local.hour(),
                local.minute()
            ),
            ShardSize::Hourly => {
                format!("{:04}{:02}{:02}{:02}", year, month, day, local.hour())
            }
            ShardSize::Daily => format!("{:04}{:02}{:02}", year, month, day),
            ShardSize::Weekly => {
                let date = local.date_naive();
                let monday =
                    date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
                format!(
                    "{:04}{:02}{:02}w",
                    monday.year(),
                    monday.month(),
                    monday.day()
                )
            }
            ShardSize::Monthly => format!("{:04}{:02}", year, month),
            ShardSize::Yearly => format!("{:04}", year),
        }
    }

    /// A step no longer than the shortest possible bucket, so walking a
    /// range with it never skips one.
    fn step(&self) -> Duration {
        match self {
            ShardSize::Secondly => Duration::seconds(1),
            ShardSize::Minutely => Duration::minutes(1),
            // half-hour DST shifts exist
            ShardSize::Hourly => Duration::minutes(30),
            ShardSize::Daily => Duration::hours(12),
            ShardSize::Weekly => Duration::days(6),
            ShardSize::Monthly => Duration::days(27),
            ShardSize::Yearly => Duration::days(364),
        }
    }
}

impl fmt::Display for ShardSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ShardSize {
    type Err = ShardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShardSize::ALL
            .iter()
            .copied()
            .find(|size| size.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ShardError::UnknownShardSize(s.to_string()))
    }
}

/// Shards timestamps into time buckets of a fixed size.
#[derive(Debug, Clone)]
pub struct TimeShardStrategy<Tz: TimeZone = Utc> {
    size: ShardSize,
    time_zone: Tz,
    prefix: Option<String>,
}

impl<Tz: TimeZone> TimeShardStrategy<Tz> {
    /// Creates a strategy without prefix.
    pub fn new(size: ShardSize, time_zone: Tz) -> Self {
        Self {
            size,
            time_zone,
            prefix: None,
        }
    }

    /// Creates a strategy with a row key prefix. An empty prefix means none.
    pub fn with_prefix(size: ShardSize, prefix: impl Into<String>, time_zone: Tz) -> Self {
        let prefix = prefix.into();
        Self {
            size,
            time_zone,
            prefix: if prefix.is_empty() { None } else { Some(prefix) },
        }
    }

    /// Returns the bucket size
    pub fn size(&self) -> ShardSize {
        self.size
    }

    /// Returns the time zone buckets are computed in
    pub fn time_zone(&self) -> &Tz {
        &self.time_zone
    }

    /// Returns the row key prefix, if any
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Shard keys covering `[start, end]`, ascending and without duplicates.
    pub fn shards_between(
        &self,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> ShardResult<Vec<ShardKey>> {
        if start > end {
            return Err(ShardError::InvalidRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }

        let step = self.size.step();
        let mut keys: Vec<ShardKey> = Vec::new();
        let mut cursor = *start;

        loop {
            let key = self.key_for(&cursor);
            if keys.last() != Some(&key) {
                keys.push(key);
            }

            if cursor >= *end {
                break;
            }

            cursor = cursor
                .checked_add_signed(step)
                .map_or(*end, |next| next.min(*end));
        }

        Ok(keys)
    }

    fn key_for(&self, time: &DateTime<Utc>) -> ShardKey {
        let bucket = self.size.suffix(time, &self.time_zone);
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, bucket),
            None => bucket,
        }
    }
}

impl<Tz: TimeZone> ShardStrategy<DateTime<Utc>> for TimeShardStrategy<Tz> {
    fn shard(&self, time: &DateTime<Utc>) -> ShardResult<ShardKey> {
        Ok(self.key_for(time))
    }
}
