use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{Result, SpandocError};

/// Microseconds since the Unix epoch. Instants before the epoch clamp to zero.
pub fn time_as_epoch_micros(ts: &DateTime<Utc>) -> u64 {
    u64::try_from(ts.timestamp_micros()).unwrap_or(0)
}

pub fn duration_as_micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

pub fn parse_duration_str(input: &str) -> Result<Duration> {
    humantime::parse_duration(input)
        .map_err(|e| SpandocError::Parse(format!("invalid duration {input}: {e}")))
}

/// Serde adapter rendering `Duration` in humantime form, e.g. `"1ms 500us"`.
pub mod human_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&humantime::format_duration(*value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_duration_str(&raw).map_err(serde::de::Error::custom)
    }
}
