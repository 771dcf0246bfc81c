use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpandocError};

/// 128-bit trace identifier split into two halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TraceId {
    pub high: u64,
    pub low: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SpanId(pub u64);

impl TraceId {
    pub fn new(high: u64, low: u64) -> Self {
        Self { high, low }
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; 16] = bytes.try_into().ok()?;
        let (high, low) = bytes.split_at(8);
        Some(Self {
            high: u64::from_be_bytes(high.try_into().ok()?),
            low: u64::from_be_bytes(low.try_into().ok()?),
        })
    }

    pub fn parse(input: &str) -> Result<Self> {
        if input.is_empty() || input.len() > 32 || !input.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(SpandocError::Parse(format!("invalid trace id: {input}")));
        }
        let split = input.len().saturating_sub(16);
        let (high, low) = input.split_at(split);
        let high = if high.is_empty() {
            0
        } else {
            parse_hex(high, "trace id")?
        };
        Ok(Self {
            high,
            low: parse_hex(low, "trace id")?,
        })
    }
}

impl SpanId {
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; 8] = bytes.try_into().ok()?;
        Some(Self(u64::from_be_bytes(bytes)))
    }

    pub fn parse(input: &str) -> Result<Self> {
        if input.is_empty() || input.len() > 16 || !input.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(SpandocError::Parse(format!("invalid span id: {input}")));
        }
        Ok(Self(parse_hex(input, "span id")?))
    }
}

fn parse_hex(input: &str, what: &str) -> Result<u64> {
    u64::from_str_radix(input, 16)
        .map_err(|e| SpandocError::Parse(format!("invalid {what} {input}: {e}")))
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.high == 0 {
            write!(f, "{:016x}", self.low)
        } else {
            write!(f, "{:016x}{:016x}", self.high, self.low)
        }
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for TraceId {
    type Err = SpandocError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl FromStr for SpanId {
    type Err = SpandocError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TraceId {
    type Error = SpandocError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl TryFrom<String> for SpanId {
    type Error = SpandocError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<TraceId> for String {
    fn from(value: TraceId) -> Self {
        value.to_string()
    }
}

impl From<SpanId> for String {
    fn from(value: SpanId) -> Self {
        value.to_string()
    }
}
