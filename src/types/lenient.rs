//! Explicit boundary parsing for loosely typed JSON fields.
//!
//! Clients send integers either as numbers or as numeric strings and flags as
//! booleans, `"true"`/`"false"` or `1`/`0`. Anything else falls back to a default
//! instead of being coerced.

use serde::{de::Error, Deserialize, Deserializer};
use serde_json::Value;

use super::VerificationStatus;

pub fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Absent or unrecognised values are `false`.
pub fn parse_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => matches!(s.trim(), "true" | "1"),
        _ => false,
    }
}

/// Parses a query-string number, falling back to `default` when missing, malformed or below 1.
pub fn positive_or(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}

pub fn int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_int(&value).ok_or_else(|| D::Error::custom(format!("expected an integer, got {}", value)))
}

pub fn opt_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => parse_int(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected an integer, got {}", value))),
    }
}

pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(parse_flag(&Value::deserialize(deserializer)?))
}

pub fn opt_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => Ok(Some(parse_flag(&value))),
    }
}

/// Blank strings and `null` mean "not supplied".
pub fn opt_status<'de, D>(deserializer: D) -> Result<Option<VerificationStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => VerificationStatus::parse(s.trim())
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("unknown verification status {s}"))),
        other => Err(D::Error::custom(format!("expected a string, got {other}"))),
    }
}
