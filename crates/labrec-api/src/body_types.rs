//! Lenient field deserializers for request bodies.
//!
//! Browser forms post numbers as strings and dates in whatever shape the
//! date picker produced. These helpers accept the common shapes and turn
//! anything else into a readable 400 instead of a serde type error.

use chrono::{DateTime, NaiveDate};
use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    Text(String),
}

fn parse_optional_i64(raw: Option<NumberOrString>) -> Result<Option<i64>, String> {
    match raw {
        None => Ok(None),
        Some(NumberOrString::Int(n)) => Ok(Some(n)),
        Some(NumberOrString::Float(f)) => {
            if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                Ok(Some(f as i64))
            } else {
                Err(format!("expected an integer, got {}", f))
            }
        }
        Some(NumberOrString::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<i64>()
                .map(Some)
                .map_err(|_| format!("expected an integer, got '{}'", s))
        }
    }
}

/// Optional integer given as a JSON number or a numeric string.
///
/// `null`, a missing field and `""` all mean absent. Pair with
/// `#[serde(default)]`.
pub fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrString>::deserialize(deserializer)?;
    parse_optional_i64(raw).map_err(de::Error::custom)
}

/// Same as [`deserialize_optional_i64`], narrowed to `i32`.
pub fn deserialize_optional_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrString>::deserialize(deserializer)?;
    match parse_optional_i64(raw).map_err(de::Error::custom)? {
        None => Ok(None),
        Some(n) => i32::try_from(n)
            .map(Some)
            .map_err(|_| de::Error::custom(format!("integer {} out of range", n))),
    }
}

/// Parse a calendar date from `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// For timestamps the date is taken in the timestamp's own offset, which is
/// what the client displayed.
pub fn parse_flexible_date(s: &str) -> Result<Option<NaiveDate>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Some(dt.date_naive()));
    }
    Err(format!(
        "invalid date '{}', expected YYYY-MM-DD (e.g. '2025-03-14')",
        s
    ))
}

/// Optional calendar date. `null`, a missing field and `""` mean absent.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) => parse_flexible_date(&s).map_err(de::Error::custom),
    }
}
