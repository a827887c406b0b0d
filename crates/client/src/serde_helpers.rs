//! Serde helpers for loosely typed numeric fields.
//!
//! Responsibilities:
//! - Provide deserializers that accept either JSON numbers or numeric strings.
//! - Keep parsing behavior centralized so model definitions stay readable and consistent.
//!
//! Explicitly does NOT handle:
//! - Validating higher-level semantics (ranges, required/optional business rules).
//!
//! Invariants / assumptions:
//! - Export backends may report counters as `"123"` strings or as `123` numbers.
//! - `null` is accepted wherever the field itself is optional or defaulted.

use serde::Deserialize;
use serde::de::Error as _;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum U64OrString {
    U64(u64),
    I64(i64),
    F64(f64),
    String(String),
}

fn to_u64<E: serde::de::Error>(value: U64OrString) -> Result<u64, E> {
    match value {
        U64OrString::U64(v) => Ok(v),
        U64OrString::I64(v) => u64::try_from(v).map_err(E::custom),
        U64OrString::F64(v) if v.is_finite() && v >= 0.0 => Ok(v.trunc() as u64),
        U64OrString::F64(v) => Err(E::custom(format!("invalid unsigned number: {}", v))),
        U64OrString::String(s) => s.trim().parse::<u64>().map_err(E::custom),
    }
}

/// Deserialize a `u32`, treating `null` as zero.
pub fn u32_from_string_or_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<U64OrString>::deserialize(deserializer)? {
        None => Ok(0),
        Some(value) => u32::try_from(to_u64::<D::Error>(value)?).map_err(D::Error::custom),
    }
}

/// Deserialize an optional `u64`.
pub fn opt_u64_from_string_or_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<U64OrString>::deserialize(deserializer)?
        .map(to_u64::<D::Error>)
        .transpose()
}
