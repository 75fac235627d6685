//! Lenient deserializers for form fields that may arrive as either JSON
//! numbers or strings.

use serde::de::{self, Deserialize, Deserializer};
use serde_json::Value;

pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        other => return Err(de::Error::custom(format!("expected a number, found {other}"))),
    };
    value
        .filter(|v| v.is_finite())
        .ok_or_else(|| de::Error::custom("invalid number"))
}

pub fn integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = number(deserializer)?;
    if value.fract() != 0.0 || value.abs() >= i64::MAX as f64 {
        return Err(de::Error::custom(format!("expected an integer, found {value}")));
    }
    Ok(value as i64)
}

/// Accepts a string or a number; numbers are kept in their JSON spelling.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("expected a string, found {other}"))),
    }
}
