//! Canonical course identifiers.
//!
//! Course ids reach the service as JSON integers (`123`), JSON floats
//! (`123.0`), and strings in either spelling (`"123"`, `"123.0"`). They are
//! canonicalized once at each boundary so every comparison and join uses the
//! same text: numeric-like ids get their decimal form with a one-place
//! fraction when integral (`"123.0"`), anything else is kept verbatim after
//! trimming.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::LazyLock;
use utoipa::ToSchema;

/// Plain decimal without exponent: sign, integer digits, optional fraction.
static PLAIN_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([+-]?)(\d+)(?:\.(\d*))?$").expect("valid regex"));

/// Canonical course identifier, the join key between the vector catalog and
/// the relational store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "4576420.0")]
pub struct CourseId(String);

impl CourseId {
    /// Canonicalize a textual identifier. Total; never fails.
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let Some(caps) = PLAIN_DECIMAL.captures(trimmed) {
            let fraction = caps.get(3).map_or("", |m| m.as_str());
            if fraction.bytes().all(|b| b == b'0') {
                // Integral: keep the digits as text so long ids keep precision.
                let sign = &caps[1];
                let digits = caps[2].trim_start_matches('0');
                return Self(match (sign, digits) {
                    (_, "") => "0.0".to_string(),
                    ("-", digits) => format!("-{}.0", digits),
                    (_, digits) => format!("{}.0", digits),
                });
            }
        }

        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Self::from_f64(value),
            _ => Self(trimmed.to_string()),
        }
    }

    pub fn from_i64(value: i64) -> Self {
        Self(format!("{}.0", value))
    }

    pub fn from_u64(value: u64) -> Self {
        Self(format!("{}.0", value))
    }

    /// Finite floats only; non-finite values fall back to their text form.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Self(value.to_string());
        }
        let value = if value == 0.0 { 0.0 } else { value };
        if value.fract() == 0.0 {
            Self(format!("{:.1}", value))
        } else {
            Self(format!("{}", value))
        }
    }

    /// Canonicalize a JSON scalar. `null`, booleans, arrays and objects have
    /// no identifier and yield `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::from_i64(i))
                } else if let Some(u) = n.as_u64() {
                    Some(Self::from_u64(u))
                } else {
                    n.as_f64().map(Self::from_f64)
                }
            }
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(Self::normalize(s)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Spellings under which the relational store may hold this id.
    ///
    /// `"123.0"` is also looked up as `"123"`; other ids only as themselves.
    pub fn storage_keys(&self) -> Vec<String> {
        match self.0.strip_suffix(".0") {
            Some(integer) if PLAIN_DECIMAL.is_match(integer) && !integer.contains('.') => {
                vec![self.0.clone(), integer.to_string()]
            }
            _ => vec![self.0.clone()],
        }
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CourseId {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}

/// Accepts a JSON number or a non-empty string.
impl<'de> Deserialize<'de> for CourseId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(&value).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "course id must be a number or a non-empty string, got {}",
                value
            ))
        })
    }
}
