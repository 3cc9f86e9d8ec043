//! Claim set carried in a client assertion payload.
//!
//! The claim set is kept as the raw JSON object so that additional claims
//! reach the identity resolver unmodified. Typed accessors cover the
//! registered claims used by the claim policy. The `sub` claim is redacted in
//! Debug output to prevent exposure of client identifiers in logs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Audience (`aud`) claim: a single string or an array of strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience<'a> {
    /// `"aud": "https://rp.example"`
    Single(&'a str),

    /// `"aud": ["https://rp.example", ...]`
    Multiple(Vec<&'a str>),
}

impl<'a> Audience<'a> {
    /// Iterate over every audience value.
    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        let (single, multiple) = match self {
            Audience::Single(aud) => (Some(*aud), None),
            Audience::Multiple(auds) => (None, Some(auds.iter().copied())),
        };
        single.into_iter().chain(multiple.into_iter().flatten())
    }

    /// Whether any audience value is contained in `expected`.
    #[must_use]
    pub fn intersects(&self, expected: &[String]) -> bool {
        self.iter().any(|aud| expected.iter().any(|e| e == aud))
    }
}

/// Claim set of a client assertion.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

/// Custom Debug implementation that redacts the `sub` claim.
impl fmt::Debug for ClaimSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.0 {
            if name == "sub" {
                map.entry(name, &"[REDACTED]");
            } else {
                map.entry(name, value);
            }
        }
        map.finish()
    }
}

impl ClaimSet {
    /// Wrap a decoded payload object.
    #[must_use]
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    /// Look up a claim by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Whether a claim is present with a non-null value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.get(name).is_some_and(|v| !v.is_null())
    }

    /// Issuer (`iss`) if it is a non-empty string.
    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.non_empty_str("iss")
    }

    /// Subject (`sub`) if it is a non-empty string.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.non_empty_str("sub")
    }

    /// Audience (`aud`) if it is a non-empty string or an array holding at
    /// least one non-empty string.
    #[must_use]
    pub fn audience(&self) -> Option<Audience<'_>> {
        match self.0.get("aud")? {
            Value::String(aud) if !aud.is_empty() => Some(Audience::Single(aud)),
            Value::Array(values) => {
                let auds: Vec<&str> = values
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|aud| !aud.is_empty())
                    .collect();
                (!auds.is_empty()).then_some(Audience::Multiple(auds))
            }
            _ => None,
        }
    }

    /// Expiration (`exp`) in Unix epoch seconds, if numeric and non-zero.
    ///
    /// An `exp` of exactly zero counts as absent. Other values, fractional
    /// ones included, are floored.
    #[must_use]
    pub fn expires_at(&self) -> Option<i64> {
        self.0
            .get("exp")
            .filter(|exp| exp.as_f64() != Some(0.0))
            .and_then(numeric_date)
    }

    /// Not-before (`nbf`) in Unix epoch seconds, if numeric.
    #[must_use]
    pub fn not_before(&self) -> Option<i64> {
        self.0.get("nbf").and_then(numeric_date)
    }

    /// All claims.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume the claim set, returning the underlying JSON object.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    fn non_empty_str(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(claims: Map<String, Value>) -> Self {
        Self::new(claims)
    }
}

/// JWT `NumericDate`: seconds since the epoch, possibly fractional.
///
/// Fractional values are floored; non-finite values are rejected.
// Float-to-int casts saturate; the value has already been floored
#[allow(clippy::cast_possible_truncation)]
fn numeric_date(value: &Value) -> Option<i64> {
    if let Some(secs) = value.as_i64() {
        return Some(secs);
    }
    value
        .as_f64()
        .filter(|secs| secs.is_finite())
        .map(|secs| secs.floor() as i64)
}
