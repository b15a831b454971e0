//! Response filtering.
//!
//! Filter keys name either a question code, a derived geography level, or a
//! free-text address that resolves to a district. Filter values are scalar,
//! inclusive numeric ranges, or multi-select sets.
//!
//! Across keys the predicates are ANDed; within a set-valued key they are
//! ORed. Only one geographic dimension is active at a time.

pub mod predicates;
pub mod state;

pub use predicates::{effective_filters, filter_records, matches_all, matches_filter};
pub use state::FilterState;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::core::GeoLevel;

/// What a filter constrains.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FilterKey {
    /// A survey question code such as `AGE` or `GENDER`.
    Question(String),
    /// A derived geography field.
    Geo(GeoLevel),
    /// Free-text address, resolved to a district through the zip table.
    Address,
}

impl FilterKey {
    pub fn question(code: impl Into<String>) -> Self {
        Self::Question(code.into())
    }

    /// Geography keys are mutually exclusive with each other.
    pub fn is_geographic(&self) -> bool {
        matches!(self, Self::Geo(_) | Self::Address)
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Question(code) => f.write_str(code),
            Self::Geo(level) => f.write_str(level.as_str()),
            Self::Address => f.write_str("address"),
        }
    }
}

impl FromStr for FilterKey {
    type Err = String;

    /// Lowercase geography names and `address` are reserved; anything else
    /// is a question code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("filter key must not be empty".to_string());
        }
        Ok(match s {
            "address" => Self::Address,
            "district" => Self::Geo(GeoLevel::District),
            "region" => Self::Geo(GeoLevel::Region),
            "area" => Self::Geo(GeoLevel::Area),
            "neighborhood" => Self::Geo(GeoLevel::Neighborhood),
            code => Self::Question(code.to_string()),
        })
    }
}

impl TryFrom<String> for FilterKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FilterKey> for String {
    fn from(key: FilterKey) -> Self {
        key.to_string()
    }
}

impl From<GeoLevel> for FilterKey {
    fn from(level: GeoLevel) -> Self {
        Self::Geo(level)
    }
}

impl From<&str> for FilterKey {
    fn from(value: &str) -> Self {
        value
            .parse()
            .unwrap_or_else(|_| Self::Question(value.to_string()))
    }
}

/// Selected value(s) for one filter key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Scalar(String),
    Range { min: f64, max: f64 },
    Set(BTreeSet<String>),
}

impl FilterValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    pub fn range(min: f64, max: f64) -> Self {
        Self::Range { min, max }
    }

    pub fn set<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Set(
            values
                .into_iter()
                .map(|v| Into::<String>::into(v).trim().to_string())
                .filter(|v| !v.is_empty())
                .collect(),
        )
    }

    /// A value that selects nothing is equivalent to no filter at all.
    pub fn is_vacuous(&self) -> bool {
        match self {
            Self::Scalar(s) => s.trim().is_empty(),
            Self::Set(values) => values.is_empty(),
            Self::Range { .. } => false,
        }
    }

    /// Parse the command-line form: `18..34`, `1|2|3`, or a plain scalar.
    ///
    /// Either range bound may be omitted (`..34`, `65..`).
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if let Some((lo, hi)) = raw.split_once("..") {
            let min = parse_bound(lo, f64::NEG_INFINITY)?;
            let max = parse_bound(hi, f64::INFINITY)?;
            if min > max {
                return Err(format!("range '{raw}' has min greater than max"));
            }
            return Ok(Self::Range { min, max });
        }
        if raw.contains('|') {
            return Ok(Self::set(
                raw.split('|')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            ));
        }
        Ok(Self::Scalar(raw.to_string()))
    }
}

/// Parse a `KEY=VALUE` filter assignment.
pub fn parse_assignment(raw: &str) -> Result<(FilterKey, FilterValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("filter '{raw}' is not of the form KEY=VALUE"))?;
    Ok((key.parse()?, FilterValue::parse(value)?))
}

fn parse_bound(raw: &str, open: f64) -> Result<f64, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(open);
    }
    raw.parse::<f64>()
        .map_err(|_| format!("invalid range bound '{raw}'"))
}
