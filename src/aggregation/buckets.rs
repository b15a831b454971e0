//! Numeric range bucketing (age bands, household size, ...).

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

use super::categorical::build_result;
use super::AggregationResult;
use crate::core::ResponseRecord;
use crate::labels::Category;

/// Labelled inclusive range `[min, max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericBucket {
    pub label: String,
    pub min: f64,
    pub max: f64,
}

impl NumericBucket {
    pub fn new(label: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            label: label.into(),
            min,
            max,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Count numeric answers per bucket; the first matching bucket wins.
///
/// Values that fail numeric coercion or fall outside every bucket are out
/// of domain and do not count toward the total.
pub fn count_buckets<R>(records: &[R], field: &str, buckets: &[NumericBucket]) -> AggregationResult
where
    R: Borrow<ResponseRecord>,
{
    let mut counts = vec![0usize; buckets.len()];
    for value in records.iter().filter_map(|r| r.borrow().number(field)) {
        if let Some(idx) = buckets.iter().position(|b| b.contains(value)) {
            counts[idx] += 1;
        }
    }

    build_result(
        buckets
            .iter()
            .map(|b| Category::new(b.label.clone(), b.label.clone()))
            .zip(counts),
    )
}
