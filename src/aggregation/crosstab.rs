//! Geographic cross-tabulation with per-bucket ranking.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};

use super::Aggregate;
use crate::core::{GeoLevel, ResponseRecord};
use crate::labels::{natural_cmp, Category, CategoryTable};

/// Number of categories highlighted per bucket.
const RANKED_CATEGORIES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketResult {
    pub code: String,
    pub label: String,
    /// Records whose geography matched this bucket
    pub sample: usize,
    pub summary: Aggregate,
    /// Category code -> rank (1..=3) within this bucket
    pub ranks: BTreeMap<String, u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrosstabResult {
    pub level: GeoLevel,
    pub buckets: Vec<BucketResult>,
}

impl CrosstabResult {
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|b| b.summary.is_empty())
    }

    pub fn bucket(&self, code: &str) -> Option<&BucketResult> {
        self.buckets.iter().find(|b| b.code == code)
    }
}

/// Rank the top categories by score.
///
/// Only categories with a non-zero valid sample and a positive score are
/// eligible; ties keep input order.
pub fn assign_ranks(scores: &[(String, f64, usize)]) -> BTreeMap<String, u8> {
    let mut eligible: Vec<&(String, f64, usize)> = scores
        .iter()
        .filter(|(_, score, sample)| *sample > 0 && *score > 0.0)
        .collect();
    eligible.sort_by(|a, b| super::cmp_f64_desc(a.1, b.1));

    eligible
        .into_iter()
        .take(RANKED_CATEGORIES)
        .zip(1u8..)
        .map(|((code, _, _), rank)| (code.clone(), rank))
        .collect()
}

/// Run `summarize` once per geography bucket.
///
/// Each bucket sees only the records whose `level` code equals the bucket
/// code exactly (after trimming), so bucket `3` never picks up `30`. When
/// `buckets` is empty, buckets are discovered from the data.
pub fn crosstab<R, F>(
    records: &[R],
    level: GeoLevel,
    buckets: &CategoryTable,
    summarize: F,
) -> CrosstabResult
where
    R: Borrow<ResponseRecord>,
    F: Fn(&[&ResponseRecord]) -> Aggregate,
{
    let buckets = if buckets.is_empty() {
        discover_buckets(records, level)
    } else {
        buckets.clone()
    };

    let results = buckets
        .iter()
        .map(|bucket| {
            let subset: Vec<&ResponseRecord> = records
                .iter()
                .map(Borrow::borrow)
                .filter(|r| r.geo.get(level) == Some(bucket.code.trim()))
                .collect();
            let summary = summarize(&subset);
            let ranks = assign_ranks(&summary.scores());
            BucketResult {
                code: bucket.code.clone(),
                label: bucket.label.clone(),
                sample: subset.len(),
                summary,
                ranks,
            }
        })
        .collect();

    CrosstabResult {
        level,
        buckets: results,
    }
}

fn discover_buckets<R>(records: &[R], level: GeoLevel) -> CategoryTable
where
    R: Borrow<ResponseRecord>,
{
    let codes: BTreeSet<&str> = records
        .iter()
        .filter_map(|r| r.borrow().geo.get(level))
        .collect();
    let mut categories: Vec<Category> = codes
        .into_iter()
        .map(|code| Category::new(code, code))
        .collect();
    categories.sort_by(|a, b| natural_cmp(&a.code, &b.code));
    CategoryTable::new(categories)
}
