//! Field aggregation over filtered response records.
//!
//! Every chart summary is one of a few shapes:
//!
//! - **Categorical**: count in-domain answers per category of one question
//! - **Buckets**: count numeric answers per labelled inclusive range
//! - **Multi-select**: boolean sub-fields of one question, normalized over
//!   respondents who ticked at least one option
//! - **Priority**: first/second choice pairs with independent denominators
//! - **Geo cross-tab**: any of the above repeated per geography bucket, with
//!   top-3 ranking inside each bucket
//! - **Mean**: average of a numeric rating within its valid domain
//!
//! All functions are pure. Missing, empty, unparseable or out-of-domain
//! values are excluded from both numerators and denominators, and a zero
//! denominator yields a percentage of 0.

pub mod buckets;
pub mod categorical;
pub mod crosstab;
pub mod mean;
pub mod multi_select;
pub mod priority;

pub use buckets::{count_buckets, NumericBucket};
pub use categorical::count_categorical;
pub use crosstab::{assign_ranks, crosstab, BucketResult, CrosstabResult};
pub use mean::{mean_score, MeanResult};
pub use multi_select::{count_multi_select, MultiSelectOption};
pub use priority::{count_priority, PriorityResult, PriorityRow};

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Ordering;

use crate::core::{GeoLevel, ResponseRecord};
use crate::labels::{CategoryTable, StaticTables};

/// `count / total` as a percentage, 0 when `total` is 0.
///
/// # Examples
///
/// ```
/// use surveydash::aggregation::percentage;
///
/// assert!((percentage(2, 3) - 66.666).abs() < 0.01);
/// assert_eq!(percentage(5, 0), 0.0);
/// ```
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Round for display only; never feed the result back into a computation.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Consumer-selected ordering of result rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Category table order
    #[default]
    Table,
    Ascending,
    Descending,
}

/// One row of a categorical-style summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// Raw coded value (or sub-field name for multi-select options)
    pub code: String,
    pub label: String,
    pub count: usize,
    pub percentage: f64,
}

/// Ordered category counts plus the denominator they were computed with.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregationResult {
    pub rows: Vec<CategoryCount>,
    pub total: usize,
}

impl AggregationResult {
    /// No usable data: no rows, or every row counted zero.
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.count == 0)
    }

    /// Stable sort by count; ties keep table order.
    pub fn sorted(mut self, order: SortOrder) -> Self {
        match order {
            SortOrder::Table => {}
            SortOrder::Ascending => self.rows.sort_by(|a, b| a.count.cmp(&b.count)),
            SortOrder::Descending => self.rows.sort_by(|a, b| b.count.cmp(&a.count)),
        }
        self
    }

    pub fn row(&self, code: &str) -> Option<&CategoryCount> {
        self.rows.iter().find(|row| row.code == code)
    }
}

/// Typed result of any aggregation shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Aggregate {
    Categories(AggregationResult),
    Priority(PriorityResult),
    Crosstab(CrosstabResult),
    Mean(MeanResult),
}

impl Aggregate {
    /// True when there is nothing meaningful to plot.
    pub fn is_empty(&self) -> bool {
        match self {
            Aggregate::Categories(result) => result.is_empty(),
            Aggregate::Priority(result) => result.is_empty(),
            Aggregate::Crosstab(result) => result.is_empty(),
            Aggregate::Mean(result) => result.count == 0,
        }
    }

    /// `(code, score, valid sample)` per category, used for ranking.
    pub fn scores(&self) -> Vec<(String, f64, usize)> {
        match self {
            Aggregate::Categories(result) => result
                .rows
                .iter()
                .map(|row| (row.code.clone(), row.percentage, row.count))
                .collect(),
            Aggregate::Priority(result) => result
                .rows
                .iter()
                .map(|row| {
                    (
                        row.code.clone(),
                        row.combined_percentage,
                        row.first_count + row.second_count,
                    )
                })
                .collect(),
            Aggregate::Crosstab(_) | Aggregate::Mean(_) => Vec::new(),
        }
    }
}

/// Declarative description of how to summarize records.
///
/// Category tables left unset are taken from the label tables at
/// aggregation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AggregationShape {
    Categorical {
        field: String,
        #[serde(default)]
        categories: Option<CategoryTable>,
        #[serde(default)]
        sort: SortOrder,
    },
    Buckets {
        field: String,
        buckets: Vec<NumericBucket>,
        #[serde(default)]
        sort: SortOrder,
    },
    MultiSelect {
        options: Vec<MultiSelectOption>,
        #[serde(default)]
        sort: SortOrder,
    },
    Priority {
        first: String,
        second: String,
        #[serde(default)]
        categories: Option<CategoryTable>,
        #[serde(default)]
        sort: SortOrder,
    },
    GeoCrosstab {
        level: GeoLevel,
        #[serde(default)]
        buckets: Option<CategoryTable>,
        inner: Box<AggregationShape>,
    },
    Mean {
        field: String,
        min: f64,
        max: f64,
    },
}

impl AggregationShape {
    /// Structural checks performed when a dashboard definition is loaded.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            AggregationShape::Buckets { field, buckets, .. } => {
                if buckets.is_empty() {
                    return Err(format!("bucket aggregation on '{field}' has no buckets"));
                }
                if let Some(bad) = buckets.iter().find(|b| b.min > b.max) {
                    return Err(format!("bucket '{}' has min greater than max", bad.label));
                }
                Ok(())
            }
            AggregationShape::MultiSelect { options, .. } if options.is_empty() => {
                Err("multi-select aggregation has no options".to_string())
            }
            AggregationShape::Mean { field, min, max } if min > max => Err(format!(
                "mean aggregation on '{field}' has min greater than max"
            )),
            AggregationShape::GeoCrosstab { inner, .. } => match inner.as_ref() {
                AggregationShape::GeoCrosstab { .. } => {
                    Err("geo cross-tabs cannot be nested".to_string())
                }
                other => other.validate(),
            },
            _ => Ok(()),
        }
    }

    /// Question codes this shape reads.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            AggregationShape::Categorical { field, .. }
            | AggregationShape::Buckets { field, .. }
            | AggregationShape::Mean { field, .. } => vec![field.as_str()],
            AggregationShape::MultiSelect { options, .. } => {
                options.iter().map(|o| o.field.as_str()).collect()
            }
            AggregationShape::Priority { first, second, .. } => {
                vec![first.as_str(), second.as_str()]
            }
            AggregationShape::GeoCrosstab { inner, .. } => inner.fields(),
        }
    }
}

fn resolve_categories(
    explicit: &Option<CategoryTable>,
    field: &str,
    tables: &StaticTables,
) -> CategoryTable {
    explicit
        .clone()
        .unwrap_or_else(|| tables.labels.categories(field))
}

/// Run one aggregation shape over a record snapshot.
pub fn aggregate<R>(records: &[R], shape: &AggregationShape, tables: &StaticTables) -> Aggregate
where
    R: Borrow<ResponseRecord>,
{
    match shape {
        AggregationShape::Categorical {
            field,
            categories,
            sort,
        } => {
            let table = resolve_categories(categories, field, tables);
            Aggregate::Categories(count_categorical(records, field, &table).sorted(*sort))
        }
        AggregationShape::Buckets {
            field,
            buckets,
            sort,
        } => Aggregate::Categories(count_buckets(records, field, buckets).sorted(*sort)),
        AggregationShape::MultiSelect { options, sort } => {
            Aggregate::Categories(count_multi_select(records, options).sorted(*sort))
        }
        AggregationShape::Priority {
            first,
            second,
            categories,
            sort,
        } => {
            let table = resolve_categories(categories, first, tables);
            Aggregate::Priority(count_priority(records, first, second, &table).sorted(*sort))
        }
        AggregationShape::GeoCrosstab {
            level,
            buckets,
            inner,
        } => {
            let buckets = buckets
                .clone()
                .or_else(|| tables.geo.get(level).cloned())
                .unwrap_or_default();
            Aggregate::Crosstab(crosstab(records, *level, &buckets, |subset| {
                aggregate(subset, inner, tables)
            }))
        }
        AggregationShape::Mean { field, min, max } => {
            Aggregate::Mean(mean_score(records, field, *min, *max))
        }
    }
}

pub(crate) fn cmp_f64_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
