//! Two-stage priority questions (first choice / second choice).

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;

use super::{percentage, SortOrder};
use crate::core::ResponseRecord;
use crate::labels::{natural_cmp, Category, CategoryTable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityRow {
    pub code: String,
    pub label: String,
    pub first_count: usize,
    pub first_percentage: f64,
    pub second_count: usize,
    pub second_percentage: f64,
    /// `first_percentage + second_percentage`, each against its own total.
    ///
    /// This is a reporting convention, not a probability: the two terms
    /// have different denominators.
    pub combined_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriorityResult {
    pub rows: Vec<PriorityRow>,
    pub first_total: usize,
    pub second_total: usize,
}

impl PriorityResult {
    pub fn is_empty(&self) -> bool {
        self.rows
            .iter()
            .all(|row| row.first_count == 0 && row.second_count == 0)
    }

    /// Stable sort by combined percentage.
    pub fn sorted(mut self, order: SortOrder) -> Self {
        match order {
            SortOrder::Table => {}
            SortOrder::Ascending => self.rows.sort_by(|a, b| {
                a.combined_percentage
                    .partial_cmp(&b.combined_percentage)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            SortOrder::Descending => self.rows.sort_by(|a, b| {
                super::cmp_f64_desc(a.combined_percentage, b.combined_percentage)
            }),
        }
        self
    }

    pub fn row(&self, code: &str) -> Option<&PriorityRow> {
        self.rows.iter().find(|row| row.code == code)
    }
}

/// Aggregate a first/second choice pair.
///
/// First-choice percentages use the number of in-domain first choices as
/// denominator; second-choice percentages use the number of in-domain
/// second choices. The two totals never mix.
pub fn count_priority<R>(
    records: &[R],
    first: &str,
    second: &str,
    table: &CategoryTable,
) -> PriorityResult
where
    R: Borrow<ResponseRecord>,
{
    let table = if table.is_empty() {
        discover_categories(records, first, second)
    } else {
        table.clone()
    };

    let mut first_counts = vec![0usize; table.len()];
    let mut second_counts = vec![0usize; table.len()];

    for record in records {
        let record = record.borrow();
        if let Some(idx) = record.code(first).and_then(|c| table.position(&c)) {
            first_counts[idx] += 1;
        }
        if let Some(idx) = record.code(second).and_then(|c| table.position(&c)) {
            second_counts[idx] += 1;
        }
    }

    let first_total: usize = first_counts.iter().sum();
    let second_total: usize = second_counts.iter().sum();

    let rows = table
        .iter()
        .zip(first_counts.into_iter().zip(second_counts))
        .map(|(category, (first_count, second_count))| {
            let first_percentage = percentage(first_count, first_total);
            let second_percentage = percentage(second_count, second_total);
            PriorityRow {
                code: category.code.clone(),
                label: category.label.clone(),
                first_count,
                first_percentage,
                second_count,
                second_percentage,
                combined_percentage: first_percentage + second_percentage,
            }
        })
        .collect();

    PriorityResult {
        rows,
        first_total,
        second_total,
    }
}

fn discover_categories<R>(records: &[R], first: &str, second: &str) -> CategoryTable
where
    R: Borrow<ResponseRecord>,
{
    let codes: BTreeSet<String> = records
        .iter()
        .flat_map(|r| {
            let r = r.borrow();
            [r.code(first), r.code(second)]
        })
        .flatten()
        .collect();
    let mut categories: Vec<Category> = codes
        .into_iter()
        .map(|code| Category::new(code.clone(), code))
        .collect();
    categories.sort_by(|a, b| natural_cmp(&a.code, &b.code));
    CategoryTable::new(categories)
}
