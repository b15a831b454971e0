//! Single-field categorical counts.

use std::borrow::Borrow;
use std::collections::BTreeMap;

use super::{percentage, AggregationResult, CategoryCount};
use crate::core::ResponseRecord;
use crate::labels::{natural_cmp, Category, CategoryTable};

/// Count in-domain answers to `field` per category.
///
/// The denominator is the number of records holding an in-domain answer,
/// not the number of records. With an empty category table the domain is
/// open: every non-empty answer becomes its own category, labelled with
/// its raw code.
///
/// # Examples
///
/// ```
/// use surveydash::aggregation::count_categorical;
/// use surveydash::core::ResponseRecord;
/// use surveydash::labels::CategoryTable;
///
/// let records = vec![
///     ResponseRecord::new("1").with_answer("GENDER", "1"),
///     ResponseRecord::new("2").with_answer("GENDER", "1"),
///     ResponseRecord::new("3").with_answer("GENDER", "2"),
///     ResponseRecord::new("4").with_answer("GENDER", ""),
/// ];
/// let table = CategoryTable::from_pairs([("1", "Male"), ("2", "Female")]);
///
/// let result = count_categorical(&records, "GENDER", &table);
/// assert_eq!(result.total, 3);
/// assert_eq!(result.rows[0].count, 2);
/// ```
pub fn count_categorical<R>(records: &[R], field: &str, table: &CategoryTable) -> AggregationResult
where
    R: Borrow<ResponseRecord>,
{
    if table.is_empty() {
        return count_open_domain(records, field);
    }

    let mut counts = vec![0usize; table.len()];
    for record in records {
        if let Some(idx) = record
            .borrow()
            .code(field)
            .and_then(|code| table.position(&code))
        {
            counts[idx] += 1;
        }
    }

    build_result(table.iter().cloned().zip(counts))
}

fn count_open_domain<R>(records: &[R], field: &str) -> AggregationResult
where
    R: Borrow<ResponseRecord>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for code in records.iter().filter_map(|r| r.borrow().code(field)) {
        *counts.entry(code).or_default() += 1;
    }

    let mut pairs: Vec<(Category, usize)> = counts
        .into_iter()
        .map(|(code, count)| (Category::new(code.clone(), code), count))
        .collect();
    pairs.sort_by(|(a, _), (b, _)| natural_cmp(&a.code, &b.code));

    build_result(pairs)
}

pub(crate) fn build_result<I>(pairs: I) -> AggregationResult
where
    I: IntoIterator<Item = (Category, usize)>,
{
    let pairs: Vec<(Category, usize)> = pairs.into_iter().collect();
    let total: usize = pairs.iter().map(|(_, count)| count).sum();
    let rows = pairs
        .into_iter()
        .map(|(category, count)| CategoryCount {
            code: category.code,
            label: category.label,
            count,
            percentage: percentage(count, total),
        })
        .collect();
    AggregationResult { rows, total }
}
