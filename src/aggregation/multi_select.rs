//! "Select up to N" questions stored as one boolean sub-field per option.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

use super::{percentage, AggregationResult, CategoryCount};
use crate::core::ResponseRecord;

/// One option of a multi-select question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSelectOption {
    /// Boolean sub-field holding this option's tick
    pub field: String,
    pub label: String,
}

impl MultiSelectOption {
    pub fn new(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            label: label.into(),
        }
    }
}

/// Count option selections over respondents who ticked at least one option.
///
/// Every option percentage uses that respondent count as denominator, so
/// the percentages need not sum to 100.
///
/// # Examples
///
/// ```
/// use surveydash::aggregation::{count_multi_select, MultiSelectOption};
/// use surveydash::core::ResponseRecord;
///
/// let options = vec![
///     MultiSelectOption::new("Q5_A", "Parks"),
///     MultiSelectOption::new("Q5_B", "Transit"),
/// ];
/// let records = vec![
///     ResponseRecord::new("1").with_answer("Q5_A", true),
///     ResponseRecord::new("2").with_answer("Q5_B", true),
///     ResponseRecord::new("3"),
/// ];
///
/// let result = count_multi_select(&records, &options);
/// assert_eq!(result.total, 2);
/// assert_eq!(result.rows[0].percentage, 50.0);
/// ```
pub fn count_multi_select<R>(records: &[R], options: &[MultiSelectOption]) -> AggregationResult
where
    R: Borrow<ResponseRecord>,
{
    let mut counts = vec![0usize; options.len()];
    let mut respondents = 0usize;

    for record in records {
        let record = record.borrow();
        let mut any = false;
        for (idx, option) in options.iter().enumerate() {
            if record.answer(&option.field).is_some_and(|v| v.is_selected()) {
                counts[idx] += 1;
                any = true;
            }
        }
        if any {
            respondents += 1;
        }
    }

    let rows = options
        .iter()
        .zip(counts)
        .map(|(option, count)| CategoryCount {
            code: option.field.clone(),
            label: option.label.clone(),
            count,
            percentage: percentage(count, respondents),
        })
        .collect();

    AggregationResult {
        rows,
        total: respondents,
    }
}
