//! Mean score of a numeric rating question.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

use crate::core::ResponseRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanResult {
    pub mean: f64,
    /// Number of in-domain answers the mean was taken over
    pub count: usize,
    pub min: f64,
    pub max: f64,
}

/// Average of answers within `[min, max]`; 0 with `count == 0` when none.
pub fn mean_score<R>(records: &[R], field: &str, min: f64, max: f64) -> MeanResult
where
    R: Borrow<ResponseRecord>,
{
    let (sum, count) = records
        .iter()
        .filter_map(|r| r.borrow().number(field))
        .filter(|v| *v >= min && *v <= max)
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    MeanResult {
        mean: if count == 0 { 0.0 } else { sum / count as f64 },
        count,
        min,
        max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_ignores_out_of_domain() {
        let records = vec![
            ResponseRecord::new("a").with_answer("SAT", "4"),
            ResponseRecord::new("b").with_answer("SAT", 2.0),
            ResponseRecord::new("c").with_answer("SAT", "99"),
            ResponseRecord::new("d").with_answer("SAT", "n/a"),
        ];

        let result = mean_score(&records, "SAT", 1.0, 5.0);
        assert_eq!(result.count, 2);
        assert_eq!(result.mean, 3.0);
    }

    #[test]
    fn test_mean_of_nothing_is_zero() {
        let records: Vec<ResponseRecord> = Vec::new();
        let result = mean_score(&records, "SAT", 1.0, 5.0);
        assert_eq!(result.count, 0);
        assert_eq!(result.mean, 0.0);
    }
}
