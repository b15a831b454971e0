//! Pure predicate functions for filtering response records.
//!
//! Each predicate takes a record and a filter and returns a boolean. Missing
//! or unparseable field values fail every predicate.

use std::borrow::Borrow;
use std::collections::BTreeMap;

use super::{FilterKey, FilterValue};
use crate::core::{GeoLevel, ResponseRecord};
use crate::labels::ZipDistrictTable;

/// Canonical string value of the field a filter key addresses.
fn field_code(record: &ResponseRecord, key: &FilterKey) -> Option<String> {
    match key {
        FilterKey::Question(code) => record.code(code),
        FilterKey::Geo(level) => record.geo.get(*level).map(str::to_string),
        // Addresses are rewritten to district filters before matching
        FilterKey::Address => None,
    }
}

fn field_number(record: &ResponseRecord, key: &FilterKey) -> Option<f64> {
    match key {
        FilterKey::Question(code) => record.number(code),
        FilterKey::Geo(level) => record
            .geo
            .get(*level)
            .and_then(|code| code.parse::<f64>().ok()),
        FilterKey::Address => None,
    }
}

/// Check a single filter against a record.
///
/// # Examples
///
/// ```
/// use surveydash::core::ResponseRecord;
/// use surveydash::filter::{matches_filter, FilterKey, FilterValue};
///
/// let record = ResponseRecord::new("r1").with_answer("AGE", "34");
/// let age = FilterKey::question("AGE");
///
/// assert!(matches_filter(&record, &age, &FilterValue::range(18.0, 34.0)));
/// assert!(!matches_filter(&record, &age, &FilterValue::range(35.0, 64.0)));
/// ```
pub fn matches_filter(record: &ResponseRecord, key: &FilterKey, value: &FilterValue) -> bool {
    match value {
        FilterValue::Range { min, max } => field_number(record, key)
            .is_some_and(|n| n >= *min && n <= *max),
        FilterValue::Set(allowed) => field_code(record, key)
            .is_some_and(|code| allowed.iter().any(|member| member.trim() == code)),
        FilterValue::Scalar(expected) => {
            field_code(record, key).is_some_and(|code| code == expected.trim())
        }
    }
}

/// Check every filter (logical AND).
pub fn matches_all(record: &ResponseRecord, filters: &[(FilterKey, FilterValue)]) -> bool {
    filters
        .iter()
        .all(|(key, value)| matches_filter(record, key, value))
}

/// Rewrite committed filters into directly matchable predicates.
///
/// Address filters become district filters when their zip resolves; an
/// unresolvable address adds no constraint at all. Vacuous values are
/// dropped.
pub fn effective_filters(
    active: &BTreeMap<FilterKey, FilterValue>,
    zips: &ZipDistrictTable,
) -> Vec<(FilterKey, FilterValue)> {
    active
        .iter()
        .filter(|(_, value)| !value.is_vacuous())
        .filter_map(|(key, value)| match (key, value) {
            (FilterKey::Address, FilterValue::Scalar(address)) => {
                match zips.district_for_address(address) {
                    Some(district) => Some((
                        FilterKey::Geo(GeoLevel::District),
                        FilterValue::scalar(district),
                    )),
                    None => {
                        log::debug!("No district for address '{}', ignoring filter", address);
                        None
                    }
                }
            }
            (FilterKey::Address, other) => {
                log::warn!("Address filter expects a single address, got {:?}", other);
                None
            }
            (key, value) => Some((key.clone(), value.clone())),
        })
        .collect()
}

/// Records that pass every active filter.
///
/// An empty filter map returns every record unchanged.
pub fn filter_records<'a, R>(
    records: &'a [R],
    active: &BTreeMap<FilterKey, FilterValue>,
    zips: &ZipDistrictTable,
) -> Vec<&'a ResponseRecord>
where
    R: Borrow<ResponseRecord>,
{
    let filters = effective_filters(active, zips);
    if filters.is_empty() {
        return records.iter().map(Borrow::borrow).collect();
    }

    let kept: Vec<&ResponseRecord> = records
        .iter()
        .map(Borrow::borrow)
        .filter(|record| matches_all(record, &filters))
        .collect();

    log::debug!(
        "Filtered {} records down to {} with {} predicate(s)",
        records.len(),
        kept.len(),
        filters.len()
    );
    kept
}
