//! In-memory data source, optionally loaded from a JSON file.

use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use super::{OrderBy, ResponsePage, ResponseSource, SourceFilter, SourceQuery, VARIANT_FIELD};
use crate::core::{GeoLevel, ResponseRecord};
use crate::errors::{Error, Result};
use crate::labels::natural_cmp;

/// Serves pages out of a record snapshot.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<ResponseRecord>,
}

impl InMemorySource {
    pub fn new(records: Vec<ResponseRecord>) -> Self {
        Self { records }
    }

    /// Load a JSON array of records.
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| Error::Query {
            message: format!("cannot read {}: {e}", path.display()),
            retryable: e.kind() != std::io::ErrorKind::NotFound,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let records: Vec<ResponseRecord> = serde_json::from_str(contents).map_err(|e| Error::Query {
            message: format!("malformed response data: {e}"),
            retryable: false,
        })?;
        log::info!("Loaded {} response records", records.len());
        Ok(Self::new(records))
    }

    pub fn records(&self) -> &[ResponseRecord] {
        &self.records
    }
}

fn field_code(record: &ResponseRecord, field: &str) -> Option<String> {
    if field == VARIANT_FIELD {
        return record.instrument.map(|v| v.as_str().to_string());
    }
    match GeoLevel::parse(field) {
        Some(level) if field == level.as_str() => record.geo.get(level).map(str::to_string),
        _ => record.code(field),
    }
}

fn matches(record: &ResponseRecord, filters: &SourceQuery) -> bool {
    filters.iter().all(|(field, filter)| match filter {
        SourceFilter::Eq(expected) => {
            field_code(record, field).is_some_and(|code| code == *expected)
        }
        SourceFilter::Range { gte, lte } => field_code(record, field)
            .and_then(|code| code.parse::<f64>().ok())
            .is_some_and(|n| gte.is_none_or(|lo| n >= lo) && lte.is_none_or(|hi| n <= hi)),
    })
}

fn compare(a: &ResponseRecord, b: &ResponseRecord, order: &OrderBy) -> Ordering {
    let ordering = match (field_code(a, &order.field), field_code(b, &order.field)) {
        (Some(x), Some(y)) => natural_cmp(&x, &y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    let ordering = if order.descending {
        ordering.reverse()
    } else {
        ordering
    };
    ordering.then_with(|| a.id.cmp(&b.id))
}

impl ResponseSource for InMemorySource {
    fn list_responses(
        &self,
        filters: &SourceQuery,
        page: usize,
        page_size: usize,
        order_by: Option<&OrderBy>,
    ) -> Result<ResponsePage> {
        if page == 0 || page_size == 0 {
            return Err(Error::Validation(
                "page and page size must be positive".to_string(),
            ));
        }

        let mut matching: Vec<&ResponseRecord> =
            self.records.iter().filter(|r| matches(r, filters)).collect();
        if let Some(order) = order_by {
            matching.sort_by(|a, b| compare(a, b, order));
        }

        let total_count = matching.len();
        let rows = matching
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .cloned()
            .collect();

        Ok(ResponsePage { rows, total_count })
    }
}
