//! Data source query interface.
//!
//! The remote store is an external collaborator. It receives scalar
//! equality or `{gte, lte}` range predicates and returns pages of records.
//! Set-valued filters cannot be expressed in that form and stay client-side.

pub mod memory;

pub use memory::InMemorySource;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::{ResponseRecord, SurveyVariant};
use crate::errors::{Error, Result, ResultExt};
use crate::filter::{effective_filters, FilterKey, FilterValue};
use crate::labels::ZipDistrictTable;

/// Predicate passed through to the data store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceFilter {
    Eq(String),
    Range {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gte: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lte: Option<f64>,
    },
}

/// Field name -> predicate. Geography fields use the level name.
pub type SourceQuery = BTreeMap<String, SourceFilter>;

/// Field holding the instrument a record was collected with.
pub const VARIANT_FIELD: &str = "instrument";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    #[serde(default)]
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResponsePage {
    pub rows: Vec<ResponseRecord>,
    pub total_count: usize,
}

pub trait ResponseSource {
    /// One page of matching records. `page` is 1-based.
    fn list_responses(
        &self,
        filters: &SourceQuery,
        page: usize,
        page_size: usize,
        order_by: Option<&OrderBy>,
    ) -> Result<ResponsePage>;

    /// Every matching record, fetched `batch_size` rows at a time.
    fn list_all_responses(
        &self,
        filters: &SourceQuery,
        batch_size: usize,
    ) -> Result<Vec<ResponseRecord>> {
        fetch_all(self, filters, batch_size)
    }
}

/// Auto-paginate until `total_count` rows are collected or a short page
/// comes back.
pub fn fetch_all<S>(source: &S, filters: &SourceQuery, batch_size: usize) -> Result<Vec<ResponseRecord>>
where
    S: ResponseSource + ?Sized,
{
    if batch_size == 0 {
        return Err(Error::Validation("batch size must be positive".to_string()));
    }

    let mut rows = Vec::new();
    let mut page = 1;
    loop {
        let batch = source
            .list_responses(filters, page, batch_size, None)
            .context(format!("fetching page {page}"))?;
        let fetched = batch.rows.len();
        rows.extend(batch.rows);
        log::debug!(
            "Fetched page {} ({} rows, {}/{} total)",
            page,
            fetched,
            rows.len(),
            batch.total_count
        );
        if fetched < batch_size || rows.len() >= batch.total_count {
            break;
        }
        page += 1;
    }
    Ok(rows)
}

/// Number of matching records, read from the first page's `total_count`.
pub fn count_responses<S>(source: &S, filters: &SourceQuery, page_size: usize) -> Result<usize>
where
    S: ResponseSource + ?Sized,
{
    let page = source
        .list_responses(filters, 1, page_size, None)
        .context("counting responses")?;
    Ok(page.total_count)
}

/// Predicate restricting a query to one variant's records.
///
/// `merged` spans every instrument, so it adds nothing.
pub fn variant_query(variant: SurveyVariant) -> SourceQuery {
    let mut query = SourceQuery::new();
    if variant != SurveyVariant::Merged {
        query.insert(
            VARIANT_FIELD.to_string(),
            SourceFilter::Eq(variant.as_str().to_string()),
        );
    }
    query
}

fn source_field(key: &FilterKey) -> String {
    match key {
        FilterKey::Question(code) => code.clone(),
        FilterKey::Geo(level) => level.as_str().to_string(),
        FilterKey::Address => "address".to_string(),
    }
}

/// Translate committed filters into data-store predicates.
///
/// Addresses are resolved to district equality first. Set-valued filters
/// are omitted and must be applied client-side.
pub fn translate_filters(
    active: &BTreeMap<FilterKey, FilterValue>,
    zips: &ZipDistrictTable,
) -> SourceQuery {
    effective_filters(active, zips)
        .into_iter()
        .filter_map(|(key, value)| {
            let filter = match value {
                FilterValue::Scalar(s) => SourceFilter::Eq(s.trim().to_string()),
                FilterValue::Range { min, max } => SourceFilter::Range {
                    gte: Some(min).filter(|v| v.is_finite()),
                    lte: Some(max).filter(|v| v.is_finite()),
                },
                FilterValue::Set(_) => return None,
            };
            Some((source_field(&key), filter))
        })
        .collect()
}
