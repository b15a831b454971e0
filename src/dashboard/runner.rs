//! Recompute every chart from a record snapshot.

use serde::Serialize;
use std::collections::BTreeMap;

use super::{DashboardContext, DashboardDefinition};
use crate::aggregation::{aggregate, Aggregate};
use crate::config::SourceConfig;
use crate::chart::{build, RenderSpec};
use crate::core::{ResponseRecord, SurveyVariant};
use crate::errors::{Result, ResultExt};
use crate::export::{ExportRegistry, SpecSurface};
use crate::filter::{filter_records, FilterKey, FilterValue};
use crate::labels::ZipDistrictTable;
use crate::source::{count_responses, translate_filters, variant_query, ResponseSource};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOutput {
    pub id: String,
    pub aggregate: Aggregate,
    pub spec: RenderSpec,
}

impl ChartOutput {
    pub fn is_empty(&self) -> bool {
        self.spec.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub title: String,
    pub variant: SurveyVariant,
    pub filters: BTreeMap<FilterKey, FilterValue>,
    /// Records in the selected variant
    pub variant_records: usize,
    /// Records left after filtering
    pub filtered_records: usize,
    pub charts: Vec<ChartOutput>,
}

impl DashboardReport {
    pub fn empty_charts(&self) -> impl Iterator<Item = &ChartOutput> {
        self.charts.iter().filter(|c| c.is_empty())
    }
}

/// Records fetched for one dashboard run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    /// Rows matching the variant and every translatable filter
    pub records: Vec<ResponseRecord>,
    /// Size of the variant before any filter was applied
    pub variant_records: usize,
}

/// Fetch every record matching the variant and the translatable part of
/// the active filters, plus the unfiltered size of the variant.
///
/// Set-valued filters are not sent to the source; [`run_snapshot`] applies
/// the full filter state again client-side.
pub fn fetch_snapshot<S>(
    source: &S,
    ctx: &DashboardContext,
    zips: &ZipDistrictTable,
    paging: &SourceConfig,
) -> Result<Snapshot>
where
    S: ResponseSource + ?Sized,
{
    let scope = variant_query(ctx.variant());
    let variant_records = count_responses(source, &scope, paging.page_size)
        .context("loading survey responses")?;

    let mut query = translate_filters(ctx.filters().active(), zips);
    query.extend(scope);
    log::debug!(
        "Fetching responses with {} source predicate(s) from {} {} record(s)",
        query.len(),
        variant_records,
        ctx.variant()
    );
    let records = source
        .list_all_responses(&query, paging.batch_size)
        .context("loading survey responses")?;

    Ok(Snapshot {
        records,
        variant_records,
    })
}

/// [`run_dashboard`] over a fetched snapshot.
///
/// The snapshot is already narrowed by the source, so the variant size
/// comes from the source count rather than the rows.
pub fn run_snapshot(
    snapshot: &Snapshot,
    ctx: &DashboardContext,
    definition: &DashboardDefinition,
    compact: bool,
) -> DashboardReport {
    let mut report = run_dashboard(&snapshot.records, ctx, definition, compact);
    report.variant_records = snapshot.variant_records;
    report
}

/// Run the full pipeline for every chart in the definition.
///
/// Each chart is aggregated independently over the same filtered snapshot.
pub fn run_dashboard(
    records: &[ResponseRecord],
    ctx: &DashboardContext,
    definition: &DashboardDefinition,
    compact: bool,
) -> DashboardReport {
    let selected = ctx.select(records);
    let filtered = filter_records(&selected, ctx.filters().active(), &definition.tables.zips);
    log::debug!(
        "{} of {} {} record(s) pass the active filters",
        filtered.len(),
        selected.len(),
        ctx.variant()
    );

    let charts = definition
        .charts
        .iter()
        .map(|chart| {
            let summary = aggregate(&filtered, &chart.shape, &definition.tables);
            let presentation = chart
                .presentation
                .clone()
                .compact(compact || chart.presentation.compact);
            let spec = build(&summary, &presentation);
            if spec.is_empty() {
                log::info!("Chart '{}' has no valid responses", chart.id);
            }
            ChartOutput {
                id: chart.id.clone(),
                aggregate: summary,
                spec,
            }
        })
        .collect();

    DashboardReport {
        title: definition.title.clone(),
        variant: ctx.variant(),
        filters: ctx.filters().active().clone(),
        variant_records: selected.len(),
        filtered_records: filtered.len(),
        charts,
    }
}

/// Register each chart's render spec with the export sink.
pub fn register_exports(report: &DashboardReport, registry: &mut ExportRegistry, compact: bool) {
    for chart in &report.charts {
        registry.register(
            chart.id.clone(),
            Box::new(SpecSurface::new(chart.spec.clone(), compact)),
        );
    }
}
