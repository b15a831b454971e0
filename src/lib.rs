// Export modules for library usage
pub mod aggregation;
pub mod chart;
pub mod cli;
pub mod config;
pub mod core;
pub mod dashboard;
pub mod errors;
pub mod export;
pub mod filter;
pub mod formatting;
pub mod geocode;
pub mod labels;
pub mod output;
pub mod source;

// Re-export commonly used types
pub use crate::core::{
    AnswerValue, GeoLevel, Geography, ResponseRecord, SurveyVariant, VariantProfile,
};

pub use crate::aggregation::{
    aggregate, count_buckets, count_categorical, count_multi_select, count_priority, crosstab,
    mean_score, Aggregate, AggregationResult, AggregationShape, CategoryCount,
};

pub use crate::chart::{build as build_render_spec, ChartKind, PresentationConfig, RenderSpec};

pub use crate::config::{load_config, SurveydashConfig};

pub use crate::dashboard::{
    run_dashboard, run_snapshot, DashboardContext, DashboardDefinition, DashboardReport, Snapshot,
};

pub use crate::errors::{Error, Result};

pub use crate::export::{ExportRegistry, PageLayout, RenderSurface};

pub use crate::filter::{filter_records, FilterKey, FilterState, FilterValue};

pub use crate::labels::{LabelTable, StaticTables};

pub use crate::output::{create_writer, OutputFormat, ReportWriter};

pub use crate::source::{ResponseSource, SourceFilter, SourceQuery};
