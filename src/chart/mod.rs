//! Declarative chart render specifications.
//!
//! A [`RenderSpec`] is rebuilt from scratch for every aggregation result.
//! It carries no state of its own, so equal inputs always produce equal
//! specs.

pub mod builder;

pub use builder::{build, truncate_label};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Pie,
    Bar,
    StackedBar,
    Scatter,
    Map,
    Gauge,
    Table,
}

/// What the value axis shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueMode {
    #[default]
    Percentage,
    Count,
}

fn default_decimals() -> u32 {
    1
}

/// Per-chart presentation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationConfig {
    pub kind: ChartKind,
    pub title: String,
    #[serde(default)]
    pub value: ValueMode,
    /// Display precision for percentages and means
    #[serde(default = "default_decimals")]
    pub decimals: u32,
    /// Narrow viewport variant
    #[serde(default)]
    pub compact: bool,
    #[serde(default)]
    pub empty_message: Option<String>,
}

impl PresentationConfig {
    pub fn new(kind: ChartKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            value: ValueMode::default(),
            decimals: default_decimals(),
            compact: false,
            empty_message: None,
        }
    }

    pub fn compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn with_value(mut self, value: ValueMode) -> Self {
        self.value = value;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RenderState {
    Ready,
    /// Nothing to plot; show `message` instead of an empty chart.
    Empty { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub code: String,
    pub label: String,
    /// Display value, already rounded
    pub value: f64,
    pub count: usize,
    /// Second coordinate for scatter plots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Highlight rank within a geography bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<DataPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisKind {
    Category,
    Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub kind: AxisKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Labels longer than this are truncated
    pub label_width: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendPosition {
    Top,
    Right,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    pub show: bool,
    pub position: LegendPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSpec {
    pub title: String,
    pub kind: ChartKind,
    #[serde(flatten)]
    pub state: RenderState,
    pub series: Vec<Series>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<Axis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<Axis>,
    pub legend: Legend,
    /// Template with `{label}`, `{value}`, `{count}` placeholders
    pub tooltip: String,
}

impl RenderSpec {
    pub fn is_empty(&self) -> bool {
        matches!(self.state, RenderState::Empty { .. })
    }

    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}
