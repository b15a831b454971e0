//! Aggregation result -> render spec.

use super::{
    Axis, AxisKind, ChartKind, DataPoint, Legend, LegendPosition, PresentationConfig,
    RenderSpec, RenderState, Series, ValueMode,
};
use crate::aggregation::{round_to, Aggregate, AggregationResult, CrosstabResult, MeanResult, PriorityResult};

const COMPACT_LABEL_WIDTH: usize = 10;
const REGULAR_LABEL_WIDTH: usize = 24;
const DEFAULT_EMPTY_MESSAGE: &str = "No valid responses for the current filters";

/// Shorten a label to `width` characters, marking the cut with an ellipsis.
pub fn truncate_label(label: &str, width: usize) -> String {
    if width == 0 || label.chars().count() <= width {
        return label.to_string();
    }
    let mut out: String = label.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

struct Ctx<'a> {
    config: &'a PresentationConfig,
    label_width: usize,
}

impl Ctx<'_> {
    fn value(&self, percentage: f64, count: usize) -> f64 {
        match self.config.value {
            ValueMode::Percentage => round_to(percentage, self.config.decimals),
            ValueMode::Count => count as f64,
        }
    }

    fn point(&self, code: &str, label: &str, percentage: f64, count: usize) -> DataPoint {
        DataPoint {
            code: code.to_string(),
            label: truncate_label(label, self.label_width),
            value: self.value(percentage, count),
            count,
            y: None,
            rank: None,
            detail: None,
        }
    }
}

/// Build the render spec for one chart.
///
/// Pure: equal inputs give equal specs. Aggregates with no usable data
/// produce [`RenderState::Empty`] and no series.
pub fn build(aggregate: &Aggregate, config: &PresentationConfig) -> RenderSpec {
    let ctx = Ctx {
        config,
        label_width: if config.compact {
            COMPACT_LABEL_WIDTH
        } else {
            REGULAR_LABEL_WIDTH
        },
    };

    let (state, series) = if aggregate.is_empty() {
        log::debug!("Chart '{}' has no data", config.title);
        let message = config
            .empty_message
            .clone()
            .unwrap_or_else(|| DEFAULT_EMPTY_MESSAGE.to_string());
        (RenderState::Empty { message }, Vec::new())
    } else {
        let series = match aggregate {
            Aggregate::Categories(result) => categories_series(&ctx, result),
            Aggregate::Priority(result) => priority_series(&ctx, result),
            Aggregate::Crosstab(result) => crosstab_series(&ctx, result),
            Aggregate::Mean(result) => vec![mean_series(&ctx, result)],
        };
        (RenderState::Ready, series)
    };

    let (x_axis, y_axis) = axes(&ctx, aggregate);
    let legend = legend(config, series.len());

    RenderSpec {
        title: config.title.clone(),
        kind: config.kind,
        state,
        series,
        x_axis,
        y_axis,
        legend,
        tooltip: tooltip(config),
    }
}

fn categories_series(ctx: &Ctx<'_>, result: &AggregationResult) -> Vec<Series> {
    let points = result
        .rows
        .iter()
        .map(|row| {
            let mut point = ctx.point(&row.code, &row.label, row.percentage, row.count);
            if ctx.config.kind == ChartKind::Scatter {
                point.value = row.count as f64;
                point.y = Some(round_to(row.percentage, ctx.config.decimals));
            }
            point
        })
        .collect();
    vec![Series {
        name: ctx.config.title.clone(),
        points,
    }]
}

fn priority_series(ctx: &Ctx<'_>, result: &PriorityResult) -> Vec<Series> {
    let first = |ctx: &Ctx<'_>| Series {
        name: "First choice".to_string(),
        points: result
            .rows
            .iter()
            .map(|r| ctx.point(&r.code, &r.label, r.first_percentage, r.first_count))
            .collect(),
    };
    let second = |ctx: &Ctx<'_>| Series {
        name: "Second choice".to_string(),
        points: result
            .rows
            .iter()
            .map(|r| ctx.point(&r.code, &r.label, r.second_percentage, r.second_count))
            .collect(),
    };
    let combined = |ctx: &Ctx<'_>| Series {
        name: "Top 2".to_string(),
        points: result
            .rows
            .iter()
            .map(|r| {
                ctx.point(
                    &r.code,
                    &r.label,
                    r.combined_percentage,
                    r.first_count + r.second_count,
                )
            })
            .collect(),
    };

    match ctx.config.kind {
        ChartKind::Pie | ChartKind::Gauge | ChartKind::Map => vec![combined(ctx)],
        ChartKind::Scatter => {
            let points = result
                .rows
                .iter()
                .map(|r| {
                    let mut point = ctx.point(&r.code, &r.label, r.first_percentage, r.first_count);
                    point.value = round_to(r.first_percentage, ctx.config.decimals);
                    point.y = Some(round_to(r.second_percentage, ctx.config.decimals));
                    point
                })
                .collect();
            vec![Series {
                name: ctx.config.title.clone(),
                points,
            }]
        }
        ChartKind::Table => vec![first(ctx), second(ctx), combined(ctx)],
        ChartKind::Bar | ChartKind::StackedBar => vec![first(ctx), second(ctx)],
    }
}

/// `(code, label, percentage, count)` rows of a bucket summary.
fn summary_rows(aggregate: &Aggregate) -> Vec<(String, String, f64, usize)> {
    match aggregate {
        Aggregate::Categories(result) => result
            .rows
            .iter()
            .map(|r| (r.code.clone(), r.label.clone(), r.percentage, r.count))
            .collect(),
        Aggregate::Priority(result) => result
            .rows
            .iter()
            .map(|r| {
                (
                    r.code.clone(),
                    r.label.clone(),
                    r.combined_percentage,
                    r.first_count + r.second_count,
                )
            })
            .collect(),
        Aggregate::Mean(result) => vec![(
            "mean".to_string(),
            "Mean".to_string(),
            result.mean,
            result.count,
        )],
        Aggregate::Crosstab(_) => Vec::new(),
    }
}

fn crosstab_series(ctx: &Ctx<'_>, result: &CrosstabResult) -> Vec<Series> {
    if ctx.config.kind == ChartKind::Map {
        let points = result
            .buckets
            .iter()
            .map(|bucket| {
                let rows = summary_rows(&bucket.summary);
                let leader = bucket
                    .ranks
                    .iter()
                    .find(|(_, rank)| **rank == 1)
                    .and_then(|(code, _)| rows.iter().find(|(c, ..)| c == code));
                let (score, detail) = match (leader, &bucket.summary) {
                    (Some((_, label, pct, _)), _) => (*pct, Some(label.clone())),
                    (None, Aggregate::Mean(mean)) if mean.count > 0 => (mean.mean, None),
                    _ => (0.0, None),
                };
                let mut point = ctx.point(&bucket.code, &bucket.label, score, bucket.sample);
                if ctx.config.value == ValueMode::Count {
                    point.value = bucket.sample as f64;
                }
                point.detail = detail;
                point
            })
            .collect();
        return vec![Series {
            name: ctx.config.title.clone(),
            points,
        }];
    }

    // One series per category, one point per bucket
    let mut series: Vec<Series> = Vec::new();
    for bucket in &result.buckets {
        for (code, label, pct, count) in summary_rows(&bucket.summary) {
            let mut point = ctx.point(&bucket.code, &bucket.label, pct, count);
            point.rank = bucket.ranks.get(&code).copied();
            match series.iter_mut().find(|s| s.name == label) {
                Some(existing) => existing.points.push(point),
                None => series.push(Series {
                    name: label,
                    points: vec![point],
                }),
            }
        }
    }
    series
}

fn mean_series(ctx: &Ctx<'_>, result: &MeanResult) -> Series {
    Series {
        name: ctx.config.title.clone(),
        points: vec![DataPoint {
            code: "mean".to_string(),
            label: truncate_label(&ctx.config.title, ctx.label_width),
            value: round_to(result.mean, ctx.config.decimals),
            count: result.count,
            y: None,
            rank: None,
            detail: None,
        }],
    }
}

fn axes(ctx: &Ctx<'_>, aggregate: &Aggregate) -> (Option<Axis>, Option<Axis>) {
    let value_name = match ctx.config.value {
        ValueMode::Percentage => "%",
        ValueMode::Count => "Responses",
    };
    let value_axis = |name: &str, max: Option<f64>| Axis {
        kind: AxisKind::Value,
        name: Some(name.to_string()),
        max,
        label_width: ctx.label_width,
    };
    let category_axis = Axis {
        kind: AxisKind::Category,
        name: None,
        max: None,
        label_width: ctx.label_width,
    };

    match ctx.config.kind {
        ChartKind::Bar | ChartKind::StackedBar => {
            (Some(category_axis), Some(value_axis(value_name, None)))
        }
        ChartKind::Scatter => match aggregate {
            Aggregate::Priority(_) => (
                Some(value_axis("First choice %", Some(100.0))),
                Some(value_axis("Second choice %", Some(100.0))),
            ),
            _ => (
                Some(value_axis("Responses", None)),
                Some(value_axis("%", Some(100.0))),
            ),
        },
        ChartKind::Gauge => {
            let max = match aggregate {
                Aggregate::Mean(mean) => mean.max,
                _ => 100.0,
            };
            (None, Some(value_axis(value_name, Some(max))))
        }
        ChartKind::Pie | ChartKind::Map | ChartKind::Table => (None, None),
    }
}

fn legend(config: &PresentationConfig, series_count: usize) -> Legend {
    let wants_legend = config.kind == ChartKind::Pie || series_count > 1;
    Legend {
        show: wants_legend && !config.compact,
        position: match (config.kind, config.compact) {
            (_, true) => LegendPosition::Bottom,
            (ChartKind::Pie, false) => LegendPosition::Right,
            _ => LegendPosition::Top,
        },
    }
}

fn tooltip(config: &PresentationConfig) -> String {
    match (config.kind, config.value) {
        (ChartKind::Gauge, _) => "{label}: {value}".to_string(),
        (ChartKind::Scatter, _) => "{label}: {value}, {y}".to_string(),
        (_, ValueMode::Percentage) => "{label}: {value}% ({count})".to_string(),
        (_, ValueMode::Count) => "{label}: {count}".to_string(),
    }
}
