//! Tabular view of chart outputs shared by the text writers.

use crate::aggregation::{round_to, Aggregate, CrosstabResult};
use crate::dashboard::ChartOutput;

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub cells: Vec<String>,
    /// Leading category, or rank 1 within a geography bucket
    pub highlight: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartTable {
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

pub fn format_percentage(value: f64, decimals: u32) -> String {
    format!("{:.*}%", decimals as usize, round_to(value, decimals))
}

fn row(cells: Vec<String>, highlight: bool) -> TableRow {
    TableRow { cells, highlight }
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Table for one chart, `None` when the chart is in its empty state.
pub fn chart_table(chart: &ChartOutput, decimals: u32) -> Option<ChartTable> {
    if chart.is_empty() {
        return None;
    }
    Some(aggregate_table(&chart.aggregate, decimals))
}

fn aggregate_table(aggregate: &Aggregate, decimals: u32) -> ChartTable {
    match aggregate {
        Aggregate::Categories(result) => {
            let leader = result.rows.iter().map(|r| r.count).max().unwrap_or(0);
            ChartTable {
                headers: headers(&["Category", "Count", "Percent"]),
                rows: result
                    .rows
                    .iter()
                    .map(|r| {
                        row(
                            vec![
                                r.label.clone(),
                                r.count.to_string(),
                                format_percentage(r.percentage, decimals),
                            ],
                            leader > 0 && r.count == leader,
                        )
                    })
                    .collect(),
            }
        }
        Aggregate::Priority(result) => {
            let leader = result
                .rows
                .iter()
                .map(|r| r.combined_percentage)
                .fold(0.0, f64::max);
            ChartTable {
                headers: headers(&["Category", "1st", "1st %", "2nd", "2nd %", "Top 2 %"]),
                rows: result
                    .rows
                    .iter()
                    .map(|r| {
                        row(
                            vec![
                                r.label.clone(),
                                r.first_count.to_string(),
                                format_percentage(r.first_percentage, decimals),
                                r.second_count.to_string(),
                                format_percentage(r.second_percentage, decimals),
                                format_percentage(r.combined_percentage, decimals),
                            ],
                            leader > 0.0 && r.combined_percentage == leader,
                        )
                    })
                    .collect(),
            }
        }
        Aggregate::Crosstab(result) => crosstab_table(result, decimals),
        Aggregate::Mean(result) => ChartTable {
            headers: headers(&["Mean", "Responses", "Scale"]),
            rows: vec![row(
                vec![
                    format!("{:.*}", decimals as usize, round_to(result.mean, decimals)),
                    result.count.to_string(),
                    format!("{}-{}", result.min, result.max),
                ],
                false,
            )],
        },
    }
}

fn category_label(aggregate: &Aggregate, code: &str) -> String {
    match aggregate {
        Aggregate::Categories(result) => result.row(code).map(|r| r.label.clone()),
        Aggregate::Priority(result) => result.row(code).map(|r| r.label.clone()),
        Aggregate::Crosstab(_) | Aggregate::Mean(_) => None,
    }
    .unwrap_or_else(|| code.to_string())
}

fn crosstab_table(result: &CrosstabResult, decimals: u32) -> ChartTable {
    let mean_layout = result
        .buckets
        .iter()
        .any(|b| matches!(b.summary, Aggregate::Mean(_)));

    if mean_layout {
        return ChartTable {
            headers: headers(&["Area", "n", "Mean"]),
            rows: result
                .buckets
                .iter()
                .map(|bucket| {
                    let mean = match &bucket.summary {
                        Aggregate::Mean(m) if m.count > 0 => {
                            format!("{:.*}", decimals as usize, round_to(m.mean, decimals))
                        }
                        _ => "-".to_string(),
                    };
                    row(vec![bucket.label.clone(), bucket.sample.to_string(), mean], false)
                })
                .collect(),
        };
    }

    ChartTable {
        headers: headers(&["Area", "n", "#1", "#2", "#3"]),
        rows: result
            .buckets
            .iter()
            .map(|bucket| {
                let scores = bucket.summary.scores();
                let mut ranked: Vec<(&String, &u8)> = bucket.ranks.iter().collect();
                ranked.sort_by_key(|(_, rank)| **rank);

                let mut cells = vec![bucket.label.clone(), bucket.sample.to_string()];
                for slot in 0..3 {
                    let cell = ranked
                        .get(slot)
                        .map(|(code, _)| {
                            let score = scores
                                .iter()
                                .find(|(c, _, _)| c == *code)
                                .map(|(_, s, _)| *s)
                                .unwrap_or(0.0);
                            format!(
                                "{} ({})",
                                category_label(&bucket.summary, code),
                                format_percentage(score, decimals)
                            )
                        })
                        .unwrap_or_else(|| "-".to_string());
                    cells.push(cell);
                }
                row(cells, false)
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{count_categorical, crosstab};
    use crate::chart::{build, ChartKind, PresentationConfig};
    use crate::core::{GeoLevel, ResponseRecord};
    use crate::labels::CategoryTable;
    use pretty_assertions::assert_eq;

    fn output(aggregate: Aggregate) -> ChartOutput {
        let spec = build(&aggregate, &PresentationConfig::new(ChartKind::Bar, "T"));
        ChartOutput {
            id: "t".into(),
            aggregate,
            spec,
        }
    }

    #[test]
    fn test_categorical_table_rounds_and_highlights() {
        let records = vec![
            ResponseRecord::new("a").with_answer("GENDER", "1"),
            ResponseRecord::new("b").with_answer("GENDER", "1"),
            ResponseRecord::new("c").with_answer("GENDER", "2"),
        ];
        let table = CategoryTable::from_pairs([("1", "Male"), ("2", "Female")]);
        let chart = output(Aggregate::Categories(count_categorical(&records, "GENDER", &table)));

        let t = chart_table(&chart, 1).unwrap();
        assert_eq!(t.rows[0].cells, vec!["Male", "2", "66.7%"]);
        assert!(t.rows[0].highlight);
        assert_eq!(t.rows[1].cells, vec!["Female", "1", "33.3%"]);
        assert!(!t.rows[1].highlight);
    }

    #[test]
    fn test_empty_chart_has_no_table() {
        let records: Vec<ResponseRecord> = Vec::new();
        let chart = output(Aggregate::Categories(count_categorical(
            &records,
            "GENDER",
            &CategoryTable::default(),
        )));
        assert!(chart_table(&chart, 1).is_none());
    }

    #[test]
    fn test_crosstab_lists_ranked_leaders() {
        let records = vec![
            ResponseRecord::new("a")
                .with_geo(GeoLevel::Area, "3")
                .with_answer("Q", "1"),
            ResponseRecord::new("b")
                .with_geo(GeoLevel::Area, "3")
                .with_answer("Q", "1"),
            ResponseRecord::new("c")
                .with_geo(GeoLevel::Area, "3")
                .with_answer("Q", "2"),
        ];
        let labels = CategoryTable::from_pairs([("1", "Parks"), ("2", "Roads"), ("3", "Schools")]);
        let buckets = CategoryTable::from_pairs([("3", "North")]);
        let result = crosstab(&records, GeoLevel::Area, &buckets, |subset| {
            Aggregate::Categories(count_categorical(subset, "Q", &labels))
        });

        let t = chart_table(&output(Aggregate::Crosstab(result)), 1).unwrap();
        assert_eq!(
            t.rows[0].cells,
            vec!["North", "3", "Parks (66.7%)", "Roads (33.3%)", "-"]
        );
    }
}
