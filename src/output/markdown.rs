use super::formatters::chart_table;
use super::{describe_filters, empty_message, ReportWriter};
use crate::dashboard::DashboardReport;
use anyhow::Result;
use std::io::Write;

pub struct MarkdownWriter<W: Write> {
    writer: W,
    decimals: u32,
}

impl<W: Write> MarkdownWriter<W> {
    pub fn new(writer: W, decimals: u32) -> Self {
        Self { writer, decimals }
    }

    fn write_header(&mut self, report: &DashboardReport) -> Result<()> {
        writeln!(self.writer, "# {}", report.title)?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Variant | Filters | Responses |")?;
        writeln!(self.writer, "|---------|---------|-----------|")?;
        writeln!(
            self.writer,
            "| {} | {} | {} of {} |",
            report.variant,
            describe_filters(&report.filters),
            report.filtered_records,
            report.variant_records
        )?;
        writeln!(self.writer)?;
        Ok(())
    }
}

fn escape(cell: &str) -> String {
    cell.replace('|', "\\|")
}

impl<W: Write> ReportWriter for MarkdownWriter<W> {
    fn write_report(&mut self, report: &DashboardReport) -> Result<()> {
        self.write_header(report)?;

        for chart in &report.charts {
            writeln!(self.writer, "## {}", chart.spec.title)?;
            writeln!(self.writer)?;

            let Some(table) = chart_table(chart, self.decimals) else {
                writeln!(self.writer, "_{}_", empty_message(chart))?;
                writeln!(self.writer)?;
                continue;
            };

            writeln!(self.writer, "| {} |", table.headers.join(" | "))?;
            let rule: Vec<String> = table.headers.iter().map(|h| "-".repeat(h.len().max(3))).collect();
            writeln!(self.writer, "|{}|", rule.join("|"))?;
            for row in &table.rows {
                let cells: Vec<String> = row
                    .cells
                    .iter()
                    .enumerate()
                    .map(|(i, c)| {
                        if row.highlight && i == 0 {
                            format!("**{}**", escape(c))
                        } else {
                            escape(c)
                        }
                    })
                    .collect();
                writeln!(self.writer, "| {} |", cells.join(" | "))?;
            }
            writeln!(self.writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::AggregationShape;
    use crate::chart::{ChartKind, PresentationConfig};
    use crate::core::ResponseRecord;
    use crate::dashboard::{run_dashboard, ChartDefinition, DashboardContext, DashboardDefinition};

    #[test]
    fn test_markdown_tables_and_empty_state() {
        let mut definition = DashboardDefinition::default();
        definition.tables.labels.insert("GENDER", "1", "Male");
        definition.tables.labels.insert("GENDER", "2", "Female");
        definition.charts.push(ChartDefinition {
            id: "gender".into(),
            shape: AggregationShape::Categorical {
                field: "GENDER".into(),
                categories: None,
                sort: Default::default(),
            },
            presentation: PresentationConfig::new(ChartKind::Pie, "Gender"),
        });
        definition.charts.push(ChartDefinition {
            id: "income".into(),
            shape: AggregationShape::Categorical {
                field: "INCOME".into(),
                categories: None,
                sort: Default::default(),
            },
            presentation: PresentationConfig::new(ChartKind::Bar, "Income"),
        });
        let records = vec![
            ResponseRecord::new("a").with_answer("GENDER", "1"),
            ResponseRecord::new("b").with_answer("GENDER", "2"),
        ];

        let report = run_dashboard(&records, &DashboardContext::default(), &definition, false);
        let mut buf = Vec::new();
        MarkdownWriter::new(&mut buf, 1).write_report(&report).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("## Gender"));
        assert!(text.contains("| **Male** | 1 | 50.0% |"));
        assert!(text.contains("_No valid responses for the current filters_"));
    }
}
