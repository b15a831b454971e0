use super::formatters::chart_table;
use super::{describe_filters, empty_message, ReportWriter};
use crate::dashboard::DashboardReport;
use crate::formatting::{FormattingConfig, OutputFormatter};
use anyhow::Result;
use comfy_table::presets::{ASCII_FULL, UTF8_FULL};
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use std::io::Write;

pub struct TerminalWriter<W: Write> {
    writer: W,
    decimals: u32,
    config: FormattingConfig,
    formatter: Box<dyn OutputFormatter>,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W, decimals: u32, config: FormattingConfig) -> Self {
        Self {
            writer,
            decimals,
            config,
            formatter: config.formatter(),
        }
    }

    fn new_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(if self.config.ascii { ASCII_FULL } else { UTF8_FULL })
            .set_content_arrangement(ContentArrangement::Dynamic);
        if !self.config.color.should_use_color() {
            table.force_no_tty();
        }
        table
    }

    fn write_header(&mut self, report: &DashboardReport) -> Result<()> {
        writeln!(self.writer, "{}", self.formatter.header(&report.title))?;
        writeln!(
            self.writer,
            "{}",
            self.formatter.dim(&format!(
                "Variant: {} | Filters: {} | Responses: {} of {}",
                report.variant,
                describe_filters(&report.filters),
                report.filtered_records,
                report.variant_records
            ))
        )?;
        writeln!(self.writer)?;
        Ok(())
    }
}

impl<W: Write> ReportWriter for TerminalWriter<W> {
    fn write_report(&mut self, report: &DashboardReport) -> Result<()> {
        self.write_header(report)?;

        for chart in &report.charts {
            writeln!(self.writer, "{}", self.formatter.header(&chart.spec.title))?;

            let Some(chart_rows) = chart_table(chart, self.decimals) else {
                writeln!(self.writer, "  {}", self.formatter.warning(&empty_message(chart)))?;
                writeln!(self.writer)?;
                continue;
            };

            let mut table = self.new_table();
            table.set_header(chart_rows.headers.iter().map(Cell::new));
            for row in &chart_rows.rows {
                table.add_row(row.cells.iter().enumerate().map(|(i, text)| {
                    let text = if row.highlight {
                        self.formatter.highlight(text)
                    } else {
                        text.clone()
                    };
                    let cell = Cell::new(text);
                    if i == 0 {
                        cell
                    } else {
                        cell.set_alignment(CellAlignment::Right)
                    }
                }));
            }
            writeln!(self.writer, "{table}")?;
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
    fn test_plain_terminal_output() {
        let mut definition = DashboardDefinition::default();
        definition.title = "Community survey".into();
        definition.tables.labels.insert("GENDER", "1", "Male");
        definition.charts.push(ChartDefinition {
            id: "gender".into(),
            shape: AggregationShape::Categorical {
                field: "GENDER".into(),
                categories: None,
                sort: Default::default(),
            },
            presentation: PresentationConfig::new(ChartKind::Pie, "Gender"),
        });
        let records = vec![ResponseRecord::new("a").with_answer("GENDER", "1")];

        let report = run_dashboard(&records, &DashboardContext::default(), &definition, false);
        let mut buf = Vec::new();
        TerminalWriter::new(&mut buf, 1, FormattingConfig::plain())
            .write_report(&report)
            .unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("Community survey\n"));
        assert!(text.contains("Male"));
        assert!(text.contains("100.0%"));
        assert!(text.contains("+--"));
    }
}
