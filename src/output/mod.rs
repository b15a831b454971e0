//! Report writers for rendered dashboards.

pub mod formatters;
pub mod json;
pub mod markdown;
pub mod terminal;

pub use formatters::{chart_table, format_percentage, ChartTable, TableRow};
pub use json::JsonWriter;
pub use markdown::MarkdownWriter;
pub use terminal::TerminalWriter;

use anyhow::Result;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::chart::RenderState;
use crate::dashboard::{ChartOutput, DashboardReport};
use crate::filter::{FilterKey, FilterValue};
use crate::formatting::FormattingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
    Terminal,
}

pub trait ReportWriter {
    fn write_report(&mut self, report: &DashboardReport) -> Result<()>;
}

pub fn create_writer<'a, W: Write + 'a>(
    format: OutputFormat,
    writer: W,
    decimals: u32,
    formatting: FormattingConfig,
) -> Box<dyn ReportWriter + 'a> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(writer)),
        OutputFormat::Markdown => Box::new(MarkdownWriter::new(writer, decimals)),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(writer, decimals, formatting)),
    }
}

/// Write a report to `output_file`, or stdout when none is given.
///
/// Files never get ANSI colors.
pub fn output_report(
    report: &DashboardReport,
    format: OutputFormat,
    output_file: Option<&Path>,
    decimals: u32,
    formatting: FormattingConfig,
) -> Result<()> {
    match output_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let file = fs::File::create(path)?;
            let mut plain = FormattingConfig::plain();
            plain.ascii = formatting.ascii;
            create_writer(format, file, decimals, plain).write_report(report)?;
            log::info!("Wrote report to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            create_writer(format, stdout.lock(), decimals, formatting).write_report(report)?;
        }
    }
    Ok(())
}

/// Infer the format from a file extension, defaulting to the terminal view.
pub fn format_for_path(path: Option<&Path>) -> OutputFormat {
    match path.and_then(|p| p.extension()).and_then(|e| e.to_str()) {
        Some("json") => OutputFormat::Json,
        Some("md") => OutputFormat::Markdown,
        _ => OutputFormat::Terminal,
    }
}

pub(crate) fn describe_filters(filters: &BTreeMap<FilterKey, FilterValue>) -> String {
    if filters.is_empty() {
        return "none".to_string();
    }
    filters
        .iter()
        .map(|(key, value)| format!("{key}={}", describe_value(value)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_value(value: &FilterValue) -> String {
    match value {
        FilterValue::Scalar(s) => s.clone(),
        FilterValue::Set(values) => values.iter().cloned().collect::<Vec<_>>().join("|"),
        FilterValue::Range { min, max } => {
            let lo = if min.is_finite() { min.to_string() } else { String::new() };
            let hi = if max.is_finite() { max.to_string() } else { String::new() };
            format!("{lo}..{hi}")
        }
    }
}

pub(crate) fn empty_message(chart: &ChartOutput) -> String {
    match &chart.spec.state {
        RenderState::Empty { message } => message.clone(),
        RenderState::Ready => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{run_dashboard, DashboardContext, DashboardDefinition};
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_describe_filters_round_trips_cli_syntax() {
        let mut filters = BTreeMap::new();
        filters.insert(FilterKey::question("AGE"), FilterValue::range(18.0, f64::INFINITY));
        filters.insert(FilterKey::question("GENDER"), FilterValue::set(["1", "2"]));

        assert_eq!(describe_filters(&filters), "AGE=18.., GENDER=1|2");
        assert_eq!(describe_filters(&BTreeMap::new()), "none");
    }

    #[test]
    fn test_format_for_path() {
        assert_eq!(format_for_path(Some(Path::new("r.json"))), OutputFormat::Json);
        assert_eq!(format_for_path(Some(Path::new("r.md"))), OutputFormat::Markdown);
        assert_eq!(format_for_path(None), OutputFormat::Terminal);
    }

    #[test]
    fn test_output_report_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let nested: PathBuf = temp_dir.path().join("nested").join("report.md");
        let report = run_dashboard(
            &[],
            &DashboardContext::default(),
            &DashboardDefinition::default(),
            false,
        );

        output_report(
            &report,
            OutputFormat::Markdown,
            Some(&nested),
            1,
            FormattingConfig::default(),
        )
        .unwrap();

        let content = fs::read_to_string(&nested).unwrap();
        assert!(content.starts_with("# Survey results"));
    }
}
