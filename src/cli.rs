use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::core::SurveyVariant;
use crate::filter::{parse_assignment, FilterKey, FilterValue};
use crate::formatting::ColorMode;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "surveydash")]
#[command(about = "Survey results dashboard: filter, aggregate and chart responses", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Configuration file (defaults to the nearest .surveydash.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Inputs shared by every command that runs the dashboard pipeline.
#[derive(Args, Debug, Clone)]
pub struct DashboardArgs {
    /// JSON array of response records
    #[arg(long)]
    pub records: PathBuf,

    /// Dashboard definition (TOML)
    #[arg(long)]
    pub dashboard: PathBuf,

    /// Survey variant
    #[arg(long, default_value = "merged")]
    pub variant: SurveyVariant,

    /// Filter as KEY=VALUE: AGE=18..34, GENDER=1|2, district=3, address=...
    #[arg(long = "filter", value_parser = parse_filter)]
    pub filters: Vec<(FilterKey, FilterValue)>,

    /// Narrow layout: short labels, no legends
    #[arg(long)]
    pub compact: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute every chart and print a report
    Report {
        #[command(flatten)]
        dashboard: DashboardArgs,

        /// Output format (inferred from --output extension when omitted)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Plain output: no colors, ASCII table borders
        #[arg(long)]
        plain: bool,

        /// Color output: auto, always or never (overrides NO_COLOR/CLICOLOR)
        #[arg(long, value_parser = parse_color_mode)]
        color: Option<ColorMode>,
    },

    /// Write every chart into a paginated export document
    Export {
        #[command(flatten)]
        dashboard: DashboardArgs,

        /// Export document path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Initialize configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

fn parse_filter(raw: &str) -> Result<(FilterKey, FilterValue), String> {
    parse_assignment(raw)
}

fn parse_color_mode(raw: &str) -> Result<ColorMode, String> {
    ColorMode::parse(raw)
        .ok_or_else(|| format!("invalid color mode '{raw}' (auto, always, never)"))
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GeoLevel;

    #[test]
    fn test_cli_parsing_report_command() {
        let cli = Cli::try_parse_from([
            "surveydash",
            "report",
            "--records",
            "responses.json",
            "--dashboard",
            "dashboard.toml",
            "--variant",
            "public",
            "--filter",
            "AGE=18..34",
            "--filter",
            "district=3",
            "--format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Report {
                dashboard, format, ..
            } => {
                assert_eq!(dashboard.variant, SurveyVariant::Public);
                assert_eq!(format, Some(OutputFormat::Json));
                assert_eq!(
                    dashboard.filters,
                    vec![
                        (FilterKey::question("AGE"), FilterValue::range(18.0, 34.0)),
                        (FilterKey::Geo(GeoLevel::District), FilterValue::scalar("3")),
                    ]
                );
            }
            _ => panic!("Expected Report command"),
        }
    }

    #[test]
    fn test_cli_rejects_malformed_filter() {
        let result = Cli::try_parse_from([
            "surveydash",
            "report",
            "--records",
            "r.json",
            "--dashboard",
            "d.toml",
            "--filter",
            "AGE=40..18",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parsing_color_mode() {
        let cli = Cli::try_parse_from([
            "surveydash",
            "report",
            "--records",
            "r.json",
            "--dashboard",
            "d.toml",
            "--color",
            "NEVER",
        ])
        .unwrap();
        match cli.command {
            Commands::Report { color, plain, .. } => {
                assert_eq!(color, Some(ColorMode::Never));
                assert!(!plain);
            }
            _ => panic!("Expected Report command"),
        }

        let result = Cli::try_parse_from([
            "surveydash",
            "report",
            "--records",
            "r.json",
            "--dashboard",
            "d.toml",
            "--color",
            "sometimes",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parsing_init_command() {
        let cli = Cli::try_parse_from(["surveydash", "init", "--force"]).unwrap();
        match cli.command {
            Commands::Init { force } => assert!(force),
            _ => panic!("Expected Init command"),
        }
    }
}
